// ============================
// crates/formflow-bin/src/main.rs
// ============================
//! `formflow` command line: check inputs against the form validators and
//! replay scripted UI sessions.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use formflow_lib::{
    auth::{check_password_strength_with, LocalTokenProvider, RecordingSubmitter},
    config::Settings,
    replay::{run_script, Script},
    validation::{validate_email, validate_login_identifier, validate_phone},
    FlowContext,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "formflow", version, about = "Form-flow validation and replay")]
struct Cli {
    /// Settings file (defaults to ./formflow.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a password
    Strength { password: String },
    /// Run a field validator
    Validate {
        #[arg(value_enum)]
        field: Field,
        value: String,
    },
    /// Replay a JSON script of UI events and print the resulting state
    Replay { script: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Field {
    Email,
    Phone,
    Login,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load().context("loading settings")?,
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match cli.command {
        Command::Strength { password } => {
            let strength = check_password_strength_with(&password, settings.password.min_length);
            let acceptable = strength.is_acceptable(settings.password.min_score);
            println!(
                "{}",
                serde_json::json!({
                    "score": strength.score,
                    "feedback": strength.feedback,
                    "acceptable": acceptable,
                })
            );
        },
        Command::Validate { field, value } => {
            let result = match field {
                Field::Email => validate_email(&value),
                Field::Phone => validate_phone(&value),
                Field::Login => validate_login_identifier(&value),
            };
            println!("{}", serde_json::to_string(&result)?);
            if !result.is_valid {
                std::process::exit(1);
            }
        },
        Command::Replay { script } => {
            let parsed = Script::load(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let submitter = Arc::new(RecordingSubmitter::new());
            let ctx = FlowContext::new(Arc::new(LocalTokenProvider), submitter.clone(), settings);

            let report = run_script(&ctx, parsed).await?;
            info!(
                events = report.outcomes.len(),
                failures = report.failures(),
                submissions = submitter.len(),
                "replay finished"
            );

            let redacted: Vec<_> = submitter
                .submissions()
                .iter()
                .map(|s| s.to_log_json())
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "report": report,
                    "submissions": redacted,
                }))?
            );
        },
    }

    Ok(())
}
