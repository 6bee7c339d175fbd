// ==========================
// tests/unit/config_tests.rs
// ==========================
//! Unit tests for the configuration module
use std::fs;

use figment::Jail;
use formflow_lib::config::{Settings, CONFIG_FILE};
use formflow_lib::flows::AccountFlow;
use formflow_lib::FlowError;
use tempfile::tempdir;

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(
        &path,
        r#"
        [password]
        min_score = 5

        [withdrawal]
        withdrawable_balance = 2500.0
        "#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.password.min_score, 5);
    assert_eq!(settings.password.min_length, 8);
    assert_eq!(settings.withdrawal.withdrawable_balance, 2500.0);
    assert_eq!(settings.rate_limit.max_attempts, 5);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let settings = Settings::load_from(dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_invalid_file_is_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[rate_limit]\nmax_attempts = \"many\"\n").unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(matches!(err, FlowError::Config(_)));
    assert_eq!(err.error_code(), "CFG_001");
}

#[test]
fn test_out_of_range_values_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("zero.toml");
    fs::write(&path, "[rate_limit]\nwindow_secs = 0\n").unwrap();
    assert!(matches!(
        Settings::load_from(&path),
        Err(FlowError::InvalidState(_))
    ));
}

#[test]
fn test_default_sources_from_working_directory() {
    Jail::expect_with(|jail| {
        jail.create_file(CONFIG_FILE, "log_level = \"error\"\n")?;
        jail.set_env("FORMFLOW_PASSWORD__MIN_SCORE", "6");

        let settings = Settings::load().map_err(|e| e.to_string())?;
        assert_eq!(settings.log_level, "error");
        assert_eq!(settings.password.min_score, 6);
        Ok(())
    });
}

#[test]
fn test_min_score_gates_account_submission() {
    let settings = Settings::builder().min_score(6).build().unwrap();
    let mut flow = AccountFlow::new(&settings);
    flow.set_first_name("Ada");
    flow.set_email("ada@example.com");
    flow.set_phone("677123456");
    flow.next().unwrap();

    // Score 5: three classes plus length
    flow.set_password("abcdefgH12");
    flow.set_confirm_password("abcdefgH12");
    flow.set_terms_accepted(true);
    assert_eq!(flow.strength().score, 5);
    assert!(!flow.can_submit());

    flow.set_password("abcdefgH1!");
    flow.set_confirm_password("abcdefgH1!");
    assert!(flow.can_submit());
}
