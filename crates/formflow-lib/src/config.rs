// ============================
// crates/formflow-lib/src/config.rs
// ============================
//! Configuration management.
use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::{MIN_ACCEPTED_SCORE, MIN_PASSWORD_LENGTH};
use crate::auth::password::MAX_SCORE;
use crate::auth::rate_limit::{DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW};
use crate::error::{FlowError, FlowResult};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "formflow.toml";

/// Prefix of environment overrides, e.g. `FORMFLOW_RATE_LIMIT__MAX_ATTEMPTS=3`
pub const ENV_PREFIX: &str = "FORMFLOW_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level
    pub log_level: String,
    /// Submission rate limiting
    pub rate_limit: RateLimitSettings,
    /// Password acceptance policy
    pub password: PasswordSettings,
    /// Withdrawal form limits
    pub withdrawal: WithdrawalSettings,
}

/// Submission rate limiting settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Submissions allowed per window
    pub max_attempts: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

/// Password acceptance policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordSettings {
    /// Passwords shorter than this score zero
    pub min_length: usize,
    /// Minimum strength score to allow account creation
    pub min_score: u8,
}

/// Withdrawal form settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawalSettings {
    /// Balance a withdrawal may not exceed
    pub withdrawable_balance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            rate_limit: RateLimitSettings::default(),
            password: PasswordSettings::default(),
            withdrawal: WithdrawalSettings::default(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window_secs: DEFAULT_WINDOW.as_secs(),
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            min_score: MIN_ACCEPTED_SCORE,
        }
    }
}

impl Default for WithdrawalSettings {
    fn default() -> Self {
        Self {
            withdrawable_balance: 480_848.0,
        }
    }
}

impl Settings {
    /// Layered sources: defaults, then `formflow.toml`, then `FORMFLOW_` env vars
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate settings from the default sources
    pub fn load() -> FlowResult<Self> {
        let settings: Settings = Self::figment().extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from an explicit TOML file plus env overrides
    pub fn load_from(path: impl AsRef<Path>) -> FlowResult<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would make the forms unusable
    pub fn validate(&self) -> FlowResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(FlowError::InvalidState(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        if self.rate_limit.max_attempts == 0 {
            return Err("rate_limit.max_attempts must be at least 1".into());
        }
        if self.rate_limit.window_secs == 0 {
            return Err("rate_limit.window_secs must be at least 1".into());
        }
        if self.password.min_length < 4 {
            return Err("password.min_length must be at least 4".into());
        }
        if self.password.min_score == 0 || self.password.min_score > MAX_SCORE {
            return Err(FlowError::InvalidState(format!(
                "password.min_score must be between 1 and {MAX_SCORE}"
            )));
        }
        let balance = self.withdrawal.withdrawable_balance;
        if !balance.is_finite() || balance < 0.0 {
            return Err("withdrawal.withdrawable_balance must be a non-negative number".into());
        }
        Ok(())
    }

    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }
}

/// Builder for [`Settings`], validated on `build`
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.settings.log_level = level.into();
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.settings.rate_limit.max_attempts = max_attempts;
        self
    }

    pub fn window_secs(mut self, window_secs: u64) -> Self {
        self.settings.rate_limit.window_secs = window_secs;
        self
    }

    pub fn min_score(mut self, min_score: u8) -> Self {
        self.settings.password.min_score = min_score;
        self
    }

    pub fn withdrawable_balance(mut self, balance: f64) -> Self {
        self.settings.withdrawal.withdrawable_balance = balance;
        self
    }

    pub fn build(self) -> FlowResult<Settings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
