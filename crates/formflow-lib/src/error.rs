// crates/formflow-lib/src/error.rs

//! Central error type + the user-facing banner texts derived from it.
use std::time::Duration;

use thiserror::Error;

use crate::auth::SubmitError;
use crate::validation::ValidationError;

/// Banner shown while the submission rate limiter is blocking.
pub const RATE_LIMITED_MESSAGE: &str = "Too many attempts. Please try again later.";
/// Banner shown when the session token could not be obtained.
pub const SECURITY_SETUP_FAILED_MESSAGE: &str = "Security setup failed. Please try again later.";
pub const PASSWORDS_DO_NOT_MATCH_MESSAGE: &str = "Passwords do not match";
pub const WEAK_PASSWORD_MESSAGE: &str = "Please use a stronger password";
pub const TERMS_NOT_ACCEPTED_MESSAGE: &str = "Please accept the terms and conditions";
pub const MISSING_PASSWORD_MESSAGE: &str = "Please enter your password";
pub const INCOMPLETE_PIN_MESSAGE: &str = "Please enter a complete 4-digit PIN";
pub const PIN_MISMATCH_MESSAGE: &str = "PINs don't match. Please try again.";

/// Form-flow error types with error codes and user-facing messages
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Rate limit exceeded, retry in {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password too weak (score {score}, need {required})")]
    WeakPassword { score: u8, required: u8 },

    #[error("Terms and conditions not accepted")]
    TermsNotAccepted,

    #[error("Password missing")]
    MissingPassword,

    #[error("PIN incomplete")]
    IncompletePin,

    #[error("PIN confirmation does not match")]
    PinMismatch,

    #[error("Session token unavailable: {0}")]
    TokenUnavailable(String),

    #[error("Submission failed: {0}")]
    Submission(#[from] SubmitError),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for form-flow operations
pub type FlowResult<T> = Result<T, FlowError>;

impl FlowError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            FlowError::Validation(_) => "VAL_001",
            FlowError::RateLimited { .. } => "RATE_001",
            FlowError::PasswordMismatch => "PWD_001",
            FlowError::WeakPassword { .. } => "PWD_002",
            FlowError::MissingPassword => "PWD_003",
            FlowError::TermsNotAccepted => "TERMS_001",
            FlowError::IncompletePin => "PIN_001",
            FlowError::PinMismatch => "PIN_002",
            FlowError::TokenUnavailable(_) => "SEC_001",
            FlowError::Submission(_) => "SUB_001",
            FlowError::InvalidState(_) => "STATE_001",
            FlowError::Config(_) => "CFG_001",
            FlowError::Io(_) => "IO_001",
            FlowError::Json(_) => "JSON_001",
        }
    }

    /// The banner text for this error
    ///
    /// Never includes collaborator or internal details; submission failures get
    /// a flow-specific generic text set by the flow itself.
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Validation(e) => e.user_message().to_string(),
            FlowError::RateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            FlowError::PasswordMismatch => PASSWORDS_DO_NOT_MATCH_MESSAGE.to_string(),
            FlowError::WeakPassword { .. } => WEAK_PASSWORD_MESSAGE.to_string(),
            FlowError::TermsNotAccepted => TERMS_NOT_ACCEPTED_MESSAGE.to_string(),
            FlowError::MissingPassword => MISSING_PASSWORD_MESSAGE.to_string(),
            FlowError::IncompletePin => INCOMPLETE_PIN_MESSAGE.to_string(),
            FlowError::PinMismatch => PIN_MISMATCH_MESSAGE.to_string(),
            FlowError::TokenUnavailable(_) => SECURITY_SETUP_FAILED_MESSAGE.to_string(),
            FlowError::Submission(_) => "Something went wrong. Please try again later.".to_string(),
            FlowError::InvalidState(_)
            | FlowError::Config(_)
            | FlowError::Io(_)
            | FlowError::Json(_) => "An internal error occurred".to_string(),
        }
    }

    /// Whether the user can fix this by changing their input
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            FlowError::Validation(_)
                | FlowError::PasswordMismatch
                | FlowError::WeakPassword { .. }
                | FlowError::TermsNotAccepted
                | FlowError::MissingPassword
                | FlowError::IncompletePin
                | FlowError::PinMismatch
        )
    }
}

impl From<figment::Error> for FlowError {
    fn from(err: figment::Error) -> Self {
        FlowError::Config(Box::new(err))
    }
}

impl From<String> for FlowError {
    fn from(msg: String) -> Self {
        FlowError::InvalidState(msg)
    }
}

impl From<&str> for FlowError {
    fn from(msg: &str) -> Self {
        FlowError::InvalidState(msg.to_string())
    }
}
