// ================
// crates/common/src/lib.rs
// ================
//! Common types shared between the form-flow core and whatever performs the
//! real submission. This module defines the submission payloads handed to the
//! submission collaborator and the per-field validation results reported to the
//! presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder written instead of a password whenever a payload is printed.
pub const REDACTED: &str = "********";

/// Identifies an input field of one of the forms
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    FirstName,
    Phone,
    Email,
    LoginIdentifier,
    MobileNumber,
    Amount,
}

/// Outcome of validating one field value
///
/// An empty `message` together with `is_valid == false` means the field has not
/// been filled in yet and no error should be displayed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub field_id: FieldId,
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn valid(field_id: FieldId) -> Self {
        Self {
            field_id,
            is_valid: true,
            message: String::new(),
        }
    }

    /// Invalid but not yet worth reporting (empty input).
    pub fn pending(field_id: FieldId) -> Self {
        Self {
            field_id,
            is_valid: false,
            message: String::new(),
        }
    }

    pub fn invalid(field_id: FieldId, message: impl Into<String>) -> Self {
        Self {
            field_id,
            is_valid: false,
            message: message.into(),
        }
    }

    /// The message to show inline, if any
    pub fn error(&self) -> Option<&str> {
        if self.message.is_empty() {
            None
        } else {
            Some(&self.message)
        }
    }
}

/// Mobile money operator for withdrawals
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentProvider {
    #[default]
    Mtn,
    Orange,
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentProvider::Mtn => f.write_str("MTN"),
            PaymentProvider::Orange => f.write_str("ORANGE"),
        }
    }
}

/// Finalized payloads handed to the submission collaborator
#[derive(Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum Submission {
    /// Account creation
    /// # Fields
    /// * `first_name` / `middle_name` - HTML-escaped names
    /// * `phone` - 9 digits, no separators
    /// * `password` - plain text, never logged
    /// * `session_token` - opaque anti-forgery token
    CreateAccount {
        first_name: String,
        middle_name: String,
        phone: String,
        email: String,
        password: String,
        session_token: String,
    },
    /// Log in with an email or phone identifier
    Login {
        identifier: String,
        password: String,
        remember_me: bool,
        session_token: String,
    },
    /// A confirmed 4-digit PIN
    ConfirmPin { pin: String, session_token: String },
    /// Mobile money withdrawal request
    Withdrawal {
        provider: PaymentProvider,
        mobile_number: String,
        amount: f64,
        session_token: String,
    },
}

impl Submission {
    /// Short name used in logs and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            Submission::CreateAccount { .. } => "create_account",
            Submission::Login { .. } => "login",
            Submission::ConfirmPin { .. } => "confirm_pin",
            Submission::Withdrawal { .. } => "withdrawal",
        }
    }

    pub fn session_token(&self) -> &str {
        match self {
            Submission::CreateAccount { session_token, .. }
            | Submission::Login { session_token, .. }
            | Submission::ConfirmPin { session_token, .. }
            | Submission::Withdrawal { session_token, .. } => session_token,
        }
    }

    /// Copy of the payload with secrets replaced by [`REDACTED`]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            Submission::CreateAccount { password, .. } | Submission::Login { password, .. } => {
                *password = REDACTED.to_string();
            },
            Submission::ConfirmPin { pin, .. } => *pin = REDACTED.to_string(),
            Submission::Withdrawal { .. } => {},
        }
        copy
    }

    /// JSON rendering of the redacted payload
    pub fn to_log_json(&self) -> serde_json::Value {
        serde_json::to_value(self.redacted()).unwrap_or(serde_json::Value::Null)
    }
}

// Debug must never print a password or PIN.
impl fmt::Debug for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_log_json())
    }
}
