// ============================
// crates/formflow-lib/src/flows/login.rs
// ============================
//! Login with an email address or phone number.

use formflow_common::{FieldId, Submission, ValidationResult};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use zeroize::Zeroize;

use super::SubmitGate;
use crate::auth::{SubmissionService, TokenProvider};
use crate::config::Settings;
use crate::error::{FlowError, FlowResult};
use crate::validation::{sanitize_string, validate_login_identifier, ValidationError};

/// Shown when the collaborator rejects a login
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials and try again.";

/// Serializable view of the login form, without the password
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginSnapshot {
    pub identifier: String,
    pub remember_me: bool,
    pub input_error: Option<String>,
    pub error: Option<String>,
    pub rate_limited: bool,
    pub can_submit: bool,
    pub logged_in: bool,
}

/// Login session
#[derive(Debug)]
pub struct LoginFlow {
    id: Uuid,
    identifier: String,
    password: String,
    remember_me: bool,
    input_check: ValidationResult,
    error: Option<String>,
    gate: SubmitGate,
    logged_in: bool,
}

impl LoginFlow {
    pub fn new(settings: &Settings) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier: String::new(),
            password: String::new(),
            remember_me: false,
            input_check: ValidationResult::pending(FieldId::LoginIdentifier),
            error: None,
            gate: SubmitGate::new("login", &settings.rate_limit),
            logged_in: false,
        }
    }

    pub async fn init_token(&mut self, provider: &dyn TokenProvider) {
        if let Err(e) = self.gate.init_token(provider).await {
            self.error = Some(e.user_message());
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn remember_me(&self) -> bool {
        self.remember_me
    }

    pub fn input_error(&self) -> Option<&str> {
        self.input_check.error()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn rate_limit_message(&self) -> Option<&'static str> {
        self.gate.rate_limit_message()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Store the sanitized identifier; an empty field clears the inline error
    pub fn set_identifier(&mut self, raw: &str) {
        self.identifier = sanitize_string(raw);
        self.input_check = if self.identifier.is_empty() {
            ValidationResult::pending(FieldId::LoginIdentifier)
        } else {
            validate_login_identifier(&self.identifier)
        };
    }

    pub fn set_password(&mut self, value: &str) {
        self.password.zeroize();
        self.password = value.to_string();
    }

    pub fn set_remember_me(&mut self, remember: bool) {
        self.remember_me = remember;
    }

    /// Whether the "log in" button should be enabled
    pub fn can_submit(&self) -> bool {
        !self.identifier.is_empty()
            && !self.password.is_empty()
            && self.input_error().is_none()
            && !self.gate.is_blocked()
    }

    pub fn submission(&self) -> Submission {
        Submission::Login {
            identifier: self.identifier.clone(),
            password: self.password.clone(),
            remember_me: self.remember_me,
            session_token: self.gate.session_token(),
        }
    }

    /// Submit the credentials; every attempt counts against the rate limiter
    pub async fn submit(&mut self, service: &dyn SubmissionService) -> FlowResult<()> {
        self.gate.check()?;

        self.input_check = validate_login_identifier(&self.identifier);
        if !self.input_check.is_valid {
            return Err(if self.identifier.trim().is_empty() {
                ValidationError::MissingIdentifier
            } else {
                ValidationError::InvalidIdentifier(self.identifier.clone())
            }
            .into());
        }

        if self.password.is_empty() {
            let err = FlowError::MissingPassword;
            self.error = Some(err.user_message());
            return Err(err);
        }

        match self.gate.submit(service, self.submission()).await {
            Ok(()) => {
                info!(flow = %self.id, remember_me = self.remember_me, "login accepted");
                self.error = None;
                self.logged_in = true;
                Ok(())
            },
            Err(e) => {
                self.error = Some(LOGIN_FAILED_MESSAGE.to_string());
                Err(e)
            },
        }
    }

    pub fn snapshot(&self) -> LoginSnapshot {
        LoginSnapshot {
            identifier: self.identifier.clone(),
            remember_me: self.remember_me,
            input_error: self.input_error().map(str::to_string),
            error: self.error.clone(),
            rate_limited: self.gate.is_blocked(),
            can_submit: self.can_submit(),
            logged_in: self.logged_in,
        }
    }
}

impl Drop for LoginFlow {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}
