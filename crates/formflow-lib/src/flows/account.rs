// ============================
// crates/formflow-lib/src/flows/account.rs
// ============================
//! Two-step account creation.
//!
//! Step 1 collects identity and contact fields, step 2 the password and terms.
//! Moving forward is gated by the field validators; submitting is gated by the
//! password rules and the session's rate limiter.

use formflow_common::{Submission, ValidationResult};
use serde::Serialize;
use ::metrics::counter;
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroize;

use super::{Effect, SubmitGate};
use crate::auth::{
    check_password_strength_with, passwords_match, PasswordStrength, SubmissionService,
    TokenProvider,
};
use crate::config::{PasswordSettings, Settings};
use crate::error::{FlowError, FlowResult, PASSWORDS_DO_NOT_MATCH_MESSAGE};
use crate::metrics as keys;
use crate::validation::{
    normalize_phone, sanitize_string, validate_email, validate_first_name, validate_phone,
    ValidationError,
};

/// Shown when the collaborator rejects an account creation
pub const ACCOUNT_SUBMIT_FAILED_MESSAGE: &str =
    "We couldn't create your account at this time. Please try again later.";

/// Step of the account creation form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStep {
    /// Step 1: names, phone and email
    Details,
    /// Step 2: password, confirmation and terms
    Credentials,
}

/// In-memory account form contents; passwords are wiped on drop
#[derive(Default, Clone)]
pub struct FormDraft {
    pub first_name: String,
    pub middle_name: String,
    pub phone_digits: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub terms_accepted: bool,
}

impl std::fmt::Debug for FormDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDraft")
            .field("first_name", &self.first_name)
            .field("middle_name", &self.middle_name)
            .field("phone_digits", &self.phone_digits)
            .field("email", &self.email)
            .field("terms_accepted", &self.terms_accepted)
            .finish_non_exhaustive()
    }
}

impl Drop for FormDraft {
    fn drop(&mut self) {
        self.password.zeroize();
        self.confirm_password.zeroize();
    }
}

/// Serializable view of the account form, without passwords
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSnapshot {
    pub step: AccountStep,
    pub first_name: String,
    pub middle_name: String,
    pub phone: String,
    pub email: String,
    pub terms_accepted: bool,
    pub email_error: Option<String>,
    pub phone_error: Option<String>,
    pub strength: PasswordStrength,
    pub passwords_match: bool,
    pub error: Option<String>,
    pub rate_limited: bool,
    pub can_advance: bool,
    pub can_submit: bool,
    pub submitted: bool,
}

/// Account creation session
#[derive(Debug)]
pub struct AccountFlow {
    id: Uuid,
    step: AccountStep,
    draft: FormDraft,
    email_check: ValidationResult,
    phone_check: ValidationResult,
    strength: PasswordStrength,
    passwords_match: bool,
    error: Option<String>,
    /// `error` holds a step-1 reason that corrective input may clear
    details_banner: bool,
    policy: PasswordSettings,
    gate: SubmitGate,
    effects: Vec<Effect>,
    submitted: bool,
}

impl AccountFlow {
    pub fn new(settings: &Settings) -> Self {
        Self {
            id: Uuid::new_v4(),
            step: AccountStep::Details,
            draft: FormDraft::default(),
            email_check: validate_email(""),
            phone_check: validate_phone(""),
            strength: PasswordStrength::default(),
            passwords_match: false,
            error: None,
            details_banner: false,
            policy: settings.password.clone(),
            gate: SubmitGate::new("account", &settings.rate_limit),
            effects: Vec::new(),
            submitted: false,
        }
    }

    /// Fetch the session token; failure leaves the form usable
    pub async fn init_token(&mut self, provider: &dyn TokenProvider) {
        if let Err(e) = self.gate.init_token(provider).await {
            self.error = Some(e.user_message());
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> AccountStep {
        self.step
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    /// Global banner message
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn rate_limit_message(&self) -> Option<&'static str> {
        self.gate.rate_limit_message()
    }

    pub fn email_error(&self) -> Option<&str> {
        self.email_check.error()
    }

    pub fn phone_error(&self) -> Option<&str> {
        self.phone_check.error()
    }

    pub fn strength(&self) -> &PasswordStrength {
        &self.strength
    }

    pub fn passwords_match(&self) -> bool {
        self.passwords_match
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn session_token(&self) -> Option<&str> {
        self.gate.token()
    }

    /// Drain pending presentation effects
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn set_first_name(&mut self, raw: &str) {
        self.draft.first_name = sanitize_string(raw);
        self.refresh_details_banner();
    }

    pub fn set_middle_name(&mut self, raw: &str) {
        self.draft.middle_name = sanitize_string(raw);
    }

    pub fn set_phone(&mut self, raw: &str) {
        self.draft.phone_digits = normalize_phone(raw);
        self.phone_check = validate_phone(&self.draft.phone_digits);
        self.refresh_details_banner();
    }

    pub fn set_email(&mut self, raw: &str) {
        self.draft.email = raw.to_string();
        self.email_check = validate_email(raw);
        self.refresh_details_banner();
    }

    // After a refused `next`, the banner follows the first reason still failing.
    fn refresh_details_banner(&mut self) {
        if !self.details_banner {
            return;
        }
        self.error = self
            .details_error()
            .map(|e| FlowError::from(e).user_message());
        self.details_banner = self.error.is_some();
    }

    pub fn set_password(&mut self, value: &str) {
        self.draft.password.zeroize();
        self.draft.password = value.to_string();
        self.refresh_password_feedback();
    }

    pub fn set_confirm_password(&mut self, value: &str) {
        self.draft.confirm_password.zeroize();
        self.draft.confirm_password = value.to_string();
        self.refresh_password_feedback();
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.draft.terms_accepted = accepted;
    }

    // Live strength and match feedback while typing on step 2.
    fn refresh_password_feedback(&mut self) {
        self.details_banner = false;
        if self.draft.password.is_empty() {
            self.strength = PasswordStrength::default();
            self.passwords_match = false;
            self.error = None;
            return;
        }

        self.strength = check_password_strength_with(&self.draft.password, self.policy.min_length);
        self.passwords_match = passwords_match(&self.draft.password, &self.draft.confirm_password);
        if !self.draft.confirm_password.is_empty() {
            self.error = if self.passwords_match {
                None
            } else {
                Some(PASSWORDS_DO_NOT_MATCH_MESSAGE.to_string())
            };
        }
    }

    /// Whether the "next" button should be enabled
    pub fn can_advance(&self) -> bool {
        validate_first_name(&self.draft.first_name).is_valid
            && !self.draft.phone_digits.is_empty()
            && !self.draft.email.is_empty()
            && self.phone_error().is_none()
            && self.email_error().is_none()
    }

    /// Whether the "create account" button should be enabled
    pub fn can_submit(&self) -> bool {
        self.step == AccountStep::Credentials
            && self.passwords_match
            && self.draft.terms_accepted
            && !self.draft.password.is_empty()
            && !self.draft.confirm_password.is_empty()
            && self.strength.is_acceptable(self.policy.min_score)
            && !self.gate.is_blocked()
    }

    /// First failing step-1 requirement, in display priority order
    fn details_error(&self) -> Option<ValidationError> {
        if !validate_first_name(&self.draft.first_name).is_valid {
            Some(ValidationError::MissingFirstName)
        } else if !self.email_check.is_valid {
            Some(ValidationError::InvalidEmail(self.draft.email.clone()))
        } else if !self.phone_check.is_valid {
            Some(ValidationError::InvalidPhone(self.draft.phone_digits.clone()))
        } else {
            None
        }
    }

    /// Step 1 -> step 2
    pub fn next(&mut self) -> FlowResult<()> {
        if self.step != AccountStep::Details {
            return Err(FlowError::InvalidState(
                "already on the credentials step".to_string(),
            ));
        }

        // Re-run the field validators so their inline errors are current
        self.email_check = validate_email(&self.draft.email);
        self.phone_check = validate_phone(&self.draft.phone_digits);

        if let Some(err) = self.details_error() {
            let err = FlowError::from(err);
            self.error = Some(err.user_message());
            self.details_banner = true;
            debug!(flow = %self.id, error = %err, "staying on details step");
            return Err(err);
        }

        self.transition(AccountStep::Credentials);
        Ok(())
    }

    /// Step 2 -> step 1, keeping every field
    pub fn back(&mut self) {
        self.error = None;
        self.details_banner = false;
        if self.step != AccountStep::Details {
            self.transition(AccountStep::Details);
        }
    }

    fn transition(&mut self, to: AccountStep) {
        debug!(flow = %self.id, from = ?self.step, ?to, "account step transition");
        counter!(keys::STEP_TRANSITION, "flow" => "account").increment(1);
        self.step = to;
        self.error = None;
        self.details_banner = false;
        self.effects.push(Effect::ScrollToTop);
    }

    // Password rules checked on submit, in the order their banners take priority.
    fn credentials_error(&self) -> Option<FlowError> {
        if !passwords_match(&self.draft.password, &self.draft.confirm_password) {
            Some(FlowError::PasswordMismatch)
        } else if !self.strength.is_acceptable(self.policy.min_score) {
            Some(FlowError::WeakPassword {
                score: self.strength.score,
                required: self.policy.min_score,
            })
        } else if !self.draft.terms_accepted {
            Some(FlowError::TermsNotAccepted)
        } else {
            None
        }
    }

    /// Build the payload for the collaborator
    pub fn submission(&self) -> Submission {
        Submission::CreateAccount {
            first_name: self.draft.first_name.clone(),
            middle_name: self.draft.middle_name.clone(),
            phone: self.draft.phone_digits.clone(),
            email: self.draft.email.clone(),
            password: self.draft.password.clone(),
            session_token: self.gate.session_token(),
        }
    }

    /// Submit the account; every attempt counts against the rate limiter
    pub async fn submit(&mut self, service: &dyn SubmissionService) -> FlowResult<()> {
        if self.step != AccountStep::Credentials {
            return Err(FlowError::InvalidState(
                "account can only be submitted from the credentials step".to_string(),
            ));
        }

        self.gate.check()?;

        if let Some(err) = self.credentials_error() {
            self.error = Some(err.user_message());
            return Err(err);
        }

        match self.gate.submit(service, self.submission()).await {
            Ok(()) => {
                info!(flow = %self.id, "account created");
                self.error = None;
                self.submitted = true;
                Ok(())
            },
            Err(e) => {
                self.error = Some(ACCOUNT_SUBMIT_FAILED_MESSAGE.to_string());
                Err(e)
            },
        }
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            step: self.step,
            first_name: self.draft.first_name.clone(),
            middle_name: self.draft.middle_name.clone(),
            phone: self.draft.phone_digits.clone(),
            email: self.draft.email.clone(),
            terms_accepted: self.draft.terms_accepted,
            email_error: self.email_error().map(str::to_string),
            phone_error: self.phone_error().map(str::to_string),
            strength: self.strength.clone(),
            passwords_match: self.passwords_match,
            error: self.error.clone(),
            rate_limited: self.gate.is_blocked(),
            can_advance: self.can_advance(),
            can_submit: self.can_submit(),
            submitted: self.submitted,
        }
    }
}
