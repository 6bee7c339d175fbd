// ============================
// crates/formflow-lib/src/flows/withdrawal.rs
// ============================
//! Mobile money withdrawal request form.

use formflow_common::{FieldId, PaymentProvider, Submission, ValidationResult};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::SubmitGate;
use crate::auth::{SubmissionService, TokenProvider};
use crate::config::Settings;
use crate::error::{FlowError, FlowResult};
use crate::validation::{
    check_amount, normalize_phone, validate_amount, validate_phone_for, ValidationError,
};

/// Shown when the collaborator rejects a withdrawal
pub const WITHDRAWAL_FAILED_MESSAGE: &str =
    "We couldn't process your withdrawal at this time. Please try again later.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithdrawalSnapshot {
    pub provider: PaymentProvider,
    pub mobile_number: String,
    pub amount: String,
    pub withdrawable_balance: f64,
    pub mobile_error: Option<String>,
    pub amount_error: Option<String>,
    pub error: Option<String>,
    pub rate_limited: bool,
    pub submitted: bool,
}

#[derive(Debug)]
pub struct WithdrawalForm {
    id: Uuid,
    provider: PaymentProvider,
    mobile_number: String,
    amount: String,
    balance: f64,
    mobile_check: ValidationResult,
    amount_check: ValidationResult,
    error: Option<String>,
    gate: SubmitGate,
    submitted: bool,
}

impl WithdrawalForm {
    pub fn new(settings: &Settings) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider: PaymentProvider::default(),
            mobile_number: String::new(),
            amount: String::new(),
            balance: settings.withdrawal.withdrawable_balance,
            mobile_check: ValidationResult::pending(FieldId::MobileNumber),
            amount_check: ValidationResult::pending(FieldId::Amount),
            error: None,
            gate: SubmitGate::new("withdrawal", &settings.rate_limit),
            submitted: false,
        }
    }

    pub async fn init_token(&mut self, provider: &dyn TokenProvider) {
        if let Err(e) = self.gate.init_token(provider).await {
            self.error = Some(e.user_message());
        }
    }

    pub fn provider(&self) -> PaymentProvider {
        self.provider
    }

    pub fn withdrawable_balance(&self) -> f64 {
        self.balance
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn mobile_error(&self) -> Option<&str> {
        self.mobile_check.error()
    }

    pub fn amount_error(&self) -> Option<&str> {
        self.amount_check.error()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn set_provider(&mut self, provider: PaymentProvider) {
        self.provider = provider;
    }

    pub fn set_mobile_number(&mut self, raw: &str) {
        self.mobile_number = normalize_phone(raw);
        self.mobile_check = validate_phone_for(FieldId::MobileNumber, &self.mobile_number);
    }

    pub fn set_amount(&mut self, raw: &str) {
        self.amount = raw.trim().to_string();
        self.amount_check = validate_amount(&self.amount, self.balance);
    }

    pub async fn submit(&mut self, service: &dyn SubmissionService) -> FlowResult<()> {
        self.gate.check()?;

        self.mobile_check = validate_phone_for(FieldId::MobileNumber, &self.mobile_number);
        if !self.mobile_check.is_valid {
            let err = FlowError::from(ValidationError::InvalidPhone(self.mobile_number.clone()));
            self.error = Some(err.user_message());
            return Err(err);
        }

        let amount = match check_amount(&self.amount, self.balance) {
            Ok(amount) => amount,
            Err(e) => {
                self.amount_check = ValidationResult::invalid(FieldId::Amount, e.user_message());
                let err = FlowError::from(e);
                self.error = Some(err.user_message());
                return Err(err);
            },
        };

        let submission = Submission::Withdrawal {
            provider: self.provider,
            mobile_number: self.mobile_number.clone(),
            amount,
            session_token: self.gate.session_token(),
        };

        match self.gate.submit(service, submission).await {
            Ok(()) => {
                info!(flow = %self.id, provider = %self.provider, amount, "withdrawal requested");
                self.error = None;
                self.submitted = true;
                Ok(())
            },
            Err(e) => {
                self.error = Some(WITHDRAWAL_FAILED_MESSAGE.to_string());
                Err(e)
            },
        }
    }

    pub fn snapshot(&self) -> WithdrawalSnapshot {
        WithdrawalSnapshot {
            provider: self.provider,
            mobile_number: self.mobile_number.clone(),
            amount: self.amount.clone(),
            withdrawable_balance: self.balance,
            mobile_error: self.mobile_error().map(str::to_string),
            amount_error: self.amount_error().map(str::to_string),
            error: self.error.clone(),
            rate_limited: self.gate.is_blocked(),
            submitted: self.submitted,
        }
    }
}
