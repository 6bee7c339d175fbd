// ============================
// formflow-lib/src/lib.rs
// ============================
//! Core form-flow functionality: validators, password strength, submission
//! rate limiting and the account, login, PIN and withdrawal flows.

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod metrics;
pub mod replay;
pub mod validation;

use std::sync::Arc;

use crate::auth::{DryRunSubmitter, LocalTokenProvider, SubmissionService, TokenProvider};
use crate::config::Settings;
use crate::flows::{AccountFlow, LoginFlow, PinFlow, WithdrawalForm};

pub use crate::error::{FlowError, FlowResult};

/// Collaborators and settings shared by every flow a host mounts
#[derive(Clone)]
pub struct FlowContext {
    /// Session token source
    pub tokens: Arc<dyn TokenProvider>,
    /// Receiver of finalized submissions
    pub submitter: Arc<dyn SubmissionService>,
    /// Loaded settings
    pub settings: Arc<Settings>,
}

impl FlowContext {
    pub fn new(
        tokens: Arc<dyn TokenProvider>,
        submitter: Arc<dyn SubmissionService>,
        settings: Settings,
    ) -> Self {
        Self {
            tokens,
            submitter,
            settings: Arc::new(settings),
        }
    }

    /// Local token generation and a submitter that only logs
    pub fn with_defaults(settings: Settings) -> Self {
        Self::new(
            Arc::new(LocalTokenProvider),
            Arc::new(DryRunSubmitter),
            settings,
        )
    }

    /// Start an account creation session with its own token
    pub async fn account_flow(&self) -> AccountFlow {
        let mut flow = AccountFlow::new(&self.settings);
        flow.init_token(self.tokens.as_ref()).await;
        flow
    }

    pub async fn login_flow(&self) -> LoginFlow {
        let mut flow = LoginFlow::new(&self.settings);
        flow.init_token(self.tokens.as_ref()).await;
        flow
    }

    pub async fn withdrawal_form(&self) -> WithdrawalForm {
        let mut form = WithdrawalForm::new(&self.settings);
        form.init_token(self.tokens.as_ref()).await;
        form
    }

    pub async fn pin_flow(&self, on_confirmed: impl FnOnce(String) + Send + 'static) -> PinFlow {
        let mut flow = PinFlow::new(&self.settings, on_confirmed);
        flow.init_token(self.tokens.as_ref()).await;
        flow
    }
}

impl std::fmt::Debug for FlowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
