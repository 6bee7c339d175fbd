// ============================
// crates/formflow-lib/src/flows/mod.rs
// ============================
//! Form sessions.
//!
//! Each flow owns its draft, its rate limiter and its session token; nothing
//! is shared between two mounted forms. The submission plumbing common to all
//! flows lives in [`SubmitGate`].

pub mod account;
pub mod login;
pub mod pin;
pub mod withdrawal;

use std::sync::Arc;

use ::metrics::counter;
use formflow_common::Submission;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{
    RateLimitDecision, RateLimitState, SubmissionService, SubmitRateLimiter, TokenProvider,
    UnblockTimer,
};
use crate::config::RateLimitSettings;
use crate::error::{FlowError, FlowResult, RATE_LIMITED_MESSAGE};
use crate::metrics as keys;

pub use account::{AccountFlow, AccountSnapshot, AccountStep, FormDraft};
pub use login::{LoginFlow, LoginSnapshot};
pub use pin::{
    PinBuffer, PinFlow, PinInput, PinSnapshot, PinStage, PIN_LENGTH, PIN_SETUP_FAILED_MESSAGE,
};
pub use withdrawal::{WithdrawalForm, WithdrawalSnapshot};

/// Side effects the presentation layer has to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// A step changed; the view should scroll back to the top
    ScrollToTop,
}

/// Rate limiting, session token and collaborator hand-off for one form session
#[derive(Debug)]
pub struct SubmitGate {
    flow: &'static str,
    limiter: Arc<Mutex<SubmitRateLimiter>>,
    timer: UnblockTimer,
    token: Option<String>,
}

impl SubmitGate {
    pub fn new(flow: &'static str, settings: &RateLimitSettings) -> Self {
        Self::with_limiter(
            flow,
            SubmitRateLimiter::new(settings.max_attempts, settings.window()),
        )
    }

    pub fn with_limiter(flow: &'static str, limiter: SubmitRateLimiter) -> Self {
        Self {
            flow,
            limiter: Arc::new(Mutex::new(limiter)),
            timer: UnblockTimer::new(),
            token: None,
        }
    }

    /// Fetch the session token once at session start
    pub async fn init_token(&mut self, provider: &dyn TokenProvider) -> FlowResult<()> {
        match provider.fetch_token().await {
            Ok(token) => {
                self.token = Some(token);
                Ok(())
            },
            Err(e) => {
                warn!(flow = self.flow, error = %e, "session token fetch failed");
                counter!(keys::TOKEN_FETCH_FAILED, "flow" => self.flow).increment(1);
                Err(FlowError::TokenUnavailable(e.to_string()))
            },
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Token attached to submissions; empty when the fetch failed
    pub fn session_token(&self) -> String {
        self.token.clone().unwrap_or_default()
    }

    /// Count a submission attempt against the limiter
    ///
    /// On denial the unblock is scheduled and `RateLimited` is returned.
    pub fn check(&mut self) -> FlowResult<u32> {
        counter!(keys::SUBMIT_ATTEMPT, "flow" => self.flow).increment(1);

        let decision = self.limiter.lock().attempt();
        match decision {
            RateLimitDecision::Allowed { attempt_count } => Ok(attempt_count),
            RateLimitDecision::Denied { retry_after } => {
                counter!(keys::SUBMIT_RATE_LIMITED, "flow" => self.flow).increment(1);
                self.timer.schedule(Arc::clone(&self.limiter), retry_after);
                Err(FlowError::RateLimited { retry_after })
            },
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.limiter.lock().is_blocked()
    }

    /// Rate-limit banner, shown separately from the global error
    pub fn rate_limit_message(&self) -> Option<&'static str> {
        self.is_blocked().then_some(RATE_LIMITED_MESSAGE)
    }

    pub fn limiter_state(&self) -> RateLimitState {
        self.limiter.lock().state().clone()
    }

    /// Hand a finalized payload to the collaborator
    pub async fn submit(
        &self,
        service: &dyn SubmissionService,
        submission: Submission,
    ) -> FlowResult<()> {
        let kind = submission.kind();
        info!(flow = self.flow, kind, payload = %submission.to_log_json(), "submitting");

        match service.submit(submission).await {
            Ok(()) => {
                counter!(keys::SUBMIT_SUCCEEDED, "flow" => self.flow).increment(1);
                Ok(())
            },
            Err(e) => {
                warn!(flow = self.flow, kind, error = %e, "submission failed");
                counter!(keys::SUBMIT_FAILED, "flow" => self.flow).increment(1);
                Err(FlowError::Submission(e))
            },
        }
    }
}
