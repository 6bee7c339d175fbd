// ============================
// crates/formflow-lib/src/auth/session.rs
// ============================
//! Collaborators a form session talks to: where the session token comes from
//! and where finalized payloads go.
use async_trait::async_trait;
use formflow_common::Submission;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::info;

use super::token_generator::simulated_session_token;

/// Failure reported by a submission collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Failure reported by a token provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token provider unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the opaque anti-forgery token attached to every submission
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch_token(&self) -> Result<String, TokenError>;
}

/// Performs the real submission of a finalized payload
#[async_trait]
pub trait SubmissionService: Send + Sync {
    async fn submit(&self, submission: Submission) -> Result<(), SubmitError>;
}

/// Token provider generating `token-<random>-<millis>` tokens locally
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTokenProvider;

#[async_trait]
impl TokenProvider for LocalTokenProvider {
    async fn fetch_token(&self) -> Result<String, TokenError> {
        Ok(simulated_session_token())
    }
}

/// Token provider that always fails
#[derive(Debug, Clone, Default)]
pub struct UnavailableTokenProvider {
    pub reason: String,
}

#[async_trait]
impl TokenProvider for UnavailableTokenProvider {
    async fn fetch_token(&self) -> Result<String, TokenError> {
        Err(TokenError::Unavailable(self.reason.clone()))
    }
}

/// Submission service that only logs the redacted payload and succeeds
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSubmitter;

#[async_trait]
impl SubmissionService for DryRunSubmitter {
    async fn submit(&self, submission: Submission) -> Result<(), SubmitError> {
        info!(
            kind = submission.kind(),
            payload = %submission.to_log_json(),
            "dry-run submission"
        );
        Ok(())
    }
}

/// Submission service that keeps every payload it receives
///
/// Optionally rejects everything with `fail_with`, which is how callers
/// exercise the generic failure banners.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    submissions: Mutex<Vec<Submission>>,
    fail_with: Option<SubmitError>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: SubmitError) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            fail_with: Some(error),
        }
    }

    /// Payloads received so far, including rejected ones
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.submissions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SubmissionService for RecordingSubmitter {
    async fn submit(&self, submission: Submission) -> Result<(), SubmitError> {
        self.submissions.lock().push(submission);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
