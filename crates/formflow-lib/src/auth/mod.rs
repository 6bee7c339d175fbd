// ============================
// crates/formflow-lib/src/auth/mod.rs
// ============================
//! Credentials-related building blocks: password scoring, submission rate
//! limiting, session tokens and the submission collaborators.

pub mod password;
pub mod rate_limit;
pub mod session;
pub mod token_generator;

pub use password::{
    check_password_strength, check_password_strength_with, passwords_match, PasswordStrength,
    StrengthLevel, MIN_ACCEPTED_SCORE, MIN_PASSWORD_LENGTH,
};
pub use rate_limit::{RateLimitDecision, RateLimitState, SubmitRateLimiter, UnblockTimer};
pub use session::{
    DryRunSubmitter, LocalTokenProvider, RecordingSubmitter, SubmissionService, SubmitError,
    TokenError, TokenProvider, UnavailableTokenProvider,
};
