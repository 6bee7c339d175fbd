// ==============
// crates/formflow-lib/src/metrics.rs

//! Central place for metric keys
pub const SUBMIT_ATTEMPT: &str = "formflow.submit.attempt";
pub const SUBMIT_RATE_LIMITED: &str = "formflow.submit.rate_limited";
pub const SUBMIT_SUCCEEDED: &str = "formflow.submit.succeeded";
pub const SUBMIT_FAILED: &str = "formflow.submit.failed";
pub const STEP_TRANSITION: &str = "formflow.step.transition";
pub const PIN_CONFIRMED: &str = "formflow.pin.confirmed";
pub const PIN_MISMATCH: &str = "formflow.pin.mismatch";
pub const TOKEN_FETCH_FAILED: &str = "formflow.token.fetch_failed";
