// ============================
// crates/formflow-lib/src/auth/token_generator.rs
// ============================
//! Secure token generation for form sessions.
//!
//! Session tokens are opaque to the flows; this module only produces the
//! locally simulated ones used when no real token endpoint is wired in.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use rand::{rngs::OsRng, RngCore};

/// Random bytes in a simulated session token
const SESSION_TOKEN_BYTES: usize = 12;

/// `bytes` of OS entropy, base64url encoded without padding
pub fn random_token(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/// Simulated anti-forgery token: `token-<random>-<unix millis>`
pub fn simulated_session_token() -> String {
    format!(
        "token-{}-{}",
        random_token(SESSION_TOKEN_BYTES),
        Utc::now().timestamp_millis()
    )
}
