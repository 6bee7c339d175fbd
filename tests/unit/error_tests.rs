// ==========================
// tests/unit/error_tests.rs
// ==========================
//! Error codes and user-facing messages
use std::time::Duration;

use formflow_lib::auth::SubmitError;
use formflow_lib::error::{
    PASSWORDS_DO_NOT_MATCH_MESSAGE, RATE_LIMITED_MESSAGE, SECURITY_SETUP_FAILED_MESSAGE,
};
use formflow_lib::validation::ValidationError;
use formflow_lib::FlowError;

#[test]
fn test_error_codes() {
    let cases: Vec<(FlowError, &str)> = vec![
        (ValidationError::MissingFirstName.into(), "VAL_001"),
        (
            FlowError::RateLimited {
                retry_after: Duration::from_secs(3),
            },
            "RATE_001",
        ),
        (FlowError::PasswordMismatch, "PWD_001"),
        (
            FlowError::WeakPassword {
                score: 1,
                required: 3,
            },
            "PWD_002",
        ),
        (FlowError::TermsNotAccepted, "TERMS_001"),
        (FlowError::PinMismatch, "PIN_002"),
        (FlowError::TokenUnavailable("down".into()), "SEC_001"),
        (SubmitError::Transport("x".into()).into(), "SUB_001"),
    ];
    for (err, code) in cases {
        assert_eq!(err.error_code(), code, "{err}");
    }
}

#[test]
fn test_user_messages() {
    assert_eq!(
        FlowError::RateLimited {
            retry_after: Duration::from_secs(59)
        }
        .user_message(),
        RATE_LIMITED_MESSAGE
    );
    assert_eq!(
        FlowError::PasswordMismatch.user_message(),
        PASSWORDS_DO_NOT_MATCH_MESSAGE
    );
    assert_eq!(
        FlowError::TokenUnavailable("provider timeout".into()).user_message(),
        SECURITY_SETUP_FAILED_MESSAGE
    );
    assert_eq!(
        FlowError::from(ValidationError::InvalidPhone("123".into())).user_message(),
        "Please enter a valid phone number"
    );
}

#[test]
fn test_collaborator_details_stay_internal() {
    let err = FlowError::from(SubmitError::Rejected("row 17 violates users_email_key".into()));
    assert!(err.to_string().contains("users_email_key"));
    assert!(!err.user_message().contains("users_email_key"));
    assert!(!err.is_user_correctable());
}

#[test]
fn test_correctable_errors() {
    assert!(FlowError::TermsNotAccepted.is_user_correctable());
    assert!(FlowError::IncompletePin.is_user_correctable());
    assert!(FlowError::from(ValidationError::MissingIdentifier).is_user_correctable());
}

#[test]
fn test_rate_limit_display_in_seconds() {
    let err = FlowError::RateLimited {
        retry_after: Duration::from_millis(41_900),
    };
    assert_eq!(err.to_string(), "Rate limit exceeded, retry in 41s");
}
