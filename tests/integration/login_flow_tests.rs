// ====================================
// tests/integration/login_flow_tests.rs
// ====================================
//! Login driven through a `FlowContext`
use std::sync::Arc;

use formflow_common::Submission;
use formflow_lib::auth::{RecordingSubmitter, SubmitError, UnavailableTokenProvider};
use formflow_lib::config::Settings;
use formflow_lib::error::{RATE_LIMITED_MESSAGE, SECURITY_SETUP_FAILED_MESSAGE};
use formflow_lib::flows::login::LOGIN_FAILED_MESSAGE;
use formflow_lib::{FlowContext, FlowError};

use crate::test_utils::{failing_context, recording_context};

#[tokio::test]
async fn test_login_with_email() {
    let (ctx, submitter) = recording_context(Settings::default());
    let mut flow = ctx.login_flow().await;
    flow.set_identifier("ada@example.com");
    flow.set_password("hunter22");
    flow.submit(ctx.submitter.as_ref()).await.unwrap();

    assert!(flow.is_logged_in());
    let sent = submitter.submissions();
    assert_eq!(sent[0].kind(), "login");
    assert!(!sent[0].session_token().is_empty());
    // Logged payloads never carry the password
    assert!(!sent[0].to_log_json().to_string().contains("hunter22"));
}

#[tokio::test]
async fn test_token_failure_leaves_form_usable() {
    let submitter = Arc::new(RecordingSubmitter::new());
    let ctx = FlowContext::new(
        Arc::new(UnavailableTokenProvider {
            reason: "offline".into(),
        }),
        submitter.clone(),
        Settings::default(),
    );
    let mut flow = ctx.login_flow().await;
    assert_eq!(flow.error(), Some(SECURITY_SETUP_FAILED_MESSAGE));

    flow.set_identifier("677123456");
    flow.set_password("pw");
    flow.submit(ctx.submitter.as_ref()).await.unwrap();
    match &submitter.submissions()[0] {
        Submission::Login { session_token, .. } => assert!(session_token.is_empty()),
        other => panic!("unexpected submission {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_login_message() {
    let (ctx, _) = failing_context(SubmitError::Rejected("bad password for user 7".into()));
    let mut flow = ctx.login_flow().await;
    flow.set_identifier("ada@example.com");
    flow.set_password("wrong");
    let err = flow.submit(ctx.submitter.as_ref()).await.unwrap_err();
    assert!(matches!(err, FlowError::Submission(_)));
    assert_eq!(flow.error(), Some(LOGIN_FAILED_MESSAGE));
    assert!(!flow.is_logged_in());
}

#[tokio::test(start_paused = true)]
async fn test_repeated_failures_are_rate_limited() {
    let (ctx, submitter) = failing_context(SubmitError::Rejected("nope".into()));
    let mut flow = ctx.login_flow().await;
    flow.set_identifier("ada@example.com");
    flow.set_password("wrong");

    for _ in 0..5 {
        assert!(matches!(
            flow.submit(ctx.submitter.as_ref()).await,
            Err(FlowError::Submission(_))
        ));
        tokio::time::advance(std::time::Duration::from_secs(1)).await;
    }
    assert!(matches!(
        flow.submit(ctx.submitter.as_ref()).await,
        Err(FlowError::RateLimited { .. })
    ));
    assert_eq!(submitter.len(), 5);
    assert_eq!(flow.rate_limit_message(), Some(RATE_LIMITED_MESSAGE));
    assert!(!flow.can_submit());
}
