// =========================================
// tests/integration/withdrawal_flow_tests.rs
// =========================================
//! Mobile money withdrawal through a `FlowContext`
use formflow_common::{PaymentProvider, Submission};
use formflow_lib::config::Settings;
use formflow_lib::validation::{INVALID_AMOUNT_MESSAGE, INVALID_PHONE_MESSAGE};

use crate::test_utils::recording_context;

#[tokio::test]
async fn test_withdrawal_defaults_to_mtn() {
    let (ctx, submitter) = recording_context(Settings::default());
    let mut form = ctx.withdrawal_form().await;
    assert_eq!(form.withdrawable_balance(), 480_848.0);

    form.set_mobile_number("677 12 34 56");
    form.set_amount("105,624.00 F");
    form.submit(ctx.submitter.as_ref()).await.unwrap();

    match &submitter.submissions()[0] {
        Submission::Withdrawal {
            provider,
            mobile_number,
            amount,
            session_token,
        } => {
            assert_eq!(*provider, PaymentProvider::Mtn);
            assert_eq!(mobile_number, "677123456");
            assert_eq!(*amount, 105_624.0);
            assert!(session_token.starts_with("token-"));
        },
        other => panic!("unexpected submission {other:?}"),
    }
}

#[tokio::test]
async fn test_inline_errors() {
    let (ctx, submitter) = recording_context(Settings::default());
    let mut form = ctx.withdrawal_form().await;
    form.set_provider(PaymentProvider::Orange);

    form.set_mobile_number("5551234");
    assert_eq!(form.mobile_error(), Some(INVALID_PHONE_MESSAGE));
    form.set_amount("abc");
    assert_eq!(form.amount_error(), Some(INVALID_AMOUNT_MESSAGE));
    form.set_amount("");
    assert_eq!(form.amount_error(), None);

    assert!(form.submit(ctx.submitter.as_ref()).await.is_err());
    assert!(submitter.is_empty());

    let snapshot = serde_json::to_value(form.snapshot()).unwrap();
    assert_eq!(snapshot["provider"], "ORANGE");
}
