// ================================
// tests/integration/replay_tests.rs
// ================================
//! Scripted sessions, as fed to `formflow replay`
use std::fs;

use formflow_lib::auth::SubmitError;
use formflow_lib::config::Settings;
use formflow_lib::flows::PIN_SETUP_FAILED_MESSAGE;
use formflow_lib::replay::{run_script, FlowKind, Script};
use tempfile::tempdir;

use crate::test_utils::{failing_context, recording_context};

const ACCOUNT_SCRIPT: &str = r#"{
  "flow": "account",
  "events": [
    { "type": "set_first_name", "value": "<b>Ada</b>" },
    { "type": "set_email", "value": "ada@example.com" },
    { "type": "set_phone", "value": "67712345" },
    { "type": "next" },
    { "type": "set_phone", "value": "677123456" },
    { "type": "next" },
    { "type": "set_password", "value": "Str0ng#Pass" },
    { "type": "set_confirm_password", "value": "Str0ng#Pass" },
    { "type": "set_terms", "accepted": true },
    { "type": "submit" }
  ]
}"#;

#[tokio::test]
async fn test_account_script_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("account.json");
    fs::write(&path, ACCOUNT_SCRIPT).unwrap();

    let (ctx, submitter) = recording_context(Settings::default());
    let report = run_script(&ctx, Script::load(&path).unwrap()).await.unwrap();

    assert_eq!(report.flow, FlowKind::Account);
    assert_eq!(report.failures(), 1);
    assert!(!report.outcomes[3].ok);
    assert_eq!(report.outcomes[3].code, Some("VAL_001"));
    assert!(report.outcomes[9].ok);

    assert_eq!(report.state["step"], "credentials");
    assert_eq!(report.state["first_name"], "&lt;b&gt;Ada&lt;/b&gt;");
    assert_eq!(report.state["submitted"], true);
    assert_eq!(report.state["strength"]["score"], 6);
    // Snapshots never carry passwords
    assert!(!report.state.to_string().contains("Str0ng#Pass"));
    assert_eq!(submitter.len(), 1);
}

#[tokio::test]
async fn test_pin_mismatch_script() {
    let script = Script::from_json(
        r#"{"flow":"pin","events":[
            {"type":"digit","digit":1},{"type":"digit","digit":2},
            {"type":"digit","digit":3},{"type":"digit","digit":4},
            {"type":"confirm"},
            {"type":"digit","digit":5},{"type":"digit","digit":6},
            {"type":"digit","digit":7},{"type":"digit","digit":8},
            {"type":"confirm"}
        ]}"#,
    )
    .unwrap();

    let (ctx, submitter) = recording_context(Settings::default());
    let report = run_script(&ctx, script).await.unwrap();
    assert_eq!(report.outcomes[9].code, Some("PIN_002"));
    assert_eq!(report.state["stage"], "confirm");
    assert_eq!(report.state["create_filled"], 4);
    assert_eq!(report.state["confirm_filled"], 0);
    assert!(submitter.is_empty());
}

#[tokio::test]
async fn test_pin_script_surfaces_rejected_pin() {
    let script = Script::from_json(
        r#"{"flow":"pin","events":[
            {"type":"set_slot","index":0,"value":"4"},{"type":"set_slot","index":1,"value":"4"},
            {"type":"set_slot","index":2,"value":"0"},{"type":"set_slot","index":3,"value":"4"},
            {"type":"confirm"},
            {"type":"digit","digit":4},{"type":"digit","digit":4},
            {"type":"digit","digit":0},{"type":"digit","digit":4},
            {"type":"confirm"}
        ]}"#,
    )
    .unwrap();

    let (ctx, submitter) = failing_context(SubmitError::Rejected("pin store offline".into()));
    let report = run_script(&ctx, script).await.unwrap();

    assert_eq!(report.failures(), 1);
    assert_eq!(report.outcomes[9].code, Some("SUB_001"));
    assert_eq!(report.state["stage"], "confirmed");
    assert_eq!(report.state["error"], PIN_SETUP_FAILED_MESSAGE);
    // Collaborator details never reach the banner
    assert!(!report.state.to_string().contains("offline"));
    assert_eq!(submitter.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_login_script_waits_out_block() {
    let mut events = String::new();
    for _ in 0..6 {
        events.push_str(r#"{"type":"submit"},"#);
    }
    events.push_str(r#"{"type":"wait","millis":61000},{"type":"submit"}"#);
    let json = format!(
        r#"{{"flow":"login","events":[
            {{"type":"set_identifier","value":"ada@example.com"}},
            {{"type":"set_password","value":"pw"}},
            {events}
        ]}}"#
    );

    let (ctx, submitter) = recording_context(Settings::default());
    let report = run_script(&ctx, Script::from_json(&json).unwrap()).await.unwrap();

    let codes: Vec<_> = report.outcomes.iter().map(|o| o.code).collect();
    assert_eq!(codes[7], Some("RATE_001"));
    assert!(report.outcomes[9].ok);
    assert_eq!(submitter.len(), 6);
    assert_eq!(report.state["rate_limited"], false);
    assert_eq!(report.state["logged_in"], true);
}
