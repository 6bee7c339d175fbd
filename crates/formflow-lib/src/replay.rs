// ============================
// crates/formflow-lib/src/replay.rs
// ============================
//! Scripted UI events.
//!
//! A script names one flow and a list of events as a host view would emit
//! them. Replaying it drives a fresh flow from a [`FlowContext`] and reports
//! the outcome of each event plus the final snapshot.

use std::path::Path;
use std::time::Duration;

use formflow_common::PaymentProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FlowError, FlowResult};
use crate::flows::PinStage;
use crate::FlowContext;

/// Which flow a script drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Account,
    Login,
    Pin,
    Withdrawal,
}

/// One UI event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SetFirstName { value: String },
    SetMiddleName { value: String },
    SetPhone { value: String },
    SetEmail { value: String },
    SetPassword { value: String },
    SetConfirmPassword { value: String },
    SetTerms { accepted: bool },
    Next,
    Back,
    Submit,
    SetIdentifier { value: String },
    SetRememberMe { remember: bool },
    Digit { digit: u8 },
    Backspace,
    SetSlot { index: usize, value: String },
    Confirm,
    SetProvider { provider: PaymentProvider },
    SetMobileNumber { value: String },
    SetAmount { value: String },
    /// Let time pass, e.g. for a rate-limit block to lapse
    Wait { millis: u64 },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::SetFirstName { .. } => "set_first_name",
            Event::SetMiddleName { .. } => "set_middle_name",
            Event::SetPhone { .. } => "set_phone",
            Event::SetEmail { .. } => "set_email",
            Event::SetPassword { .. } => "set_password",
            Event::SetConfirmPassword { .. } => "set_confirm_password",
            Event::SetTerms { .. } => "set_terms",
            Event::Next => "next",
            Event::Back => "back",
            Event::Submit => "submit",
            Event::SetIdentifier { .. } => "set_identifier",
            Event::SetRememberMe { .. } => "set_remember_me",
            Event::Digit { .. } => "digit",
            Event::Backspace => "backspace",
            Event::SetSlot { .. } => "set_slot",
            Event::Confirm => "confirm",
            Event::SetProvider { .. } => "set_provider",
            Event::SetMobileNumber { .. } => "set_mobile_number",
            Event::SetAmount { .. } => "set_amount",
            Event::Wait { .. } => "wait",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub flow: FlowKind,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Script {
    pub fn from_json(json: &str) -> FlowResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> FlowResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOutcome {
    pub index: usize,
    pub event: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub flow: FlowKind,
    pub outcomes: Vec<EventOutcome>,
    /// Snapshot of the flow after the last event
    pub state: serde_json::Value,
}

impl ReplayReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.ok).count()
    }
}

fn unsupported(flow: FlowKind, event: &Event) -> FlowError {
    FlowError::InvalidState(format!("{} is not a {flow:?} event", event.name()))
}

/// Replay a script against a fresh flow
pub async fn run_script(ctx: &FlowContext, script: Script) -> FlowResult<ReplayReport> {
    let mut outcomes = Vec::with_capacity(script.events.len());
    let state = match script.flow {
        FlowKind::Account => {
            let mut flow = ctx.account_flow().await;
            for (index, event) in script.events.iter().enumerate() {
                let result = match event {
                    Event::SetFirstName { value } => {
                        flow.set_first_name(value);
                        Ok(())
                    },
                    Event::SetMiddleName { value } => {
                        flow.set_middle_name(value);
                        Ok(())
                    },
                    Event::SetPhone { value } => {
                        flow.set_phone(value);
                        Ok(())
                    },
                    Event::SetEmail { value } => {
                        flow.set_email(value);
                        Ok(())
                    },
                    Event::SetPassword { value } => {
                        flow.set_password(value);
                        Ok(())
                    },
                    Event::SetConfirmPassword { value } => {
                        flow.set_confirm_password(value);
                        Ok(())
                    },
                    Event::SetTerms { accepted } => {
                        flow.set_terms_accepted(*accepted);
                        Ok(())
                    },
                    Event::Next => flow.next(),
                    Event::Back => {
                        flow.back();
                        Ok(())
                    },
                    Event::Submit => flow.submit(ctx.submitter.as_ref()).await,
                    Event::Wait { millis } => {
                        wait(*millis).await;
                        Ok(())
                    },
                    other => Err(unsupported(script.flow, other)),
                };
                outcomes.push(outcome(index, event, result));
            }
            serde_json::to_value(flow.snapshot())?
        },
        FlowKind::Login => {
            let mut flow = ctx.login_flow().await;
            for (index, event) in script.events.iter().enumerate() {
                let result = match event {
                    Event::SetIdentifier { value } => {
                        flow.set_identifier(value);
                        Ok(())
                    },
                    Event::SetPassword { value } => {
                        flow.set_password(value);
                        Ok(())
                    },
                    Event::SetRememberMe { remember } => {
                        flow.set_remember_me(*remember);
                        Ok(())
                    },
                    Event::Submit => flow.submit(ctx.submitter.as_ref()).await,
                    Event::Wait { millis } => {
                        wait(*millis).await;
                        Ok(())
                    },
                    other => Err(unsupported(script.flow, other)),
                };
                outcomes.push(outcome(index, event, result));
            }
            serde_json::to_value(flow.snapshot())?
        },
        FlowKind::Pin => {
            let mut flow = ctx.pin_flow(|_| debug!("pin completion callback")).await;

            for (index, event) in script.events.iter().enumerate() {
                let result = match event {
                    Event::Digit { digit } => ignored_unless(flow.press_digit(*digit), event),
                    Event::Backspace => ignored_unless(flow.backspace(), event),
                    Event::SetSlot { index: slot, value } => {
                        ignored_unless(flow.set_slot(*slot, value), event)
                    },
                    // Confirmation completes the flow and submits the PIN
                    Event::Confirm => match flow.confirm() {
                        Ok(PinStage::Confirmed) => flow.submit(ctx.submitter.as_ref()).await,
                        other => other.map(|_| ()),
                    },
                    Event::Wait { millis } => {
                        wait(*millis).await;
                        Ok(())
                    },
                    other => Err(unsupported(script.flow, other)),
                };
                outcomes.push(outcome(index, event, result));
            }
            serde_json::to_value(flow.snapshot())?
        },
        FlowKind::Withdrawal => {
            let mut form = ctx.withdrawal_form().await;
            for (index, event) in script.events.iter().enumerate() {
                let result = match event {
                    Event::SetProvider { provider } => {
                        form.set_provider(*provider);
                        Ok(())
                    },
                    Event::SetMobileNumber { value } => {
                        form.set_mobile_number(value);
                        Ok(())
                    },
                    Event::SetAmount { value } => {
                        form.set_amount(value);
                        Ok(())
                    },
                    Event::Submit => form.submit(ctx.submitter.as_ref()).await,
                    Event::Wait { millis } => {
                        wait(*millis).await;
                        Ok(())
                    },
                    other => Err(unsupported(script.flow, other)),
                };
                outcomes.push(outcome(index, event, result));
            }
            serde_json::to_value(form.snapshot())?
        },
    };

    Ok(ReplayReport {
        flow: script.flow,
        outcomes,
        state,
    })
}

async fn wait(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

fn ignored_unless(applied: bool, event: &Event) -> FlowResult<()> {
    if applied {
        Ok(())
    } else {
        Err(FlowError::InvalidState(format!("{} ignored", event.name())))
    }
}

fn outcome(index: usize, event: &Event, result: FlowResult<()>) -> EventOutcome {
    match result {
        Ok(()) => EventOutcome {
            index,
            event: event.name(),
            ok: true,
            code: None,
            message: None,
        },
        Err(e) => {
            debug!(index, event = event.name(), error = %e, "event rejected");
            EventOutcome {
                index,
                event: event.name(),
                ok: false,
                code: Some(e.error_code()),
                message: Some(e.to_string()),
            }
        },
    }
}
