// ============================
// crates/formflow-lib/src/flows/pin.rs
// ============================
//! Two-stage 4-digit PIN setup.
//!
//! The PIN is typed once in the create stage and again in the confirm stage.
//! A mismatch clears only the confirmation; the first entry is kept.

use std::fmt;

use ::metrics::counter;
use formflow_common::Submission;
use serde::Serialize;
use tracing::{debug, info};

use super::SubmitGate;
use crate::auth::{SubmissionService, TokenProvider};
use crate::config::Settings;
use crate::error::{FlowError, FlowResult};
use crate::metrics as keys;

/// Number of digits in a PIN
pub const PIN_LENGTH: usize = 4;

/// Shown when the collaborator rejects the confirmed PIN
pub const PIN_SETUP_FAILED_MESSAGE: &str = "We couldn't save your PIN. Please try again later.";

/// Fixed-length sequence of digit-or-empty slots
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct PinBuffer {
    slots: [Option<u8>; PIN_LENGTH],
}

impl PinBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the first empty slot; returns false when full or not a digit
    pub fn push_digit(&mut self, digit: u8) -> bool {
        if digit > 9 {
            return false;
        }
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(digit);
                true
            },
            None => false,
        }
    }

    /// Clear the last filled slot; returns false when already empty
    pub fn pop_digit(&mut self) -> bool {
        match self.slots.iter_mut().rev().find(|slot| slot.is_some()) {
            Some(slot) => {
                *slot = None;
                true
            },
            None => false,
        }
    }

    /// Replace one slot with a single digit or clear it with an empty string
    ///
    /// Anything else (several characters, non-digits, out-of-range index) is
    /// ignored and `false` is returned.
    pub fn set_slot(&mut self, index: usize, value: &str) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };

        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (None, _) => {
                *slot = None;
                true
            },
            (Some(c), None) => match c.to_digit(10) {
                Some(d) => {
                    *slot = Some(d as u8);
                    true
                },
                None => false,
            },
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots = [None; PIN_LENGTH];
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn slots(&self) -> &[Option<u8>; PIN_LENGTH] {
        &self.slots
    }

    /// The PIN as a 4-digit string, once every slot is filled
    pub fn value(&self) -> Option<String> {
        self.slots
            .iter()
            .map(|slot| slot.map(|d| char::from(b'0' + d)))
            .collect()
    }
}

// Masked: the buffer content is a secret.
impl fmt::Debug for PinBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked: String = self
            .slots
            .iter()
            .map(|slot| if slot.is_some() { '*' } else { '_' })
            .collect();
        write!(f, "PinBuffer({masked})")
    }
}

/// Stage of the PIN flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinStage {
    Create,
    Confirm,
    /// Terminal; the completion callback has run
    Confirmed,
}

/// Keypad input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinInput {
    Digit(u8),
    Backspace,
}

/// Serializable view of the PIN flow; digits are reported as counts only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinSnapshot {
    pub stage: PinStage,
    pub create_filled: usize,
    pub confirm_filled: usize,
    pub error: Option<String>,
    pub submitted: bool,
}

type OnConfirmed = Box<dyn FnOnce(String) + Send>;

/// PIN create/confirm state machine
pub struct PinFlow {
    stage: PinStage,
    create: PinBuffer,
    confirm: PinBuffer,
    error: Option<String>,
    on_confirmed: Option<OnConfirmed>,
    confirmed_pin: Option<String>,
    gate: SubmitGate,
    submitted: bool,
}

impl fmt::Debug for PinFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinFlow")
            .field("stage", &self.stage)
            .field("create", &self.create)
            .field("confirm", &self.confirm)
            .field("error", &self.error)
            .field("submitted", &self.submitted)
            .finish_non_exhaustive()
    }
}

impl PinFlow {
    /// `on_confirmed` runs exactly once, with the PIN, after both entries match
    pub fn new(settings: &Settings, on_confirmed: impl FnOnce(String) + Send + 'static) -> Self {
        Self {
            stage: PinStage::Create,
            create: PinBuffer::new(),
            confirm: PinBuffer::new(),
            error: None,
            on_confirmed: Some(Box::new(on_confirmed)),
            confirmed_pin: None,
            gate: SubmitGate::new("pin", &settings.rate_limit),
            submitted: false,
        }
    }

    pub async fn init_token(&mut self, provider: &dyn TokenProvider) {
        if let Err(e) = self.gate.init_token(provider).await {
            self.error = Some(e.user_message());
        }
    }

    pub fn session_token(&self) -> Option<&str> {
        self.gate.token()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn stage(&self) -> PinStage {
        self.stage
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn create_buffer(&self) -> &PinBuffer {
        &self.create
    }

    pub fn confirm_buffer(&self) -> &PinBuffer {
        &self.confirm
    }

    pub fn confirmed_pin(&self) -> Option<&str> {
        self.confirmed_pin.as_deref()
    }

    fn active_buffer(&mut self) -> Option<&mut PinBuffer> {
        match self.stage {
            PinStage::Create => Some(&mut self.create),
            PinStage::Confirm => Some(&mut self.confirm),
            PinStage::Confirmed => None,
        }
    }

    /// Apply one keypad press to the active buffer
    pub fn press(&mut self, input: PinInput) -> bool {
        let Some(buffer) = self.active_buffer() else {
            return false;
        };
        match input {
            PinInput::Digit(d) => buffer.push_digit(d),
            PinInput::Backspace => buffer.pop_digit(),
        }
    }

    pub fn press_digit(&mut self, digit: u8) -> bool {
        self.press(PinInput::Digit(digit))
    }

    pub fn backspace(&mut self) -> bool {
        self.press(PinInput::Backspace)
    }

    /// Direct edit of one slot of the active buffer
    pub fn set_slot(&mut self, index: usize, value: &str) -> bool {
        self.active_buffer()
            .is_some_and(|buffer| buffer.set_slot(index, value))
    }

    /// The "next"/"confirm" button
    pub fn confirm(&mut self) -> FlowResult<PinStage> {
        match self.stage {
            PinStage::Create => {
                if !self.create.is_complete() {
                    return self.fail(FlowError::IncompletePin);
                }
                debug!("pin entered, awaiting confirmation");
                self.stage = PinStage::Confirm;
                self.error = None;
                Ok(self.stage)
            },
            PinStage::Confirm => {
                let Some(entered) = self.confirm.value() else {
                    return self.fail(FlowError::IncompletePin);
                };
                if self.create.value().as_deref() != Some(entered.as_str()) {
                    counter!(keys::PIN_MISMATCH).increment(1);
                    self.confirm.clear();
                    return self.fail(FlowError::PinMismatch);
                }

                info!("pin confirmed");
                counter!(keys::PIN_CONFIRMED).increment(1);
                self.stage = PinStage::Confirmed;
                self.error = None;
                self.confirmed_pin = Some(entered.clone());
                if let Some(callback) = self.on_confirmed.take() {
                    callback(entered);
                }
                Ok(self.stage)
            },
            PinStage::Confirmed => Err(FlowError::InvalidState(
                "pin already confirmed".to_string(),
            )),
        }
    }

    fn fail(&mut self, err: FlowError) -> FlowResult<PinStage> {
        self.error = Some(err.user_message());
        Err(err)
    }

    /// Payload for the submission collaborator, once confirmed
    pub fn submission(&self) -> Option<Submission> {
        self.confirmed_pin.as_ref().map(|pin| Submission::ConfirmPin {
            pin: pin.clone(),
            session_token: self.gate.session_token(),
        })
    }

    /// Hand the confirmed PIN to the collaborator, once
    pub async fn submit(&mut self, service: &dyn SubmissionService) -> FlowResult<()> {
        if self.submitted {
            return Err(FlowError::InvalidState("pin already submitted".to_string()));
        }
        let Some(submission) = self.submission() else {
            return Err(FlowError::InvalidState("pin not confirmed".to_string()));
        };

        match self.gate.submit(service, submission).await {
            Ok(()) => {
                self.error = None;
                self.submitted = true;
                Ok(())
            },
            Err(e) => {
                self.error = Some(PIN_SETUP_FAILED_MESSAGE.to_string());
                Err(e)
            },
        }
    }

    pub fn snapshot(&self) -> PinSnapshot {
        PinSnapshot {
            stage: self.stage,
            create_filled: self.create.filled(),
            confirm_filled: self.confirm.filled(),
            error: self.error.clone(),
            submitted: self.submitted,
        }
    }
}
