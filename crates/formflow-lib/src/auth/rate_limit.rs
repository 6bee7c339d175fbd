// ============================
// crates/formflow-lib/src/auth/rate_limit.rs
// ============================
//! Rate limiting for form submissions.
//!
//! This is a fixed-window counter keyed on the time of the *last* allowed
//! attempt, so a burst that straddles a window boundary can get through more
//! than `max_attempts` submissions in a rolling minute.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default number of submissions allowed per window
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default window length
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Counter state of one limiter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitState {
    /// Attempts counted in the current window
    pub attempt_count: u32,
    /// Time of the last allowed attempt
    pub last_attempt: Option<Instant>,
    /// Whether submissions are currently refused
    pub is_blocked: bool,
    /// When the block lapses
    pub blocked_until: Option<Instant>,
}

/// Result of asking the limiter for permission to submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RateLimitDecision {
    Allowed { attempt_count: u32 },
    Denied { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Rate limiter for submission attempts, owned by a single form session
#[derive(Debug, Clone)]
pub struct SubmitRateLimiter {
    /// Maximum number of attempts per window
    max_attempts: u32,
    /// Window length
    window: Duration,
    state: RateLimitState,
}

impl Default for SubmitRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW)
    }
}

impl SubmitRateLimiter {
    /// Create a new submission rate limiter
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            state: RateLimitState::default(),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn state(&self) -> &RateLimitState {
        &self.state
    }

    pub fn attempt_count(&self) -> u32 {
        self.state.attempt_count
    }

    /// Record a submission attempt happening now
    pub fn attempt(&mut self) -> RateLimitDecision {
        self.attempt_at(Instant::now())
    }

    /// Record a submission attempt happening at `now`
    pub fn attempt_at(&mut self, now: Instant) -> RateLimitDecision {
        self.expire_block(now);

        // No previous attempt behaves like a window that has long elapsed.
        let elapsed = self
            .state
            .last_attempt
            .map(|last| now.saturating_duration_since(last));

        if let Some(elapsed) = elapsed {
            if self.state.attempt_count >= self.max_attempts && elapsed < self.window {
                let retry_after = self.window - elapsed;
                self.state.is_blocked = true;
                self.state.blocked_until = Some(now + retry_after);
                warn!(
                    attempts = self.state.attempt_count,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "submission rate limited"
                );
                return RateLimitDecision::Denied { retry_after };
            }
        }

        match elapsed {
            Some(elapsed) if elapsed <= self.window => self.state.attempt_count += 1,
            _ => self.state.attempt_count = 1,
        }
        self.state.last_attempt = Some(now);

        debug!(attempts = self.state.attempt_count, "submission attempt counted");
        RateLimitDecision::Allowed {
            attempt_count: self.state.attempt_count,
        }
    }

    /// Whether submissions are refused right now
    pub fn is_blocked(&self) -> bool {
        self.is_blocked_at(Instant::now())
    }

    /// Whether submissions are refused at `now`
    pub fn is_blocked_at(&self, now: Instant) -> bool {
        self.state.is_blocked && self.state.blocked_until.map_or(true, |until| now < until)
    }

    /// Lift the block; the attempt counter is left alone.
    pub fn clear_block(&mut self) {
        self.state.is_blocked = false;
        self.state.blocked_until = None;
    }

    fn expire_block(&mut self, now: Instant) {
        if self.state.is_blocked && !self.is_blocked_at(now) {
            self.clear_block();
        }
    }
}

/// One-shot task that lifts a limiter's block once the window has passed
///
/// Scheduling again aborts the previous task, and dropping the timer aborts the
/// pending task, so no unblock fires after the owning session is gone.
#[derive(Debug, Default)]
pub struct UnblockTimer {
    handle: Option<JoinHandle<()>>,
}

impl UnblockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `limiter.clear_block()` after `delay`
    ///
    /// Outside a tokio runtime nothing is spawned; the block then lapses lazily
    /// the next time the limiter is consulted.
    pub fn schedule(&mut self, limiter: Arc<Mutex<SubmitRateLimiter>>, delay: Duration) {
        self.cancel();

        let Ok(runtime) = Handle::try_current() else {
            debug!("no async runtime, block will lapse on next check");
            return;
        };

        self.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            limiter.lock().clear_block();
            debug!("submission block lifted");
        }));
    }

    /// Abort the pending unblock, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether an unblock is scheduled and has not run yet
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for UnblockTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
