// ==============================
// tests/unit/rate_limit_tests.rs
// ==============================
//! Submission rate limiter and its unblock timer
use std::sync::Arc;
use std::time::Duration;

use formflow_lib::auth::{RateLimitDecision, SubmitRateLimiter, UnblockTimer};
use formflow_lib::config::RateLimitSettings;
use formflow_lib::flows::SubmitGate;
use formflow_lib::FlowError;
use tokio::time::Instant;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[test]
fn test_sixth_attempt_in_window_is_denied() {
    let mut limiter = SubmitRateLimiter::default();
    let start = Instant::now();

    // Five calls within ten seconds
    for (i, t) in [0, 2, 4, 6, 8].into_iter().enumerate() {
        let decision = limiter.attempt_at(start + secs(t));
        assert_eq!(
            decision,
            RateLimitDecision::Allowed {
                attempt_count: i as u32 + 1
            }
        );
    }

    let decision = limiter.attempt_at(start + secs(30));
    assert_eq!(
        decision,
        RateLimitDecision::Denied {
            retry_after: secs(38)
        }
    );
    assert!(limiter.is_blocked_at(start + secs(30)));
    // A denial does not move the window
    assert_eq!(limiter.state().last_attempt, Some(start + secs(8)));
}

#[test]
fn test_attempt_after_window_resets_counter() {
    let mut limiter = SubmitRateLimiter::default();
    let start = Instant::now();
    for _ in 0..5 {
        assert!(limiter.attempt_at(start).is_allowed());
    }
    assert!(!limiter.attempt_at(start + secs(10)).is_allowed());

    let decision = limiter.attempt_at(start + secs(61));
    assert_eq!(decision, RateLimitDecision::Allowed { attempt_count: 1 });
    assert!(!limiter.is_blocked_at(start + secs(61)));
}

#[test]
fn test_exact_window_boundary_still_counts() {
    let mut limiter = SubmitRateLimiter::new(3, secs(60));
    let start = Instant::now();
    limiter.attempt_at(start);
    // Exactly one window later: neither denied nor reset
    assert_eq!(
        limiter.attempt_at(start + secs(60)),
        RateLimitDecision::Allowed { attempt_count: 2 }
    );
}

#[test]
fn test_block_lapses_without_runtime() {
    let mut limiter = SubmitRateLimiter::new(1, secs(10));
    let start = Instant::now();
    limiter.attempt_at(start);
    assert!(!limiter.attempt_at(start + secs(4)).is_allowed());
    assert!(limiter.is_blocked_at(start + secs(9)));
    assert!(!limiter.is_blocked_at(start + secs(10)));
}

#[test]
fn test_limiters_are_independent() {
    let mut a = SubmitRateLimiter::new(1, secs(60));
    let mut b = SubmitRateLimiter::new(1, secs(60));
    let now = Instant::now();
    a.attempt_at(now);
    assert!(!a.attempt_at(now).is_allowed());
    assert!(b.attempt_at(now).is_allowed());
}

#[test]
fn test_timer_outside_runtime_is_noop() {
    let limiter = Arc::new(parking_lot::Mutex::new(SubmitRateLimiter::default()));
    let mut timer = UnblockTimer::new();
    timer.schedule(limiter, secs(1));
    assert!(!timer.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_timer_lifts_block() {
    let limiter = Arc::new(parking_lot::Mutex::new(SubmitRateLimiter::new(1, secs(60))));
    {
        let mut guard = limiter.lock();
        guard.attempt();
        assert!(!guard.attempt().is_allowed());
    }

    let mut timer = UnblockTimer::new();
    timer.schedule(limiter.clone(), secs(60));
    assert!(timer.is_pending());

    tokio::time::sleep(secs(61)).await;
    assert!(!limiter.lock().state().is_blocked);
    assert!(!timer.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_timer_never_fires() {
    let limiter = Arc::new(parking_lot::Mutex::new(SubmitRateLimiter::new(1, secs(60))));
    {
        let mut guard = limiter.lock();
        guard.attempt();
        guard.attempt();
        assert!(guard.state().is_blocked);
    }

    let mut timer = UnblockTimer::new();
    timer.schedule(limiter.clone(), secs(5));
    drop(timer);

    tokio::time::sleep(secs(6)).await;
    // The flag is still set; only the lazy expiry at the window end applies
    assert!(limiter.lock().state().is_blocked);
}

#[tokio::test(start_paused = true)]
async fn test_gate_denial_reports_retry_after() {
    let settings = RateLimitSettings {
        max_attempts: 2,
        window_secs: 30,
    };
    let mut gate = SubmitGate::new("test", &settings);
    gate.check().unwrap();
    tokio::time::advance(secs(10)).await;
    gate.check().unwrap();
    tokio::time::advance(secs(5)).await;

    match gate.check() {
        Err(FlowError::RateLimited { retry_after }) => assert_eq!(retry_after, secs(25)),
        other => panic!("expected rate limit, got {other:?}"),
    }
    assert!(gate.is_blocked());
}
