//! Wall-clock reads and the anchor arithmetic shared by every machine.
//!
//! Machines never count ticks. They keep an anchor timestamp chosen so that
//! `now - anchor` is the progress of the current run, and recompute the
//! displayed value from it on every tick. All functions here are pure and
//! saturate instead of underflowing when the clock steps backwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const MS_PER_SEC: u64 = 1000;

/// Source of "now", in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// The host wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to a [`crate::TimerSession`].
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Whole seconds elapsed since `anchor_ms`.
pub fn elapsed_secs(now_ms: u64, anchor_ms: u64) -> u64 {
    now_ms.saturating_sub(anchor_ms) / MS_PER_SEC
}

/// Milliseconds elapsed since `anchor_ms`.
pub fn elapsed_ms(now_ms: u64, anchor_ms: u64) -> u64 {
    now_ms.saturating_sub(anchor_ms)
}

/// `max(0, duration - elapsed)` for a run anchored at `anchor_ms`.
pub fn remaining_secs(duration_secs: u64, now_ms: u64, anchor_ms: u64) -> u64 {
    duration_secs.saturating_sub(elapsed_secs(now_ms, anchor_ms))
}

/// Anchor for resuming a countdown frozen at `remaining_secs`.
///
/// The anchor lands in the past by exactly the time already consumed, so the
/// next recomputation yields `remaining_secs` again regardless of how long
/// the pause lasted.
pub fn resume_anchor(now_ms: u64, duration_secs: u64, remaining_secs: u64) -> u64 {
    let consumed_ms = duration_secs
        .saturating_sub(remaining_secs)
        .saturating_mul(MS_PER_SEC);
    now_ms.saturating_sub(consumed_ms)
}

/// Anchor for resuming a count-up run frozen at `elapsed_ms`.
pub fn resume_anchor_ms(now_ms: u64, elapsed_ms: u64) -> u64 {
    now_ms.saturating_sub(elapsed_ms)
}

/// Anchor for the segment that follows a natural boundary crossing.
///
/// The next segment starts at the instant the previous one ended, not at the
/// (possibly late) tick that noticed it. When the next segment would already
/// be over by `now`, it is anchored at `now` so one tick never chains several
/// completions.
pub fn carry_anchor(anchor_ms: u64, duration_secs: u64, now_ms: u64, next_duration_secs: u64) -> u64 {
    let boundary = anchor_ms.saturating_add(duration_secs.saturating_mul(MS_PER_SEC));
    let overshoot = now_ms.saturating_sub(boundary);
    if overshoot < next_duration_secs.saturating_mul(MS_PER_SEC) {
        boundary.min(now_ms)
    } else {
        now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_floors_to_whole_seconds() {
        assert_eq!(elapsed_secs(10_999, 10_000), 0);
        assert_eq!(elapsed_secs(11_000, 10_000), 1);
        assert_eq!(elapsed_secs(9_000, 10_000), 0);
    }

    #[test]
    fn remaining_never_goes_negative() {
        assert_eq!(remaining_secs(5, 1_000 + 5_000, 1_000), 0);
        assert_eq!(remaining_secs(5, 1_000 + 60_000, 1_000), 0);
        assert_eq!(remaining_secs(5, 1_000 + 2_500, 1_000), 3);
    }

    #[test]
    fn resume_anchor_reproduces_frozen_value() {
        let now = 500_000;
        let anchor = resume_anchor(now, 60, 42);
        assert_eq!(remaining_secs(60, now, anchor), 42);
        assert_eq!(remaining_secs(60, now + 2_000, anchor), 40);
    }

    #[test]
    fn carry_anchor_uses_boundary_instant() {
        // 3s segment anchored at 1_000, noticed 80ms late.
        assert_eq!(carry_anchor(1_000, 3, 4_080, 2), 4_000);
    }

    #[test]
    fn carry_anchor_falls_back_to_now_when_next_segment_already_over() {
        assert_eq!(carry_anchor(1_000, 3, 60_000, 2), 60_000);
    }

    #[test]
    fn manual_clock_handles_share_time() {
        let clock = ManualClock::new(1_000);
        let handle = clock.clone();
        handle.advance(250);
        assert_eq!(clock.now_ms(), 1_250);
        clock.set(42);
        assert_eq!(handle.now_ms(), 42);
    }
}
