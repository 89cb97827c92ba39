//! Plain countdown.
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed
//! ```
//!
//! `reset` is legal from every state and returns to `Idle`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{RunState, TimerMachine, TimerMode};
use crate::clock::{remaining_secs, resume_anchor};
use crate::events::{timestamp, Event, Snapshot};
use crate::settings::{CountdownSettings, CountdownSettingsPatch};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    settings: CountdownSettings,
    /// Settings submitted while running; applied on the next reset.
    #[serde(default)]
    pending: Option<CountdownSettings>,
    #[serde(default)]
    run: RunState,
    remaining_secs: u64,
}

impl Countdown {
    pub fn new(settings: CountdownSettings) -> Self {
        let settings = settings.clamped();
        Self {
            settings,
            pending: None,
            run: RunState::Idle,
            remaining_secs: settings.duration_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &CountdownSettings {
        &self.settings
    }

    pub fn pending_settings(&self) -> Option<&CountdownSettings> {
        self.pending.as_ref()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u64 {
        self.settings.duration_secs
    }

    /// Remaining time at `now_ms` without touching state.
    pub fn remaining_at(&self, now_ms: u64) -> u64 {
        match self.run {
            RunState::Running { anchor_ms } => {
                remaining_secs(self.settings.duration_secs, now_ms, anchor_ms)
            }
            _ => self.remaining_secs,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn update_settings(&mut self, patch: &CountdownSettingsPatch, now_ms: u64) -> Option<Event> {
        let deferred = self.run.is_running();
        if deferred {
            let base = self.pending.unwrap_or(self.settings);
            self.pending = Some(base.apply(patch));
        } else {
            self.settings = self.settings.apply(patch);
            match self.run {
                RunState::Idle => self.remaining_secs = self.settings.duration_secs,
                RunState::Paused { frozen } => {
                    let frozen = frozen.min(self.settings.duration_secs);
                    self.run = RunState::Paused { frozen };
                    self.remaining_secs = frozen;
                }
                _ => {}
            }
        }
        debug!(deferred, duration_secs = self.settings.duration_secs, "countdown settings updated");
        Some(Event::SettingsUpdated {
            mode: TimerMode::Countdown,
            deferred,
            at: timestamp(now_ms),
        })
    }

    fn restore_initial(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.settings = pending;
        }
        self.run = RunState::Idle;
        self.remaining_secs = self.settings.duration_secs;
    }
}

impl TimerMachine for Countdown {
    fn mode(&self) -> TimerMode {
        TimerMode::Countdown
    }

    fn run_state(&self) -> RunState {
        self.run
    }

    fn start(&mut self, now_ms: u64) -> Option<Event> {
        let anchor_ms = match self.run {
            RunState::Running { .. } => return None,
            RunState::Paused { frozen } => resume_anchor(now_ms, self.settings.duration_secs, frozen),
            RunState::Stopped => {
                self.restore_initial();
                now_ms
            }
            RunState::Idle => now_ms,
        };
        self.run = RunState::Running { anchor_ms };
        debug!(remaining_secs = self.remaining_secs, "countdown started");
        Some(Event::TimerStarted {
            mode: TimerMode::Countdown,
            value: self.remaining_secs,
            at: timestamp(now_ms),
        })
    }

    fn pause(&mut self, now_ms: u64) -> Option<Event> {
        if !self.run.is_running() {
            return None;
        }
        // A boundary that is already due is crossed before freezing.
        let crossed = match self.remaining_at(now_ms) {
            0 => self.tick(now_ms),
            _ => None,
        };
        if !self.run.is_running() {
            return crossed;
        }
        let remaining = self.remaining_at(now_ms);
        self.remaining_secs = remaining;
        self.run = RunState::Paused { frozen: remaining };
        debug!(remaining_secs = remaining, "countdown paused");
        crossed.or(Some(Event::TimerPaused {
            mode: TimerMode::Countdown,
            value: remaining,
            at: timestamp(now_ms),
        }))
    }

    fn reset(&mut self, now_ms: u64) -> Option<Event> {
        self.restore_initial();
        debug!("countdown reset");
        Some(Event::TimerReset {
            mode: TimerMode::Countdown,
            at: timestamp(now_ms),
        })
    }

    fn tick(&mut self, now_ms: u64) -> Option<Event> {
        if !self.run.is_running() {
            return None;
        }
        self.remaining_secs = self.remaining_at(now_ms);
        if self.remaining_secs > 0 {
            return None;
        }
        self.run = RunState::Stopped;
        info!(duration_secs = self.settings.duration_secs, "countdown completed");
        Some(Event::Completed {
            mode: TimerMode::Countdown,
            completed_count: None,
            at: timestamp(now_ms),
        })
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            TimerMode::Countdown,
            self.run.status(),
            self.remaining_secs,
            self.settings.duration_secs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerStatus;

    const T0: u64 = 1_700_000_000_000;

    fn five_seconds() -> Countdown {
        Countdown::new(CountdownSettings { duration_secs: 5 })
    }

    #[test]
    fn completes_exactly_once() {
        let mut c = five_seconds();
        c.start(T0);
        assert!(c.tick(T0 + 4_900).is_none());
        assert_eq!(c.remaining_secs(), 1);

        let ev = c.tick(T0 + 5_000);
        assert!(matches!(ev, Some(Event::Completed { .. })));
        assert_eq!(c.remaining_secs(), 0);
        assert!(!c.is_running());
        assert_eq!(c.run_state().status(), TimerStatus::Completed);

        assert!(c.tick(T0 + 5_100).is_none());
        assert!(c.tick(T0 + 9_000).is_none());
    }

    #[test]
    fn redundant_controls_are_noops() {
        let mut c = five_seconds();
        assert!(c.pause(T0).is_none());
        assert!(c.start(T0).is_some());
        assert!(c.start(T0 + 100).is_none());
        assert!(c.skip(T0 + 200).is_none());
    }

    #[test]
    fn resume_ignores_pause_length() {
        let mut c = Countdown::new(CountdownSettings { duration_secs: 60 });
        c.start(T0);
        c.pause(T0 + 10_000);
        assert_eq!(c.remaining_secs(), 50);

        c.start(T0 + 3_600_000);
        c.tick(T0 + 3_600_000);
        assert_eq!(c.remaining_secs(), 50);
        c.tick(T0 + 3_620_000);
        assert_eq!(c.remaining_secs(), 30);
    }

    #[test]
    fn reset_from_completed_restores_duration() {
        let mut c = five_seconds();
        c.start(T0);
        c.tick(T0 + 5_000);
        c.reset(T0 + 6_000);
        assert_eq!(c.remaining_secs(), 5);
        assert_eq!(c.run_state(), RunState::Idle);
    }

    #[test]
    fn start_after_completion_restarts() {
        let mut c = five_seconds();
        c.start(T0);
        c.tick(T0 + 5_000);
        c.start(T0 + 10_000);
        c.tick(T0 + 12_000);
        assert_eq!(c.remaining_secs(), 3);
    }

    #[test]
    fn settings_change_while_running_is_deferred() {
        let mut c = five_seconds();
        c.start(T0);
        let ev = c.update_settings(&CountdownSettingsPatch { duration_secs: Some(90) }, T0 + 1_000);
        assert!(matches!(ev, Some(Event::SettingsUpdated { deferred: true, .. })));
        c.tick(T0 + 2_000);
        assert_eq!(c.remaining_secs(), 3);
        assert_eq!(c.duration_secs(), 5);

        c.reset(T0 + 2_500);
        assert_eq!(c.duration_secs(), 90);
        assert_eq!(c.remaining_secs(), 90);
    }

    #[test]
    fn settings_change_while_idle_applies_and_clamps() {
        let mut c = five_seconds();
        c.update_settings(&CountdownSettingsPatch { duration_secs: Some(0) }, T0);
        assert_eq!(c.remaining_secs(), 1);
    }

    #[test]
    fn settings_change_while_paused_clamps_frozen_value() {
        let mut c = Countdown::new(CountdownSettings { duration_secs: 60 });
        c.start(T0);
        c.pause(T0 + 5_000);
        c.update_settings(&CountdownSettingsPatch { duration_secs: Some(30) }, T0 + 6_000);
        assert_eq!(c.remaining_secs(), 30);
        c.start(T0 + 7_000);
        c.tick(T0 + 8_000);
        assert_eq!(c.remaining_secs(), 29);
    }

    #[test]
    fn pause_after_due_boundary_completes_instead() {
        let mut c = five_seconds();
        c.start(T0);
        let ev = c.pause(T0 + 5_050);
        assert!(matches!(ev, Some(Event::Completed { .. })));
        assert!(ev.is_some_and(|e| e.is_completion()));
        assert_eq!(c.run_state(), RunState::Stopped);
        assert_eq!(c.remaining_secs(), 0);
        assert!(c.tick(T0 + 6_000).is_none());
    }
}
