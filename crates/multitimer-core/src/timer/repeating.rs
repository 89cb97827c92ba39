//! A single duration repeated a finite number of times, or forever.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{RunState, TimerMachine, TimerMode};
use crate::clock::{carry_anchor, remaining_secs, resume_anchor};
use crate::events::{timestamp, Event, Snapshot};
use crate::settings::{RepeatingSettings, RepeatingSettingsPatch};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeatingTimer {
    settings: RepeatingSettings,
    #[serde(default)]
    pending: Option<RepeatingSettings>,
    completed_count: u32,
    #[serde(default)]
    run: RunState,
    remaining_secs: u64,
}

impl RepeatingTimer {
    pub fn new(settings: RepeatingSettings) -> Self {
        let settings = settings.clamped();
        Self {
            settings,
            pending: None,
            completed_count: 0,
            run: RunState::Idle,
            remaining_secs: settings.duration_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &RepeatingSettings {
        &self.settings
    }

    pub fn pending_settings(&self) -> Option<&RepeatingSettings> {
        self.pending.as_ref()
    }

    pub fn completed_count(&self) -> u32 {
        self.completed_count
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn remaining_at(&self, now_ms: u64) -> u64 {
        match self.run {
            RunState::Running { anchor_ms } => {
                remaining_secs(self.settings.duration_secs, now_ms, anchor_ms)
            }
            _ => self.remaining_secs,
        }
    }

    fn target_reached(&self) -> bool {
        self.settings
            .target()
            .is_some_and(|target| self.completed_count >= target)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn update_settings(&mut self, patch: &RepeatingSettingsPatch, now_ms: u64) -> Option<Event> {
        let deferred = self.run.is_running();
        if deferred {
            let base = self.pending.unwrap_or(self.settings);
            self.pending = Some(base.apply(patch));
        } else {
            self.settings = self.settings.apply(patch);
            match self.run {
                RunState::Idle => self.remaining_secs = self.settings.duration_secs,
                RunState::Paused { .. } if self.target_reached() => {
                    self.run = RunState::Stopped;
                    self.remaining_secs = 0;
                }
                RunState::Paused { frozen } => {
                    let frozen = frozen.min(self.settings.duration_secs);
                    self.run = RunState::Paused { frozen };
                    self.remaining_secs = frozen;
                }
                _ => {}
            }
        }
        debug!(deferred, settings = ?self.settings, "repeating settings updated");
        Some(Event::SettingsUpdated {
            mode: TimerMode::Repeating,
            deferred,
            at: timestamp(now_ms),
        })
    }

    fn restore_initial(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.settings = pending;
        }
        self.completed_count = 0;
        self.run = RunState::Idle;
        self.remaining_secs = self.settings.duration_secs;
    }
}

impl TimerMachine for RepeatingTimer {
    fn mode(&self) -> TimerMode {
        TimerMode::Repeating
    }

    fn run_state(&self) -> RunState {
        self.run
    }

    fn start(&mut self, now_ms: u64) -> Option<Event> {
        let anchor_ms = match self.run {
            RunState::Running { .. } => return None,
            RunState::Paused { frozen } => {
                resume_anchor(now_ms, self.settings.duration_secs, frozen)
            }
            RunState::Stopped => {
                self.restore_initial();
                now_ms
            }
            RunState::Idle => now_ms,
        };
        self.run = RunState::Running { anchor_ms };
        debug!(completed_count = self.completed_count, "repeating timer started");
        Some(Event::TimerStarted {
            mode: TimerMode::Repeating,
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
        debug!(remaining_secs = remaining, "repeating timer paused");
        crossed.or(Some(Event::TimerPaused {
            mode: TimerMode::Repeating,
            value: remaining,
            at: timestamp(now_ms),
        }))
    }

    fn reset(&mut self, now_ms: u64) -> Option<Event> {
        self.restore_initial();
        debug!("repeating timer reset");
        Some(Event::TimerReset {
            mode: TimerMode::Repeating,
            at: timestamp(now_ms),
        })
    }

    fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let anchor_ms = self.run.anchor()?;
        self.remaining_secs = self.remaining_at(now_ms);
        if self.remaining_secs > 0 {
            return None;
        }

        let finished_secs = self.settings.duration_secs;
        self.completed_count = self.completed_count.saturating_add(1);
        if let Some(pending) = self.pending.take() {
            self.settings = pending;
        }

        if self.target_reached() {
            self.run = RunState::Stopped;
            info!(completed_count = self.completed_count, "repeating timer completed");
            return Some(Event::Completed {
                mode: TimerMode::Repeating,
                completed_count: Some(self.completed_count),
                at: timestamp(now_ms),
            });
        }

        self.remaining_secs = self.settings.duration_secs;
        self.run = RunState::Running {
            anchor_ms: carry_anchor(anchor_ms, finished_secs, now_ms, self.remaining_secs),
        };
        info!(completed_count = self.completed_count, "repetition completed");
        Some(Event::RepeatCompleted {
            completed_count: self.completed_count,
            at: timestamp(now_ms),
        })
    }

    fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new(
            TimerMode::Repeating,
            self.run.status(),
            self.remaining_secs,
            self.settings.duration_secs,
        );
        snap.completed_count = Some(self.completed_count);
        snap.target_count = self.settings.target();
        snap
    }
}
