//! Alternating A/B interval timer.
//!
//! Each round runs `A` then `B`. Finishing `B` of the last round stops the
//! machine and completes the cycle; later ticks and skips change nothing
//! until `reset` or `start`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::{RunState, TimerMachine, TimerMode};
use crate::clock::{carry_anchor, remaining_secs, resume_anchor};
use crate::events::{timestamp, Event, Snapshot};
use crate::settings::{IntervalSettings, IntervalSettingsPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalLabel {
    A,
    B,
}

impl fmt::Display for IntervalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalLabel::A => write!(f, "A"),
            IntervalLabel::B => write!(f, "B"),
        }
    }
}

impl IntervalSettings {
    pub fn label_secs(&self, label: IntervalLabel) -> u64 {
        match label {
            IntervalLabel::A => self.interval_a_secs,
            IntervalLabel::B => self.interval_b_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalTimer {
    settings: IntervalSettings,
    #[serde(default)]
    pending: Option<IntervalSettings>,
    label: IntervalLabel,
    round: u32,
    #[serde(default)]
    run: RunState,
    remaining_secs: u64,
}

impl IntervalTimer {
    pub fn new(settings: IntervalSettings) -> Self {
        let settings = settings.clamped();
        Self {
            settings,
            pending: None,
            label: IntervalLabel::A,
            round: 1,
            run: RunState::Idle,
            remaining_secs: settings.interval_a_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &IntervalSettings {
        &self.settings
    }

    pub fn pending_settings(&self) -> Option<&IntervalSettings> {
        self.pending.as_ref()
    }

    pub fn label(&self) -> IntervalLabel {
        self.label
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn total_rounds(&self) -> u32 {
        self.settings.rounds
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_complete(&self) -> bool {
        self.run == RunState::Stopped
    }

    pub fn segment_secs(&self) -> u64 {
        self.settings.label_secs(self.label)
    }

    pub fn remaining_at(&self, now_ms: u64) -> u64 {
        match self.run {
            RunState::Running { anchor_ms } => remaining_secs(self.segment_secs(), now_ms, anchor_ms),
            _ => self.remaining_secs,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn update_settings(&mut self, patch: &IntervalSettingsPatch, now_ms: u64) -> Option<Event> {
        let deferred = self.run.is_running();
        if deferred {
            let base = self.pending.unwrap_or(self.settings);
            self.pending = Some(base.apply(patch));
        } else {
            self.settings = self.settings.apply(patch);
            self.round = self.round.min(self.settings.rounds);
            match self.run {
                RunState::Idle => self.remaining_secs = self.segment_secs(),
                RunState::Paused { frozen } => {
                    let frozen = frozen.min(self.segment_secs());
                    self.run = RunState::Paused { frozen };
                    self.remaining_secs = frozen;
                }
                _ => {}
            }
        }
        debug!(deferred, settings = ?self.settings, "interval settings updated");
        Some(Event::SettingsUpdated {
            mode: TimerMode::Interval,
            deferred,
            at: timestamp(now_ms),
        })
    }

    fn restore_initial(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.settings = pending;
        }
        self.label = IntervalLabel::A;
        self.round = 1;
        self.run = RunState::Idle;
        self.remaining_secs = self.settings.interval_a_secs;
    }

    fn advance(&mut self, now_ms: u64, skipped: bool) -> Event {
        let finished_secs = self.segment_secs();
        let previous_anchor = self.run.anchor();

        if self.label == IntervalLabel::B && self.round >= self.settings.rounds {
            self.run = RunState::Stopped;
            self.remaining_secs = 0;
            if let Some(pending) = self.pending.take() {
                self.settings = pending;
            }
            info!(rounds = self.round, skipped, "interval cycle completed");
            return Event::CycleCompleted {
                mode: TimerMode::Interval,
                rounds: self.round,
                at: timestamp(now_ms),
            };
        }

        if let Some(pending) = self.pending.take() {
            self.settings = pending;
        }
        match self.label {
            IntervalLabel::A => self.label = IntervalLabel::B,
            IntervalLabel::B => {
                self.round += 1;
                self.label = IntervalLabel::A;
            }
        }
        self.remaining_secs = self.segment_secs();
        self.run = match previous_anchor {
            Some(anchor_ms) if !skipped => RunState::Running {
                anchor_ms: carry_anchor(anchor_ms, finished_secs, now_ms, self.remaining_secs),
            },
            Some(_) => RunState::Running { anchor_ms: now_ms },
            None => RunState::Idle,
        };
        debug!(label = %self.label, round = self.round, skipped, "interval advanced");
        Event::IntervalAdvanced {
            label: self.label,
            round: self.round,
            at: timestamp(now_ms),
        }
    }
}

impl TimerMachine for IntervalTimer {
    fn mode(&self) -> TimerMode {
        TimerMode::Interval
    }

    fn run_state(&self) -> RunState {
        self.run
    }

    fn start(&mut self, now_ms: u64) -> Option<Event> {
        let anchor_ms = match self.run {
            RunState::Running { .. } => return None,
            RunState::Paused { frozen } => resume_anchor(now_ms, self.segment_secs(), frozen),
            RunState::Stopped => {
                self.restore_initial();
                now_ms
            }
            RunState::Idle => now_ms,
        };
        self.run = RunState::Running { anchor_ms };
        debug!(label = %self.label, round = self.round, "interval started");
        Some(Event::TimerStarted {
            mode: TimerMode::Interval,
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
        debug!(label = %self.label, round = self.round, remaining_secs = remaining, "interval paused");
        crossed.or(Some(Event::TimerPaused {
            mode: TimerMode::Interval,
            value: remaining,
            at: timestamp(now_ms),
        }))
    }

    fn reset(&mut self, now_ms: u64) -> Option<Event> {
        self.restore_initial();
        debug!("interval reset");
        Some(Event::TimerReset {
            mode: TimerMode::Interval,
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
        Some(self.advance(now_ms, false))
    }

    fn skip(&mut self, now_ms: u64) -> Option<Event> {
        if self.is_complete() {
            return None;
        }
        Some(self.advance(now_ms, true))
    }

    fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new(
            TimerMode::Interval,
            self.run.status(),
            self.remaining_secs,
            self.segment_secs(),
        );
        snap.label = Some(self.label);
        snap.round = Some(self.round);
        snap.total_rounds = Some(self.settings.rounds);
        snap
    }
}
