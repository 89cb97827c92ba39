//! Pomodoro work/break cycle.
//!
//! Segments run `work -> (short_break | long_break) -> work -> ...`. Every
//! `long_break_interval`-th completed work segment is followed by a long
//! break. `skip` applies the same rule as a natural completion.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::{RunState, TimerMachine, TimerMode};
use crate::clock::{carry_anchor, remaining_secs, resume_anchor};
use crate::events::{timestamp, Event, Snapshot};
use crate::settings::{PomodoroSettings, PomodoroSettingsPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Work,
    ShortBreak,
    LongBreak,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Segment::Work => "Work",
            Segment::ShortBreak => "Short Break",
            Segment::LongBreak => "Long Break",
        };
        write!(f, "{label}")
    }
}

impl Segment {
    pub fn is_break(&self) -> bool {
        !matches!(self, Segment::Work)
    }
}

impl PomodoroSettings {
    pub fn segment_secs(&self, segment: Segment) -> u64 {
        let minutes = match segment {
            Segment::Work => self.work_min,
            Segment::ShortBreak => self.short_break_min,
            Segment::LongBreak => self.long_break_min,
        };
        minutes.saturating_mul(60)
    }

    /// Segment that follows `segment` once `completed_work_count` work
    /// segments (including any just finished) are done.
    pub fn next_segment(&self, segment: Segment, completed_work_count: u32) -> Segment {
        match segment {
            Segment::Work if completed_work_count % self.long_break_interval.max(1) == 0 => {
                Segment::LongBreak
            }
            Segment::Work => Segment::ShortBreak,
            Segment::ShortBreak | Segment::LongBreak => Segment::Work,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pomodoro {
    settings: PomodoroSettings,
    #[serde(default)]
    pending: Option<PomodoroSettings>,
    segment: Segment,
    completed_work_count: u32,
    #[serde(default)]
    run: RunState,
    remaining_secs: u64,
}

impl Pomodoro {
    pub fn new(settings: PomodoroSettings) -> Self {
        let settings = settings.clamped();
        Self {
            settings,
            pending: None,
            segment: Segment::Work,
            completed_work_count: 0,
            run: RunState::Idle,
            remaining_secs: settings.segment_secs(Segment::Work),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &PomodoroSettings {
        &self.settings
    }

    pub fn pending_settings(&self) -> Option<&PomodoroSettings> {
        self.pending.as_ref()
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn completed_work_count(&self) -> u32 {
        self.completed_work_count
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn segment_secs(&self) -> u64 {
        self.settings.segment_secs(self.segment)
    }

    pub fn remaining_at(&self, now_ms: u64) -> u64 {
        match self.run {
            RunState::Running { anchor_ms } => remaining_secs(self.segment_secs(), now_ms, anchor_ms),
            _ => self.remaining_secs,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn update_settings(&mut self, patch: &PomodoroSettingsPatch, now_ms: u64) -> Option<Event> {
        let deferred = self.run.is_running();
        if deferred {
            let base = self.pending.unwrap_or(self.settings);
            self.pending = Some(base.apply(patch));
        } else {
            self.settings = self.settings.apply(patch);
            match self.run {
                RunState::Paused { frozen } => {
                    let frozen = frozen.min(self.segment_secs());
                    self.run = RunState::Paused { frozen };
                    self.remaining_secs = frozen;
                }
                _ => self.remaining_secs = self.segment_secs(),
            }
        }
        debug!(deferred, settings = ?self.settings, "pomodoro settings updated");
        Some(Event::SettingsUpdated {
            mode: TimerMode::Pomodoro,
            deferred,
            at: timestamp(now_ms),
        })
    }

    /// Move to the next segment. A running machine keeps running, anchored
    /// at `next_anchor`; otherwise the new segment waits in `Idle`.
    fn advance(&mut self, now_ms: u64, skipped: bool) -> Event {
        let finished = self.segment;
        let finished_secs = self.segment_secs();
        let previous_anchor = self.run.anchor();

        if finished == Segment::Work {
            self.completed_work_count = self.completed_work_count.saturating_add(1);
        }
        if let Some(pending) = self.pending.take() {
            self.settings = pending;
        }
        let next = self.settings.next_segment(finished, self.completed_work_count);
        self.segment = next;
        self.remaining_secs = self.segment_secs();

        self.run = match previous_anchor {
            Some(anchor_ms) if !skipped => RunState::Running {
                anchor_ms: carry_anchor(anchor_ms, finished_secs, now_ms, self.remaining_secs),
            },
            Some(_) => RunState::Running { anchor_ms: now_ms },
            None => RunState::Idle,
        };

        info!(
            %finished,
            %next,
            completed_work_count = self.completed_work_count,
            skipped,
            "pomodoro segment completed"
        );
        Event::SegmentCompleted {
            segment: finished,
            next,
            completed_work_count: self.completed_work_count,
            skipped,
            at: timestamp(now_ms),
        }
    }
}

impl TimerMachine for Pomodoro {
    fn mode(&self) -> TimerMode {
        TimerMode::Pomodoro
    }

    fn run_state(&self) -> RunState {
        self.run
    }

    fn start(&mut self, now_ms: u64) -> Option<Event> {
        let anchor_ms = match self.run {
            RunState::Running { .. } => return None,
            RunState::Paused { frozen } => resume_anchor(now_ms, self.segment_secs(), frozen),
            RunState::Idle | RunState::Stopped => now_ms,
        };
        self.run = RunState::Running { anchor_ms };
        debug!(segment = %self.segment, remaining_secs = self.remaining_secs, "pomodoro started");
        Some(Event::TimerStarted {
            mode: TimerMode::Pomodoro,
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
        debug!(segment = %self.segment, remaining_secs = remaining, "pomodoro paused");
        crossed.or(Some(Event::TimerPaused {
            mode: TimerMode::Pomodoro,
            value: remaining,
            at: timestamp(now_ms),
        }))
    }

    fn reset(&mut self, now_ms: u64) -> Option<Event> {
        if let Some(pending) = self.pending.take() {
            self.settings = pending;
        }
        self.segment = Segment::Work;
        self.completed_work_count = 0;
        self.run = RunState::Idle;
        self.remaining_secs = self.segment_secs();
        debug!("pomodoro reset");
        Some(Event::TimerReset {
            mode: TimerMode::Pomodoro,
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
        Some(self.advance(now_ms, true))
    }

    fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new(
            TimerMode::Pomodoro,
            self.run.status(),
            self.remaining_secs,
            self.segment_secs(),
        );
        snap.segment = Some(self.segment);
        snap.completed_count = Some(self.completed_work_count);
        snap
    }
}
