use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{IntervalLabel, Segment, TimerMode, TimerStatus};

/// Every state change in a timer produces an Event.
///
/// The boundary-crossing subset (see [`Event::is_completion`]) is what a
/// [`crate::CompletionNotifier`] receives, exactly once per crossing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        /// Remaining seconds, or elapsed milliseconds for the stopwatch.
        value: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        value: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero, or a finite repeating timer hit its target.
    Completed {
        mode: TimerMode,
        completed_count: Option<u32>,
        at: DateTime<Utc>,
    },
    /// A Pomodoro segment ended, naturally or through `skip`.
    SegmentCompleted {
        segment: Segment,
        next: Segment,
        completed_work_count: u32,
        skipped: bool,
        at: DateTime<Utc>,
    },
    /// Interval moved to the next label or round.
    IntervalAdvanced {
        label: IntervalLabel,
        round: u32,
        at: DateTime<Utc>,
    },
    /// The last `B` segment of the last round finished.
    CycleCompleted {
        mode: TimerMode,
        rounds: u32,
        at: DateTime<Utc>,
    },
    /// One repetition ended and the next one started.
    RepeatCompleted {
        completed_count: u32,
        at: DateTime<Utc>,
    },
    LapRecorded {
        lap_number: usize,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        mode: TimerMode,
        /// The change waits for the next reset or segment boundary.
        deferred: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// True for the events that mark a boundary crossing.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Event::Completed { .. }
                | Event::SegmentCompleted { .. }
                | Event::CycleCompleted { .. }
                | Event::RepeatCompleted { .. }
        )
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerReset { at, .. }
            | Event::Completed { at, .. }
            | Event::SegmentCompleted { at, .. }
            | Event::IntervalAdvanced { at, .. }
            | Event::CycleCompleted { at, .. }
            | Event::RepeatCompleted { at, .. }
            | Event::LapRecorded { at, .. }
            | Event::SettingsUpdated { at, .. } => *at,
        }
    }

    /// Stable name used when recording completions.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerReset { .. } => "timer_reset",
            Event::Completed { .. } => "completed",
            Event::SegmentCompleted { .. } => "segment_completed",
            Event::IntervalAdvanced { .. } => "interval_advanced",
            Event::CycleCompleted { .. } => "cycle_completed",
            Event::RepeatCompleted { .. } => "repeat_completed",
            Event::LapRecorded { .. } => "lap_recorded",
            Event::SettingsUpdated { .. } => "settings_updated",
        }
    }
}

/// Convert a clock reading into an event timestamp.
pub fn timestamp(now_ms: u64) -> DateTime<Utc> {
    i64::try_from(now_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_default()
}

/// Observable state of one machine, as polled by a display loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: TimerMode,
    pub status: TimerStatus,
    /// Remaining seconds, or elapsed milliseconds for the stopwatch.
    pub value: u64,
    pub running: bool,
    /// Length of the current segment in seconds; zero for the stopwatch.
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<IntervalLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rounds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub laps: Vec<u64>,
}

impl Snapshot {
    pub(crate) fn new(mode: TimerMode, status: TimerStatus, value: u64, total: u64) -> Self {
        Self {
            mode,
            status,
            value,
            running: status == TimerStatus::Running,
            total,
            segment: None,
            label: None,
            round: None,
            total_rounds: None,
            completed_count: None,
            target_count: None,
            laps: Vec::new(),
        }
    }
}
