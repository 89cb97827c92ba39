//! Per-mode timer settings.
//!
//! Every numeric field has a declared range. Out-of-range input is clamped
//! into it, never rejected. Durations are whole seconds except the Pomodoro
//! segment lengths, which are configured in minutes.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const COUNTDOWN_DURATION_SECS: RangeInclusive<u64> = 1..=86_399;
pub const POMODORO_WORK_MIN: RangeInclusive<u64> = 1..=120;
pub const POMODORO_BREAK_MIN: RangeInclusive<u64> = 1..=60;
pub const POMODORO_LONG_BREAK_INTERVAL: RangeInclusive<u32> = 1..=10;
pub const INTERVAL_SEGMENT_SECS: RangeInclusive<u64> = 1..=3_600;
pub const INTERVAL_ROUNDS: RangeInclusive<u32> = 1..=50;
pub const REPEATING_DURATION_SECS: RangeInclusive<u64> = 1..=3_599;
pub const REPEATING_COUNT: RangeInclusive<u32> = 1..=100;

pub fn clamp_to<T: Ord + Copy>(value: T, range: &RangeInclusive<T>) -> T {
    value.clamp(*range.start(), *range.end())
}

/// Split a total into `(hours, minutes, seconds)`.
pub fn hms(total_secs: u64) -> (u64, u64, u64) {
    (total_secs / 3_600, (total_secs % 3_600) / 60, total_secs % 60)
}

/// Compose a total from hour/minute/second fields.
///
/// Minutes and seconds are clamped to 0..=59 and the result is at least one
/// second, matching the duration inputs.
pub fn from_hms(hours: u64, minutes: u64, seconds: u64) -> u64 {
    let total = hours
        .saturating_mul(3_600)
        .saturating_add(minutes.min(59) * 60)
        .saturating_add(seconds.min(59));
    total.max(1)
}

/// Compose a total from minute/second fields, clamping minutes to `max_minutes`.
pub fn from_minutes_seconds(minutes: u64, seconds: u64, max_minutes: u64) -> u64 {
    (minutes.min(max_minutes) * 60 + seconds.min(59)).max(1)
}

/// Parse `H:MM:SS` or `M:SS` into seconds.
///
/// Fields clamp like the duration inputs; `M:SS` minutes are capped by
/// `max_secs`. Returns `None` for any other shape.
pub fn parse_clock(value: &str, max_secs: u64) -> Option<u64> {
    let parts = value
        .trim()
        .split(':')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts[..] {
        [h, m, s] => Some(from_hms(h, m, s)),
        [m, s] => Some(from_minutes_seconds(m, s, max_secs / 60)),
        _ => None,
    }
}

// ── Countdown ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSettings {
    #[serde(default = "default_countdown_duration")]
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountdownSettingsPatch {
    pub duration_secs: Option<u64>,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            duration_secs: default_countdown_duration(),
        }
    }
}

impl CountdownSettings {
    pub fn clamped(self) -> Self {
        Self {
            duration_secs: clamp_to(self.duration_secs, &COUNTDOWN_DURATION_SECS),
        }
    }

    pub fn apply(self, patch: &CountdownSettingsPatch) -> Self {
        Self {
            duration_secs: patch.duration_secs.unwrap_or(self.duration_secs),
        }
        .clamped()
    }
}

// ── Pomodoro ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSettings {
    #[serde(default = "default_work_min")]
    pub work_min: u64,
    #[serde(default = "default_short_break_min")]
    pub short_break_min: u64,
    #[serde(default = "default_long_break_min")]
    pub long_break_min: u64,
    /// A long break follows every N-th completed work segment.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PomodoroSettingsPatch {
    pub work_min: Option<u64>,
    pub short_break_min: Option<u64>,
    pub long_break_min: Option<u64>,
    pub long_break_interval: Option<u32>,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_min: default_work_min(),
            short_break_min: default_short_break_min(),
            long_break_min: default_long_break_min(),
            long_break_interval: default_long_break_interval(),
        }
    }
}

impl PomodoroSettings {
    pub fn clamped(self) -> Self {
        Self {
            work_min: clamp_to(self.work_min, &POMODORO_WORK_MIN),
            short_break_min: clamp_to(self.short_break_min, &POMODORO_BREAK_MIN),
            long_break_min: clamp_to(self.long_break_min, &POMODORO_BREAK_MIN),
            long_break_interval: clamp_to(self.long_break_interval, &POMODORO_LONG_BREAK_INTERVAL),
        }
    }

    pub fn apply(self, patch: &PomodoroSettingsPatch) -> Self {
        Self {
            work_min: patch.work_min.unwrap_or(self.work_min),
            short_break_min: patch.short_break_min.unwrap_or(self.short_break_min),
            long_break_min: patch.long_break_min.unwrap_or(self.long_break_min),
            long_break_interval: patch.long_break_interval.unwrap_or(self.long_break_interval),
        }
        .clamped()
    }
}

// ── Interval ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSettings {
    #[serde(default = "default_interval_a")]
    pub interval_a_secs: u64,
    #[serde(default = "default_interval_b")]
    pub interval_b_secs: u64,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntervalSettingsPatch {
    pub interval_a_secs: Option<u64>,
    pub interval_b_secs: Option<u64>,
    pub rounds: Option<u32>,
}

impl Default for IntervalSettings {
    fn default() -> Self {
        Self {
            interval_a_secs: default_interval_a(),
            interval_b_secs: default_interval_b(),
            rounds: default_rounds(),
        }
    }
}

impl IntervalSettings {
    pub fn clamped(self) -> Self {
        Self {
            interval_a_secs: clamp_to(self.interval_a_secs, &INTERVAL_SEGMENT_SECS),
            interval_b_secs: clamp_to(self.interval_b_secs, &INTERVAL_SEGMENT_SECS),
            rounds: clamp_to(self.rounds, &INTERVAL_ROUNDS),
        }
    }

    pub fn apply(self, patch: &IntervalSettingsPatch) -> Self {
        Self {
            interval_a_secs: patch.interval_a_secs.unwrap_or(self.interval_a_secs),
            interval_b_secs: patch.interval_b_secs.unwrap_or(self.interval_b_secs),
            rounds: patch.rounds.unwrap_or(self.rounds),
        }
        .clamped()
    }
}

// ── Repeating ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatingSettings {
    #[serde(default = "default_repeating_duration")]
    pub duration_secs: u64,
    #[serde(default = "default_repeat_count")]
    pub repeat_count: u32,
    #[serde(default)]
    pub infinite: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepeatingSettingsPatch {
    pub duration_secs: Option<u64>,
    pub repeat_count: Option<u32>,
    pub infinite: Option<bool>,
}

impl Default for RepeatingSettings {
    fn default() -> Self {
        Self {
            duration_secs: default_repeating_duration(),
            repeat_count: default_repeat_count(),
            infinite: false,
        }
    }
}

impl RepeatingSettings {
    pub fn clamped(self) -> Self {
        Self {
            duration_secs: clamp_to(self.duration_secs, &REPEATING_DURATION_SECS),
            repeat_count: clamp_to(self.repeat_count, &REPEATING_COUNT),
            infinite: self.infinite,
        }
    }

    pub fn apply(self, patch: &RepeatingSettingsPatch) -> Self {
        Self {
            duration_secs: patch.duration_secs.unwrap_or(self.duration_secs),
            repeat_count: patch.repeat_count.unwrap_or(self.repeat_count),
            infinite: patch.infinite.unwrap_or(self.infinite),
        }
        .clamped()
    }

    /// `None` in infinite mode.
    pub fn target(&self) -> Option<u32> {
        (!self.infinite).then_some(self.repeat_count)
    }
}

// Default functions
fn default_countdown_duration() -> u64 {
    300
}
fn default_work_min() -> u64 {
    25
}
fn default_short_break_min() -> u64 {
    5
}
fn default_long_break_min() -> u64 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_interval_a() -> u64 {
    30
}
fn default_interval_b() -> u64 {
    10
}
fn default_rounds() -> u32 {
    8
}
fn default_repeating_duration() -> u64 {
    60
}
fn default_repeat_count() -> u32 {
    5
}
