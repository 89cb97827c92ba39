use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ValidationError;

/// Tick period for countdown-style machines.
pub const COUNTDOWN_TICK: Duration = Duration::from_millis(100);
/// Tick period for the stopwatch; laps need finer resolution.
pub const STOPWATCH_TICK: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Countdown,
    Pomodoro,
    Interval,
    Repeating,
    Stopwatch,
}

impl TimerMode {
    pub const ALL: [TimerMode; 5] = [
        TimerMode::Pomodoro,
        TimerMode::Stopwatch,
        TimerMode::Countdown,
        TimerMode::Interval,
        TimerMode::Repeating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Countdown => "countdown",
            TimerMode::Pomodoro => "pomodoro",
            TimerMode::Interval => "interval",
            TimerMode::Repeating => "repeating",
            TimerMode::Stopwatch => "stopwatch",
        }
    }

    pub fn tick_period(&self) -> Duration {
        match self {
            TimerMode::Stopwatch => STOPWATCH_TICK,
            _ => COUNTDOWN_TICK,
        }
    }

    /// Key under which an owning layer persists this mode's machine.
    pub fn storage_key(&self) -> String {
        format!("timer.{}", self.as_str())
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimerMode::Countdown => "Countdown",
            TimerMode::Pomodoro => "Pomodoro",
            TimerMode::Interval => "Interval",
            TimerMode::Repeating => "Repeating",
            TimerMode::Stopwatch => "Stopwatch",
        };
        write!(f, "{label}")
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimerMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownMode(s.to_string()))
    }
}

/// Public view of a machine's run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Anchored-or-frozen run state shared by every machine.
///
/// A running machine is anchored to the wall clock; a paused one holds the
/// value it was frozen at. `Idle` (fresh or reset) and `Stopped` (terminal)
/// hold neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running {
        anchor_ms: u64,
    },
    Paused {
        /// Remaining seconds, or elapsed milliseconds for the stopwatch.
        frozen: u64,
    },
    Stopped,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }

    pub fn anchor(&self) -> Option<u64> {
        match self {
            RunState::Running { anchor_ms } => Some(*anchor_ms),
            _ => None,
        }
    }

    pub fn frozen(&self) -> Option<u64> {
        match self {
            RunState::Paused { frozen } => Some(*frozen),
            _ => None,
        }
    }

    pub fn status(&self) -> TimerStatus {
        match self {
            RunState::Idle => TimerStatus::Idle,
            RunState::Running { .. } => TimerStatus::Running,
            RunState::Paused { .. } => TimerStatus::Paused,
            RunState::Stopped => TimerStatus::Completed,
        }
    }
}
