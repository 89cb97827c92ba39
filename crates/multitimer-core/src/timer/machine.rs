use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Countdown, IntervalTimer, Pomodoro, RepeatingTimer, RunState, Stopwatch, TimerMode};
use crate::events::{Event, Snapshot};

/// Control surface shared by every timer mode.
///
/// All operations are synchronous and take the current clock reading, so a
/// machine never reads the clock itself. Each returns the event the
/// transition produced, or `None` when the call was a no-op.
pub trait TimerMachine {
    fn mode(&self) -> TimerMode;

    fn run_state(&self) -> RunState;

    fn start(&mut self, now_ms: u64) -> Option<Event>;

    fn pause(&mut self, now_ms: u64) -> Option<Event>;

    fn reset(&mut self, now_ms: u64) -> Option<Event>;

    /// Recompute the observable value; crosses a boundary if one is due.
    fn tick(&mut self, now_ms: u64) -> Option<Event>;

    fn snapshot(&self) -> Snapshot;

    /// Force the natural-completion transition. No-op for modes without
    /// segments.
    fn skip(&mut self, _now_ms: u64) -> Option<Event> {
        None
    }

    fn is_running(&self) -> bool {
        self.run_state().is_running()
    }

    fn tick_period(&self) -> Duration {
        self.mode().tick_period()
    }
}

/// One machine of any mode, for owning layers that dispatch by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AnyTimer {
    Countdown(Countdown),
    Pomodoro(Pomodoro),
    Interval(IntervalTimer),
    Repeating(RepeatingTimer),
    Stopwatch(Stopwatch),
}

macro_rules! delegate {
    ($self:ident, $timer:ident => $body:expr) => {
        match $self {
            AnyTimer::Countdown($timer) => $body,
            AnyTimer::Pomodoro($timer) => $body,
            AnyTimer::Interval($timer) => $body,
            AnyTimer::Repeating($timer) => $body,
            AnyTimer::Stopwatch($timer) => $body,
        }
    };
}

impl TimerMachine for AnyTimer {
    fn mode(&self) -> TimerMode {
        delegate!(self, t => t.mode())
    }

    fn run_state(&self) -> RunState {
        delegate!(self, t => t.run_state())
    }

    fn start(&mut self, now_ms: u64) -> Option<Event> {
        delegate!(self, t => t.start(now_ms))
    }

    fn pause(&mut self, now_ms: u64) -> Option<Event> {
        delegate!(self, t => t.pause(now_ms))
    }

    fn reset(&mut self, now_ms: u64) -> Option<Event> {
        delegate!(self, t => t.reset(now_ms))
    }

    fn tick(&mut self, now_ms: u64) -> Option<Event> {
        delegate!(self, t => t.tick(now_ms))
    }

    fn snapshot(&self) -> Snapshot {
        delegate!(self, t => t.snapshot())
    }

    fn skip(&mut self, now_ms: u64) -> Option<Event> {
        delegate!(self, t => t.skip(now_ms))
    }
}

impl From<Countdown> for AnyTimer {
    fn from(t: Countdown) -> Self {
        AnyTimer::Countdown(t)
    }
}

impl From<Pomodoro> for AnyTimer {
    fn from(t: Pomodoro) -> Self {
        AnyTimer::Pomodoro(t)
    }
}

impl From<IntervalTimer> for AnyTimer {
    fn from(t: IntervalTimer) -> Self {
        AnyTimer::Interval(t)
    }
}

impl From<RepeatingTimer> for AnyTimer {
    fn from(t: RepeatingTimer) -> Self {
        AnyTimer::Repeating(t)
    }
}

impl From<Stopwatch> for AnyTimer {
    fn from(t: Stopwatch) -> Self {
        AnyTimer::Stopwatch(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CountdownSettings;

    #[test]
    fn any_timer_delegates_and_roundtrips() {
        let mut timer = AnyTimer::from(Countdown::new(CountdownSettings { duration_secs: 5 }));
        assert_eq!(timer.mode(), TimerMode::Countdown);
        timer.start(1_000);
        let json = serde_json::to_string(&timer).unwrap();
        let restored: AnyTimer = serde_json::from_str(&json).unwrap();
        assert!(restored.is_running());
        assert_eq!(restored.mode(), TimerMode::Countdown);
    }

    #[test]
    fn skip_is_a_noop_without_segments() {
        let mut timer = AnyTimer::from(Stopwatch::new());
        assert!(timer.skip(0).is_none());
    }
}
