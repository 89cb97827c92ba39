mod countdown;
mod interval;
mod machine;
mod pomodoro;
mod repeating;
mod state;
mod stopwatch;

pub use countdown::Countdown;
pub use interval::{IntervalLabel, IntervalTimer};
pub use machine::{AnyTimer, TimerMachine};
pub use pomodoro::{Pomodoro, Segment};
pub use repeating::RepeatingTimer;
pub use state::{RunState, TimerMode, TimerStatus, COUNTDOWN_TICK, STOPWATCH_TICK};
pub use stopwatch::Stopwatch;
