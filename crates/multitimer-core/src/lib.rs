//! # Multitimer Core Library
//!
//! This library provides the timer engine behind the `multitimer` CLI: five
//! timer modes (countdown, pomodoro, interval, repeating, stopwatch) sharing
//! one drift-corrected clock discipline. Front ends stay thin layers over the
//! same core.
//!
//! ## Architecture
//!
//! - **Clock**: Wall-clock anchors; every displayed value is recomputed from
//!   `now - anchor`, so tick jitter never accumulates
//! - **Timer Engine**: One state machine per mode behind [`TimerMachine`].
//!   Machines never read the clock themselves; the caller passes `now`
//! - **Scheduler**: [`TickScheduler`] arms a tick only while a machine runs;
//!   [`TimerSession`] wires machine, clock, ticks and completion alerts
//! - **Storage**: SQLite key/value store for machine state and a completion
//!   log, TOML configuration for per-mode defaults
//!
//! ## Key Components
//!
//! - [`AnyTimer`]: Any mode's machine, serializable for persistence
//! - [`TimerSession`]: Drives a machine from a [`Clock`]
//! - [`Database`]: Key/value state and completion statistics
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod format;
pub mod scheduler;
pub mod settings;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::{Event, Snapshot};
pub use scheduler::{CompletionNotifier, TickScheduler, TimerSession};
pub use storage::{Config, Database, MemoryStore, SettingsStore};
pub use timer::{
    AnyTimer, Countdown, IntervalLabel, IntervalTimer, Pomodoro, RepeatingTimer, RunState,
    Segment, Stopwatch, TimerMachine, TimerMode, TimerStatus,
};
