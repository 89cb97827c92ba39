pub mod config;
pub mod run;
pub mod stats;
pub mod timer;

use multitimer_core::storage::{load_json, save_json};
use multitimer_core::{AnyTimer, Config, Database, TimerMachine, TimerMode};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Load the persisted machine for `mode`, or build a fresh one from config.
pub fn load_timer(db: &Database, config: &Config, mode: TimerMode) -> CliResult<AnyTimer> {
    let stored: Option<AnyTimer> = load_json(db, &mode.storage_key())?;
    Ok(match stored {
        Some(timer) if timer.mode() == mode => timer,
        _ => config.machine(mode),
    })
}

pub fn save_timer(db: &Database, timer: &AnyTimer) -> CliResult {
    save_json(db, &timer.mode().storage_key(), timer)?;
    Ok(())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
