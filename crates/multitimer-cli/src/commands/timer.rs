use clap::Subcommand;
use serde::de::DeserializeOwned;

use multitimer_core::settings::{
    parse_clock, CountdownSettingsPatch, IntervalSettingsPatch, PomodoroSettingsPatch,
    RepeatingSettingsPatch, COUNTDOWN_DURATION_SECS, INTERVAL_SEGMENT_SECS,
    REPEATING_DURATION_SECS,
};
use multitimer_core::{
    AnyTimer, Config, Database, Event, SystemClock, TimerMachine, TimerMode, TimerSession,
    ValidationError,
};

use super::{load_timer, print_json, save_timer, CliResult};
use crate::notifier::ConsoleNotifier;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume
    Start,
    /// Pause, freezing the current value
    Pause,
    /// Back to the initial state
    Reset,
    /// End the current segment now
    Skip,
    /// Record a lap (stopwatch only)
    Lap,
    /// Print current timer state as JSON
    Status,
    /// Change a setting (e.g. `duration_secs 90` or `duration_secs 1:30`)
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
}

pub fn run(mode: TimerMode, action: TimerAction) -> CliResult {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let timer = load_timer(&db, &config, mode)?;
    let notifier = ConsoleNotifier::new(&db, mode, config.alerts.enabled);
    let mut session = TimerSession::new(timer, SystemClock, notifier);

    // Catch up on boundaries crossed since the last invocation.
    session.apply(|m, now| m.tick(now));

    let event = match action {
        TimerAction::Start => session.start(),
        TimerAction::Pause => session.pause(),
        TimerAction::Reset => session.reset(),
        TimerAction::Skip => session.skip(),
        TimerAction::Lap => {
            if mode != TimerMode::Stopwatch {
                return Err(ValidationError::InvalidValue {
                    field: "lap".into(),
                    message: format!("{mode} has no laps"),
                }
                .into());
            }
            session.apply(|m, now| match m {
                AnyTimer::Stopwatch(sw) => sw.record_lap(now),
                _ => None,
            })
        }
        TimerAction::Status => None,
        TimerAction::Set { key, value } => update_settings(&mut session, mode, &key, &value)?,
    };

    match &event {
        Some(event) => print_json(event)?,
        None => print_json(&session.snapshot())?,
    }

    let timer = session.into_machine();
    save_timer(&db, &timer)?;
    Ok(())
}

/// Build a one-field patch. `*_secs` values also accept `H:MM:SS` and
/// `M:SS` when the mode has a seconds range (`max_secs`).
fn parse_patch<P: DeserializeOwned>(
    key: &str,
    value: &str,
    max_secs: Option<u64>,
) -> Result<P, ValidationError> {
    let parsed = match max_secs {
        Some(max_secs) if key.ends_with("_secs") && value.contains(':') => {
            let secs = parse_clock(value, max_secs).ok_or_else(|| ValidationError::InvalidValue {
                field: key.to_string(),
                message: format!("expected H:MM:SS or M:SS, got `{value}`"),
            })?;
            serde_json::Value::from(secs)
        }
        _ => serde_json::from_str::<serde_json::Value>(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string())),
    };
    let mut patch = serde_json::Map::new();
    patch.insert(key.to_string(), parsed);
    serde_json::from_value(serde_json::Value::Object(patch)).map_err(|e| {
        ValidationError::InvalidValue {
            field: key.to_string(),
            message: e.to_string(),
        }
    })
}

type Session<'a> = TimerSession<AnyTimer, SystemClock, ConsoleNotifier<'a>>;

fn update_settings(
    session: &mut Session<'_>,
    mode: TimerMode,
    key: &str,
    value: &str,
) -> Result<Option<Event>, ValidationError> {
    Ok(match mode {
        TimerMode::Countdown => {
            let patch: CountdownSettingsPatch =
                parse_patch(key, value, Some(*COUNTDOWN_DURATION_SECS.end()))?;
            session.apply(|m, now| match m {
                AnyTimer::Countdown(t) => t.update_settings(&patch, now),
                _ => None,
            })
        }
        TimerMode::Pomodoro => {
            let patch: PomodoroSettingsPatch = parse_patch(key, value, None)?;
            session.apply(|m, now| match m {
                AnyTimer::Pomodoro(t) => t.update_settings(&patch, now),
                _ => None,
            })
        }
        TimerMode::Interval => {
            let patch: IntervalSettingsPatch =
                parse_patch(key, value, Some(*INTERVAL_SEGMENT_SECS.end()))?;
            session.apply(|m, now| match m {
                AnyTimer::Interval(t) => t.update_settings(&patch, now),
                _ => None,
            })
        }
        TimerMode::Repeating => {
            let patch: RepeatingSettingsPatch =
                parse_patch(key, value, Some(*REPEATING_DURATION_SECS.end()))?;
            session.apply(|m, now| match m {
                AnyTimer::Repeating(t) => t.update_settings(&patch, now),
                _ => None,
            })
        }
        TimerMode::Stopwatch => {
            return Err(ValidationError::InvalidValue {
                field: key.to_string(),
                message: "the stopwatch has no settings".into(),
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_parses_numbers_and_bools() {
        let p: RepeatingSettingsPatch = parse_patch("repeat_count", "3", None).unwrap();
        assert_eq!(p.repeat_count, Some(3));
        let p: RepeatingSettingsPatch = parse_patch("infinite", "true", None).unwrap();
        assert_eq!(p.infinite, Some(true));
    }

    #[test]
    fn patch_rejects_unknown_keys() {
        let err = parse_patch::<CountdownSettingsPatch>("volume", "3", None).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn patch_rejects_wrong_types() {
        assert!(parse_patch::<IntervalSettingsPatch>("rounds", "many", None).is_err());
    }

    #[test]
    fn patch_accepts_clock_strings_for_seconds() {
        let p: CountdownSettingsPatch =
            parse_patch("duration_secs", "1:30:00", Some(*COUNTDOWN_DURATION_SECS.end())).unwrap();
        assert_eq!(p.duration_secs, Some(5_400));
        let p: IntervalSettingsPatch =
            parse_patch("interval_b_secs", "0:45", Some(*INTERVAL_SEGMENT_SECS.end())).unwrap();
        assert_eq!(p.interval_b_secs, Some(45));
        assert!(parse_patch::<CountdownSettingsPatch>(
            "duration_secs",
            "1:xx",
            Some(*COUNTDOWN_DURATION_SECS.end())
        )
        .is_err());
    }
}
