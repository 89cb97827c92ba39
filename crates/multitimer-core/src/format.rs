//! Display helpers for timer values and completion events.

use crate::events::Event;
use crate::settings::hms;
use crate::timer::{Segment, TimerMode};

/// `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_time(secs: u64) -> String {
    let (h, m, s) = hms(secs);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// `MM:SS.cc` for stopwatch readings.
pub fn format_millis(ms: u64) -> String {
    let centis = (ms % 1_000) / 10;
    let secs = ms / 1_000;
    format!("{}.{centis:02}", format_time(secs))
}

/// Human-readable alert text for a completion event.
pub fn completion_message(event: &Event) -> Option<String> {
    let msg = match event {
        Event::Completed { mode: TimerMode::Countdown, .. } => "Countdown timer completed!".to_string(),
        Event::Completed { .. } => "All repeating timer cycles completed!".to_string(),
        Event::SegmentCompleted { segment, .. } => match segment {
            Segment::Work => "Work session completed! Time for a break.".to_string(),
            Segment::ShortBreak => "Short break completed! Ready to work?".to_string(),
            Segment::LongBreak => "Long break completed! Ready to work?".to_string(),
        },
        Event::CycleCompleted { .. } => "All interval rounds completed!".to_string(),
        Event::RepeatCompleted { completed_count, .. } => {
            format!("Repetition {completed_count} completed.")
        }
        _ => return None,
    };
    Some(msg)
}
