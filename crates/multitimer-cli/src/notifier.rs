use multitimer_core::format::completion_message;
use multitimer_core::{CompletionNotifier, Database, Event, TimerMode};

/// Logs completions to the database and prints alert text to stderr.
pub struct ConsoleNotifier<'a> {
    db: &'a Database,
    mode: TimerMode,
    alerts: bool,
}

impl<'a> ConsoleNotifier<'a> {
    pub fn new(db: &'a Database, mode: TimerMode, alerts: bool) -> Self {
        Self { db, mode, alerts }
    }
}

impl CompletionNotifier for ConsoleNotifier<'_> {
    fn notify(&mut self, event: &Event) {
        if let Err(e) = self.db.record_completion(self.mode, event) {
            tracing::warn!(error = %e, "failed to record completion");
        }
        if self.alerts {
            if let Some(msg) = completion_message(event) {
                eprintln!("\x07{msg}");
            }
        }
    }
}
