//! Count-up stopwatch with laps. Works in milliseconds.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RunState, TimerMachine, TimerMode};
use crate::clock::{elapsed_ms, resume_anchor_ms};
use crate::events::{timestamp, Event, Snapshot};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stopwatch {
    #[serde(default)]
    run: RunState,
    elapsed_ms: u64,
    /// Newest first.
    #[serde(default)]
    laps: Vec<u64>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    pub fn elapsed_at(&self, now_ms: u64) -> u64 {
        match self.run {
            RunState::Running { anchor_ms } => elapsed_ms(now_ms, anchor_ms),
            RunState::Paused { frozen } => frozen,
            RunState::Idle | RunState::Stopped => self.elapsed_ms,
        }
    }

    /// Prepend the current elapsed value to the lap list. Run state is
    /// untouched.
    pub fn record_lap(&mut self, now_ms: u64) -> Option<Event> {
        let elapsed = self.elapsed_at(now_ms);
        self.elapsed_ms = elapsed;
        self.laps.insert(0, elapsed);
        debug!(lap = self.laps.len(), elapsed_ms = elapsed, "lap recorded");
        Some(Event::LapRecorded {
            lap_number: self.laps.len(),
            elapsed_ms: elapsed,
            at: timestamp(now_ms),
        })
    }
}

impl TimerMachine for Stopwatch {
    fn mode(&self) -> TimerMode {
        TimerMode::Stopwatch
    }

    fn run_state(&self) -> RunState {
        self.run
    }

    fn start(&mut self, now_ms: u64) -> Option<Event> {
        if self.run.is_running() {
            return None;
        }
        let anchor_ms = resume_anchor_ms(now_ms, self.elapsed_at(now_ms));
        self.run = RunState::Running { anchor_ms };
        debug!(elapsed_ms = self.elapsed_ms, "stopwatch started");
        Some(Event::TimerStarted {
            mode: TimerMode::Stopwatch,
            value: self.elapsed_ms,
            at: timestamp(now_ms),
        })
    }

    fn pause(&mut self, now_ms: u64) -> Option<Event> {
        if !self.run.is_running() {
            return None;
        }
        let elapsed = self.elapsed_at(now_ms);
        self.elapsed_ms = elapsed;
        self.run = RunState::Paused { frozen: elapsed };
        debug!(elapsed_ms = elapsed, "stopwatch paused");
        Some(Event::TimerPaused {
            mode: TimerMode::Stopwatch,
            value: elapsed,
            at: timestamp(now_ms),
        })
    }

    fn reset(&mut self, now_ms: u64) -> Option<Event> {
        self.run = RunState::Idle;
        self.elapsed_ms = 0;
        self.laps.clear();
        debug!("stopwatch reset");
        Some(Event::TimerReset {
            mode: TimerMode::Stopwatch,
            at: timestamp(now_ms),
        })
    }

    fn tick(&mut self, now_ms: u64) -> Option<Event> {
        if self.run.is_running() {
            self.elapsed_ms = self.elapsed_at(now_ms);
        }
        None
    }

    fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new(TimerMode::Stopwatch, self.run.status(), self.elapsed_ms, 0);
        snap.laps = self.laps.clone();
        snap
    }
}
