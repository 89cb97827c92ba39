//! Cooperative tick scheduling and the session driver that owns it.
//!
//! A [`TickScheduler`] is armed only while its machine runs. Pausing,
//! resetting or completing cancels the subscription outright, so a stopped
//! timer never sees another tick. Everything here is single-threaded: each
//! control call and each tick runs to completion before the next begins.

use std::time::Duration;
use tracing::trace;

use crate::clock::Clock;
use crate::events::{Event, Snapshot};
use crate::timer::TimerMachine;

/// Fixed-period tick subscription.
///
/// Late polls skip the ticks they missed: recomputation is idempotent, so
/// one catch-up tick is as good as many.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    period_ms: u64,
    next_due_ms: Option<u64>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period_ms: (period.as_millis() as u64).max(1),
            next_due_ms: None,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn is_armed(&self) -> bool {
        self.next_due_ms.is_some()
    }

    /// Deadline of the next tick, if armed.
    pub fn deadline(&self) -> Option<u64> {
        self.next_due_ms
    }

    /// Arm when `running` turns true, cancel when it turns false.
    pub fn sync(&mut self, running: bool, now_ms: u64) {
        match (running, self.next_due_ms) {
            (true, None) => self.next_due_ms = Some(now_ms.saturating_add(self.period_ms)),
            (false, Some(_)) => self.cancel(),
            _ => {}
        }
    }

    pub fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    /// True when a tick is due at `now_ms`; schedules the following one.
    pub fn poll_tick(&mut self, now_ms: u64) -> bool {
        let Some(due) = self.next_due_ms else {
            return false;
        };
        if now_ms < due {
            return false;
        }
        let missed = (now_ms - due) / self.period_ms;
        self.next_due_ms = Some(due + (missed + 1) * self.period_ms);
        true
    }
}

/// Receives boundary-crossing events, once per crossing.
pub trait CompletionNotifier {
    fn notify(&mut self, event: &Event);
}

impl CompletionNotifier for () {
    fn notify(&mut self, _event: &Event) {}
}

impl<F: FnMut(&Event)> CompletionNotifier for F {
    fn notify(&mut self, event: &Event) {
        self(event)
    }
}

/// One machine wired to a clock, a tick subscription and a notifier.
///
/// Control operations read the clock once, forward to the machine, re-sync
/// the scheduler and hand completion events to the notifier.
pub struct TimerSession<M, C, N> {
    machine: M,
    clock: C,
    scheduler: TickScheduler,
    notifier: N,
}

impl<M, C, N> TimerSession<M, C, N>
where
    M: TimerMachine,
    C: Clock,
    N: CompletionNotifier,
{
    pub fn new(machine: M, clock: C, notifier: N) -> Self {
        let mut scheduler = TickScheduler::new(machine.tick_period());
        scheduler.sync(machine.is_running(), clock.now_ms());
        Self {
            machine,
            clock,
            scheduler,
            notifier,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.machine.is_running()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot()
    }

    pub fn into_machine(self) -> M {
        self.machine
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.apply(|m, now| m.start(now))
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.apply(|m, now| m.pause(now))
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.apply(|m, now| m.reset(now))
    }

    pub fn skip(&mut self) -> Option<Event> {
        self.apply(|m, now| m.skip(now))
    }

    /// Run any machine operation (settings updates, laps) under the same
    /// clock/scheduler/notifier discipline as the built-in controls.
    pub fn apply<F>(&mut self, op: F) -> Option<Event>
    where
        F: FnOnce(&mut M, u64) -> Option<Event>,
    {
        let now = self.clock.now_ms();
        let event = op(&mut self.machine, now);
        self.scheduler.sync(self.machine.is_running(), now);
        self.dispatch(event.as_ref());
        event
    }

    /// Fire the tick callback if one is due.
    pub fn poll(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        if !self.scheduler.poll_tick(now) {
            return None;
        }
        trace!(now, mode = %self.machine.mode(), "tick");
        let event = self.machine.tick(now);
        self.scheduler.sync(self.machine.is_running(), now);
        self.dispatch(event.as_ref());
        event
    }

    fn dispatch(&mut self, event: Option<&Event>) {
        if let Some(event) = event.filter(|e| e.is_completion()) {
            self.notifier.notify(event);
        }
    }
}
