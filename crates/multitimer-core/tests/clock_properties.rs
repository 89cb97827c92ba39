//! Property tests for the drift-correction and completion guarantees.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;

use multitimer_core::settings::{
    CountdownSettings, IntervalSettings, PomodoroSettings, RepeatingSettings,
};
use multitimer_core::{
    Countdown, Event, IntervalTimer, ManualClock, Pomodoro, RepeatingTimer, Stopwatch,
    TimerMachine, TimerSession,
};

const T0: u64 = 1_700_000_000_000;

/// Split `duration` into a run before the pause (`a < duration`) and a run
/// after it that stays inside the segment (`a + b < duration`).
fn split(duration: u64, a_frac: f64, b_frac: f64) -> (u64, u64) {
    let a = ((duration as f64 * a_frac) as u64).min(duration - 1);
    let b = (((duration - a) as f64 * b_frac) as u64).min(duration - a - 1);
    (a, b)
}

/// Run `a` seconds, pause for `pause_ms`, resume and run `b` more seconds;
/// returns the remaining value read at the pause and at the end.
fn pause_resume<M: TimerMachine>(m: &mut M, a: u64, b: u64, pause_ms: u64) -> (u64, u64) {
    m.start(T0);
    let paused_at = T0 + a * 1_000;
    m.tick(paused_at);
    m.pause(paused_at);
    let frozen = m.snapshot().value;

    let resumed_at = paused_at + pause_ms;
    m.start(resumed_at);
    m.tick(resumed_at + b * 1_000);
    (frozen, m.snapshot().value)
}

proptest! {
    #[test]
    fn pause_length_never_changes_remaining(
        duration in 2u64..=3_600,
        a_frac in 0.0f64..1.0,
        b_frac in 0.0f64..=1.0,
        pause_ms in 0u64..=86_400_000,
    ) {
        let a = ((duration as f64 * a_frac) as u64).min(duration - 1);
        let b = ((duration - a) as f64 * b_frac) as u64;

        let mut c = Countdown::new(CountdownSettings { duration_secs: duration });
        c.start(T0);
        let paused_at = T0 + a * 1_000;
        c.tick(paused_at);
        c.pause(paused_at);
        prop_assert_eq!(c.remaining_secs(), duration - a);

        let resumed_at = paused_at + pause_ms;
        c.start(resumed_at);
        c.tick(resumed_at + b * 1_000);
        prop_assert_eq!(c.remaining_secs(), duration - a - b);
    }

    #[test]
    fn pomodoro_resume_ignores_pause_length(
        work_min in 1u64..=120,
        a_frac in 0.0f64..1.0,
        b_frac in 0.0f64..1.0,
        pause_ms in 0u64..=86_400_000,
    ) {
        let duration = work_min * 60;
        let (a, b) = split(duration, a_frac, b_frac);
        let mut p = Pomodoro::new(PomodoroSettings { work_min, ..Default::default() });
        let (frozen, end) = pause_resume(&mut p, a, b, pause_ms);
        prop_assert_eq!(frozen, duration - a);
        prop_assert_eq!(end, duration - a - b);
        prop_assert_eq!(p.completed_work_count(), 0);
    }

    #[test]
    fn interval_resume_ignores_pause_length(
        duration in 2u64..=3_600,
        a_frac in 0.0f64..1.0,
        b_frac in 0.0f64..1.0,
        pause_ms in 0u64..=86_400_000,
    ) {
        let (a, b) = split(duration, a_frac, b_frac);
        let mut t = IntervalTimer::new(IntervalSettings {
            interval_a_secs: duration,
            ..Default::default()
        });
        let (frozen, end) = pause_resume(&mut t, a, b, pause_ms);
        prop_assert_eq!(frozen, duration - a);
        prop_assert_eq!(end, duration - a - b);
        prop_assert_eq!(t.round(), 1);
    }

    #[test]
    fn repeating_resume_ignores_pause_length(
        duration in 2u64..=3_599,
        a_frac in 0.0f64..1.0,
        b_frac in 0.0f64..1.0,
        pause_ms in 0u64..=86_400_000,
    ) {
        let (a, b) = split(duration, a_frac, b_frac);
        let mut t = RepeatingTimer::new(RepeatingSettings {
            duration_secs: duration,
            repeat_count: 100,
            infinite: false,
        });
        let (frozen, end) = pause_resume(&mut t, a, b, pause_ms);
        prop_assert_eq!(frozen, duration - a);
        prop_assert_eq!(end, duration - a - b);
        prop_assert_eq!(t.completed_count(), 0);
    }

    #[test]
    fn countdown_completes_exactly_once(
        duration in 1u64..=600,
        steps in prop::collection::vec(1u64..=700, 1..400),
    ) {
        let clock = ManualClock::new(T0);
        let fired = Rc::new(Cell::new(0u32));
        let counter = fired.clone();
        let mut s = TimerSession::new(
            Countdown::new(CountdownSettings { duration_secs: duration }),
            clock.clone(),
            move |_: &Event| counter.set(counter.get() + 1),
        );
        s.start();

        let end = duration * 1_000;
        let mut t = 0;
        for step in steps.iter().cycle() {
            if t + step >= end {
                break;
            }
            t += step;
            clock.set(T0 + t);
            s.poll();
            prop_assert_eq!(fired.get(), 0);
        }

        clock.set(T0 + end);
        s.poll();
        let snap = s.snapshot();
        prop_assert_eq!(snap.value, 0);
        prop_assert!(!snap.running);
        prop_assert_eq!(fired.get(), 1);

        for step in &steps {
            clock.advance(*step);
            s.poll();
        }
        prop_assert_eq!(fired.get(), 1);
    }

    #[test]
    fn stopwatch_elapsed_ignores_pauses(
        runs in prop::collection::vec((1u64..=60_000, 0u64..=600_000), 1..10),
    ) {
        let mut sw = Stopwatch::new();
        let mut now = T0;
        let mut expected = 0;
        for (run_ms, pause_ms) in runs {
            sw.start(now);
            now += run_ms;
            expected += run_ms;
            sw.pause(now);
            prop_assert_eq!(sw.elapsed_ms(), expected);
            now += pause_ms;
        }
    }
}
