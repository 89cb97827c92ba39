use std::io::Write;

use tokio::time::MissedTickBehavior;

use multitimer_core::format::{format_millis, format_time};
use multitimer_core::{Config, Database, Snapshot, SystemClock, TimerMode, TimerSession};

use super::{load_timer, save_timer, CliResult};
use crate::notifier::ConsoleNotifier;

/// Start (or resume) `mode` and redraw its value until the timer stops or
/// Ctrl-C pauses it.
pub fn run(mode: TimerMode) -> CliResult {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()?;
    rt.block_on(drive(mode))
}

async fn drive(mode: TimerMode) -> CliResult {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let timer = load_timer(&db, &config, mode)?;
    let notifier = ConsoleNotifier::new(&db, mode, config.alerts.enabled);
    let mut session = TimerSession::new(timer, SystemClock, notifier);
    session.start();

    let mut ticker = tokio::time::interval(session.scheduler().period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last_line = String::new();
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.poll();
                let line = render(&session.snapshot());
                if line != last_line {
                    print!("\r{line}\x1b[K");
                    std::io::stdout().flush()?;
                    last_line = line;
                }
                if !session.is_running() {
                    break;
                }
            }
            res = &mut ctrl_c => {
                res?;
                session.pause();
                tracing::debug!(mode = %mode, "interrupted");
                break;
            }
        }
    }
    println!("\r{}\x1b[K", render(&session.snapshot()));

    save_timer(&db, &session.into_machine())?;
    Ok(())
}

fn render(snapshot: &Snapshot) -> String {
    let mut line = if snapshot.mode == TimerMode::Stopwatch {
        let mut line = format!("{} {}", snapshot.mode, format_millis(snapshot.value));
        if let Some(last) = snapshot.laps.first() {
            line.push_str(&format!("  lap {}: {}", snapshot.laps.len(), format_millis(*last)));
        }
        line
    } else {
        let mut line = format!("{} {}", snapshot.mode, format_time(snapshot.value));
        if let Some(segment) = snapshot.segment {
            line.push_str(&format!("  {segment}"));
        }
        if let (Some(label), Some(round), Some(total)) =
            (snapshot.label, snapshot.round, snapshot.total_rounds)
        {
            line.push_str(&format!("  {label} round {round}/{total}"));
        }
        if let Some(done) = snapshot.completed_count {
            match snapshot.target_count {
                Some(target) => line.push_str(&format!("  {done}/{target}")),
                None => line.push_str(&format!("  {done} done")),
            }
        }
        line
    };
    line.push_str(&format!("  [{:?}]", snapshot.status).to_lowercase());
    line
}
