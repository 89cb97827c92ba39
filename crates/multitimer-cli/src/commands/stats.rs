use chrono::Local;
use multitimer_core::Database;

use super::{print_json, CliResult};

pub fn run(json: bool) -> CliResult {
    let db = Database::open()?;
    let counts = db.completion_counts()?;

    if json {
        return print_json(&counts);
    }

    if counts.is_empty() {
        println!("no completions recorded");
        return Ok(());
    }
    for c in &counts {
        println!(
            "{:<10} {:<18} {:>5}  last {}",
            c.mode,
            c.kind,
            c.count,
            c.last_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
