//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

struct Cli {
    dir: TempDir,
}

impl Cli {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temp dir"),
        }
    }

    /// Run a CLI command and return (exit code, stdout, stderr).
    fn run(&self, args: &[&str]) -> (i32, String, String) {
        let output = Command::new(env!("CARGO_BIN_EXE_multitimer"))
            .args(args)
            .env("MULTITIMER_DATA_DIR", self.dir.path())
            .env_remove("MULTITIMER_LOG")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        (output.status.code().unwrap_or(-1), stdout, stderr)
    }

    fn json(&self, args: &[&str]) -> Value {
        let (code, stdout, stderr) = self.run(args);
        assert_eq!(code, 0, "{args:?} failed: {stderr}");
        serde_json::from_str(&stdout).expect("JSON output")
    }
}

#[test]
fn test_countdown_start_and_status() {
    let cli = Cli::new();
    let started = cli.json(&["countdown", "start"]);
    assert_eq!(started["type"], "timer_started");
    assert_eq!(started["mode"], "countdown");
    assert_eq!(started["value"], 300);

    let status = cli.json(&["countdown", "status"]);
    assert_eq!(status["status"], "running");
    assert_eq!(status["running"], true);
}

#[test]
fn test_pause_then_reset() {
    let cli = Cli::new();
    cli.json(&["countdown", "start"]);
    let paused = cli.json(&["countdown", "pause"]);
    assert_eq!(paused["type"], "timer_paused");

    let status = cli.json(&["countdown", "status"]);
    assert_eq!(status["status"], "paused");

    let reset = cli.json(&["countdown", "reset"]);
    assert_eq!(reset["type"], "timer_reset");
    let status = cli.json(&["countdown", "status"]);
    assert_eq!(status["status"], "idle");
    assert_eq!(status["value"], 300);
}

#[test]
fn test_set_while_idle_updates_display() {
    let cli = Cli::new();
    let updated = cli.json(&["countdown", "set", "duration_secs", "90"]);
    assert_eq!(updated["type"], "settings_updated");
    assert_eq!(updated["deferred"], false);

    let status = cli.json(&["countdown", "status"]);
    assert_eq!(status["value"], 90);
    assert_eq!(status["total"], 90);
}

#[test]
fn test_set_accepts_clock_values() {
    let cli = Cli::new();
    cli.json(&["countdown", "set", "duration_secs", "1:30:00"]);
    let status = cli.json(&["countdown", "status"]);
    assert_eq!(status["value"], 5_400);

    cli.json(&["repeating", "set", "duration_secs", "2:30"]);
    let status = cli.json(&["repeating", "status"]);
    assert_eq!(status["value"], 150);

    let (code, _, stderr) = cli.run(&["interval", "set", "interval_a_secs", "1:x"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("H:MM:SS"));
}

#[test]
fn test_set_rejects_unknown_setting() {
    let cli = Cli::new();
    let (code, _, stderr) = cli.run(&["interval", "set", "volume", "3"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_lap_only_for_stopwatch() {
    let cli = Cli::new();
    let (code, _, stderr) = cli.run(&["countdown", "lap"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no laps"));

    cli.json(&["stopwatch", "start"]);
    let lap = cli.json(&["stopwatch", "lap"]);
    assert_eq!(lap["type"], "lap_recorded");
    assert_eq!(lap["lap_number"], 1);
}

#[test]
fn test_skip_records_completion() {
    let cli = Cli::new();
    let skipped = cli.json(&["pomodoro", "skip"]);
    assert_eq!(skipped["type"], "segment_completed");
    assert_eq!(skipped["segment"], "work");
    assert_eq!(skipped["next"], "short_break");
    assert_eq!(skipped["skipped"], true);

    let status = cli.json(&["pomodoro", "status"]);
    assert_eq!(status["segment"], "short_break");
    assert_eq!(status["value"], 300);

    let stats = cli.json(&["stats", "--json"]);
    let rows = stats.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["mode"], "pomodoro");
    assert_eq!(rows[0]["kind"], "segment_completed");
    assert_eq!(rows[0]["count"], 1);
}

#[test]
fn test_config_set_clamps_and_feeds_new_timers() {
    let cli = Cli::new();
    let (code, stdout, _) = cli.run(&["config", "set", "pomodoro.work_min", "500"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "pomodoro.work_min = 120");

    let (code, stdout, _) = cli.run(&["config", "get", "pomodoro.work_min"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "120");

    let status = cli.json(&["pomodoro", "status"]);
    assert_eq!(status["value"], 7_200);
}

#[test]
fn test_config_rejects_unknown_key() {
    let cli = Cli::new();
    let (code, _, stderr) = cli.run(&["config", "get", "ui.theme"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown configuration key"));
}

#[test]
fn test_config_list_and_reset() {
    let cli = Cli::new();
    cli.run(&["config", "set", "alerts.enabled", "false"]);
    let (_, stdout, _) = cli.run(&["config", "list"]);
    assert!(stdout.contains("alerts.enabled = false"));

    let (code, _, _) = cli.run(&["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = cli.run(&["config", "get", "alerts.enabled"]);
    assert_eq!(stdout.trim(), "true");
}

#[test]
fn test_unknown_mode_is_rejected() {
    let cli = Cli::new();
    let (code, _, _) = cli.run(&["run", "egg-timer"]);
    assert_ne!(code, 0);
}
