use clap::{Parser, Subcommand};
use multitimer_core::TimerMode;
use tracing_subscriber::EnvFilter;

mod commands;
mod notifier;

#[derive(Parser)]
#[command(name = "multitimer", version, about = "Countdown, pomodoro, interval, repeating and stopwatch timers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Single countdown
    Countdown {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Work / break cycle
    Pomodoro {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Alternating A/B segments for a number of rounds
    Interval {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// The same duration, repeated
    Repeating {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Count up with laps
    Stopwatch {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Drive a timer with a live display until it stops or Ctrl-C
    Run {
        /// countdown, pomodoro, interval, repeating or stopwatch
        mode: TimerMode,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Completion statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MULTITIMER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Countdown { action } => commands::timer::run(TimerMode::Countdown, action),
        Commands::Pomodoro { action } => commands::timer::run(TimerMode::Pomodoro, action),
        Commands::Interval { action } => commands::timer::run(TimerMode::Interval, action),
        Commands::Repeating { action } => commands::timer::run(TimerMode::Repeating, action),
        Commands::Stopwatch { action } => commands::timer::run(TimerMode::Stopwatch, action),
        Commands::Run { mode } => commands::run::run(mode),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { json } => commands::stats::run(json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
