use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "cadence", version, about = "Cadence personal productivity CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Work timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Habit tracking
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Journal entries
    Journal {
        #[command(subcommand)]
        action: commands::journal::JournalAction,
    },
    /// Notes
    Note {
        #[command(subcommand)]
        action: commands::note::NoteAction,
    },
    /// Activity streak
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Logical day inspection
    Clock {
        #[command(subcommand)]
        action: commands::clock::ClockAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Journal { action } => commands::journal::run(action),
        Commands::Note { action } => commands::note::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Clock { action } => commands::clock::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
