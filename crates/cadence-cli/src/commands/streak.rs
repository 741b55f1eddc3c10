use cadence_core::storage::Config;
use cadence_core::{activity_dates, compute_streak, logical_date_offset, logical_today, Database};
use chrono::Local;
use clap::Subcommand;

use crate::common::{print_json, CliResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show the current activity streak
    Show {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StreakAction) -> CliResult {
    let db = Database::open()?;
    let cfg = Config::load_or_default();
    let hour = cfg.clock.day_start_hour;

    match action {
        StreakAction::Show { json } => {
            let tasks = db.load_tasks()?;
            let habits = db.load_habits()?;
            let entries = db.load_journal_entries()?;
            let notes = db.load_notes()?;

            let activity = activity_dates(&tasks, &habits, &entries, &notes, hour, &Local);
            let state = compute_streak(
                &activity,
                logical_today(hour),
                logical_date_offset(-1, hour),
            );

            if json {
                print_json(&state)?;
            } else {
                println!(
                    "Current streak: {} day{} (active today: {})",
                    state.current_count,
                    if state.current_count == 1 { "" } else { "s" },
                    if state.active_today { "yes" } else { "no" }
                );
                for day in &state.history {
                    println!("  {day}");
                }
            }
        }
    }

    Ok(())
}
