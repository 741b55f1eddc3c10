use cadence_core::storage::Config;
use cadence_core::{logical_today, reset_countdown};
use chrono::Local;
use clap::Subcommand;
use serde::Serialize;

use crate::common::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ClockAction {
    /// Show the current logical date
    Today {
        #[arg(long)]
        json: bool,
    },
    /// Time remaining until the next day rollover
    Countdown {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct TodayView {
    logical_date: chrono::NaiveDate,
    day_start_hour: u8,
}

#[derive(Serialize)]
struct CountdownView {
    seconds_remaining: i64,
    day_start_hour: u8,
}

pub fn run(action: ClockAction) -> CliResult {
    let cfg = Config::load_or_default();
    let hour = cfg.clock.day_start_hour;

    match action {
        ClockAction::Today { json } => {
            let view = TodayView {
                logical_date: logical_today(hour),
                day_start_hour: hour,
            };
            if json {
                print_json(&view)?;
            } else {
                println!("{}", view.logical_date);
            }
        }
        ClockAction::Countdown { json } => {
            let remaining = reset_countdown(&Local::now(), hour);
            let view = CountdownView {
                seconds_remaining: remaining.num_seconds(),
                day_start_hour: hour,
            };
            if json {
                print_json(&view)?;
            } else {
                let secs = view.seconds_remaining;
                println!(
                    "{:02}:{:02}:{:02} until rollover",
                    secs / 3600,
                    (secs % 3600) / 60,
                    secs % 60
                );
            }
        }
    }

    Ok(())
}
