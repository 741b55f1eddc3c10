use cadence_core::storage::Config;
use cadence_core::{Database, EngineError, GoalType, Habit};
use chrono::Utc;
use clap::Subcommand;

use crate::common::{parse_date_arg, print_json, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        title: String,
        /// Goal kind: build (reach the target) or limit (stay under it)
        #[arg(long, default_value = "build")]
        goal: String,
        /// Daily target count
        #[arg(long)]
        target: Option<u32>,
    },
    /// Add progress for a day (defaults to logical today)
    Track {
        id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "1")]
        count: u32,
    },
    /// Overwrite a day's progress count
    Set {
        id: String,
        count: u32,
        #[arg(long)]
        date: Option<String>,
    },
    /// Skip a day (it counts toward the streak regardless of progress)
    Skip {
        id: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove a skip
    Unskip {
        id: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// List habits
    List {
        #[arg(long)]
        json: bool,
    },
    /// Delete a habit
    Delete { id: String },
}

fn resolve_date(
    raw: Option<String>,
    day_start_hour: u8,
) -> Result<chrono::NaiveDate, Box<dyn std::error::Error>> {
    match raw {
        Some(raw) => parse_date_arg(&raw, day_start_hour),
        None => Ok(cadence_core::logical_today(day_start_hour)),
    }
}

fn with_habit(
    db: &Database,
    id: &str,
    mutate: impl FnOnce(&mut Habit),
) -> Result<Habit, Box<dyn std::error::Error>> {
    let mut habits = db.load_habits()?;
    let Some(habit) = habits.iter_mut().find(|h| h.id == id) else {
        return Err(EngineError::UnknownItem { id: id.to_string() }.into());
    };
    mutate(habit);
    db.upsert_habit(habit)?;
    Ok(habit.clone())
}

pub fn run(action: HabitAction) -> CliResult {
    let db = Database::open()?;
    let cfg = Config::load_or_default();
    let hour = cfg.clock.day_start_hour;

    match action {
        HabitAction::Add {
            title,
            goal,
            target,
        } => {
            let goal_type = match goal.as_str() {
                "build" => GoalType::Build,
                "limit" => GoalType::Limit,
                other => return Err(format!("unknown goal kind '{other}'").into()),
            };
            let habit = Habit::new(title, goal_type, target.unwrap_or(cfg.habits.default_target));
            db.upsert_habit(&habit)?;
            print_json(&habit)?;
        }
        HabitAction::Track { id, date, count } => {
            let date = resolve_date(date, hour)?;
            let habit = with_habit(&db, &id, |h| h.record(date, count, Utc::now()))?;
            print_json(&habit)?;
        }
        HabitAction::Set { id, count, date } => {
            let date = resolve_date(date, hour)?;
            let habit = with_habit(&db, &id, |h| h.set_progress(date, count, Utc::now()))?;
            print_json(&habit)?;
        }
        HabitAction::Skip { id, date } => {
            let date = resolve_date(date, hour)?;
            let habit = with_habit(&db, &id, |h| h.skip(date, Utc::now()))?;
            print_json(&habit)?;
        }
        HabitAction::Unskip { id, date } => {
            let date = resolve_date(date, hour)?;
            let habit = with_habit(&db, &id, |h| h.unskip(date, Utc::now()))?;
            print_json(&habit)?;
        }
        HabitAction::List { json } => {
            let habits = db.load_habits()?;
            if json {
                print_json(&habits)?;
            } else {
                let today = cadence_core::logical_today(hour);
                for habit in &habits {
                    let mark = if habit.qualifies_on(today) { "+" } else { " " };
                    println!(
                        "[{mark}] {} {} ({}/{})",
                        habit.id,
                        habit.title,
                        habit.progress_on(today),
                        habit.target
                    );
                }
            }
        }
        HabitAction::Delete { id } => {
            if !db.delete_habit(&id)? {
                return Err(EngineError::UnknownItem { id }.into());
            }
            println!("{{\"type\": \"habit_deleted\"}}");
        }
    }

    Ok(())
}
