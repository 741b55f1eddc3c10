use std::collections::BTreeSet;

use cadence_core::storage::Config;
use cadence_core::{Database, EngineError, Event, RecurrenceRule, Subtask, Task};
use chrono::Utc;
use clap::Subcommand;

use crate::common::{parse_date_arg, print_json, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        title: String,
        /// Due date: YYYY-MM-DD, today, or tomorrow
        #[arg(long)]
        due: Option<String>,
        /// Recurrence kind: daily, weekly, monthly, yearly
        #[arg(long)]
        recur: Option<String>,
        /// Recurrence interval
        #[arg(long, default_value = "1")]
        every: u32,
        /// Weekdays for weekly recurrence (comma-separated: sun,mon,...)
        #[arg(long)]
        on: Option<String>,
        /// Planned minutes
        #[arg(long)]
        planned: Option<u32>,
        /// Priority value
        #[arg(long)]
        priority: Option<i32>,
        /// Tag (repeatable)
        #[arg(long)]
        tag: Vec<String>,
        /// Subtask title (repeatable)
        #[arg(long)]
        subtask: Vec<String>,
    },
    /// List tasks
    List {
        #[arg(long)]
        json: bool,
        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },
    /// Complete a task (spawns the next occurrence for recurring tasks)
    Complete { id: String },
    /// Delete a task
    Delete { id: String },
}

fn parse_weekdays(raw: &str) -> Result<BTreeSet<u8>, Box<dyn std::error::Error>> {
    raw.split(',')
        .map(|day| match day.trim().to_lowercase().as_str() {
            "sun" | "sunday" => Ok(0),
            "mon" | "monday" => Ok(1),
            "tue" | "tuesday" => Ok(2),
            "wed" | "wednesday" => Ok(3),
            "thu" | "thursday" => Ok(4),
            "fri" | "friday" => Ok(5),
            "sat" | "saturday" => Ok(6),
            other => Err(format!("unknown weekday '{other}'").into()),
        })
        .collect()
}

fn build_rule(
    kind: &str,
    every: u32,
    on: Option<&str>,
) -> Result<RecurrenceRule, Box<dyn std::error::Error>> {
    let rule = match kind {
        "daily" => RecurrenceRule::Daily { interval: every },
        "weekly" => RecurrenceRule::Weekly {
            interval: every,
            weekdays: on.map(parse_weekdays).transpose()?.unwrap_or_default(),
        },
        "monthly" => RecurrenceRule::Monthly { interval: every },
        "yearly" => RecurrenceRule::Yearly { interval: every },
        other => return Err(format!("unknown recurrence kind '{other}'").into()),
    };
    rule.validate()?;
    Ok(rule)
}

pub fn run(action: TaskAction) -> CliResult {
    let db = Database::open()?;

    match action {
        TaskAction::Add {
            title,
            due,
            recur,
            every,
            on,
            planned,
            priority,
            tag,
            subtask,
        } => {
            let cfg = Config::load_or_default();
            let mut task = Task::new(title);
            if let Some(due) = due {
                task.due_date = Some(parse_date_arg(&due, cfg.clock.day_start_hour)?);
            }
            if let Some(kind) = recur {
                task.recurrence = Some(build_rule(&kind, every, on.as_deref())?);
            }
            task.planned_minutes = planned.or(cfg.timer.default_planned_minutes);
            task.priority = priority;
            task.tags = tag;
            task.subtasks = subtask.into_iter().map(Subtask::new).collect();
            db.upsert_task(&task)?;
            print_json(&task)?;
        }
        TaskAction::List { json, all } => {
            let mut tasks = db.load_tasks()?;
            if !all {
                tasks.retain(|t| !t.completed);
            }
            if json {
                print_json(&tasks)?;
            } else {
                for task in &tasks {
                    let mark = if task.completed { "x" } else { " " };
                    let due = task
                        .due_date
                        .map(|d| format!(" due {d}"))
                        .unwrap_or_default();
                    println!("[{mark}] {} {}{due}", task.id, task.title);
                }
            }
        }
        TaskAction::Complete { id } => {
            let mut tasks = db.load_tasks()?;
            let now = Utc::now();
            let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
                return Err(EngineError::UnknownItem { id }.into());
            };
            let next = task.complete(now)?;
            db.upsert_task(task)?;

            let mut events = vec![Event::TaskCompleted {
                task_id: id.clone(),
                at: now,
            }];
            if let Some(next_task) = next {
                db.upsert_task(&next_task)?;
                if let Some(due) = next_task.due_date {
                    events.push(Event::RecurrenceSpawned {
                        source_task_id: id.clone(),
                        new_task_id: next_task.id.clone(),
                        due_date: due,
                        at: now,
                    });
                }
            }
            print_json(&events)?;
        }
        TaskAction::Delete { id } => {
            if !db.delete_task(&id)? {
                return Err(EngineError::UnknownItem { id }.into());
            }
            println!("{{\"type\": \"task_deleted\"}}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_names_map_to_sunday_zero() {
        let days = parse_weekdays("mon,fri").unwrap();
        assert_eq!(days, BTreeSet::from([1, 5]));
        assert!(parse_weekdays("noday").is_err());
    }

    #[test]
    fn rule_builder_validates() {
        assert!(build_rule("daily", 1, None).is_ok());
        assert!(build_rule("daily", 0, None).is_err());
        assert!(build_rule("hourly", 1, None).is_err());
        let rule = build_rule("weekly", 2, Some("mon,wed")).unwrap();
        assert_eq!(
            rule,
            RecurrenceRule::Weekly {
                interval: 2,
                weekdays: BTreeSet::from([1, 3]),
            }
        );
    }
}
