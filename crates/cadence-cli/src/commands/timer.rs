use cadence_core::{
    elapsed_display, estimated_finish_time, Database, EngineError, LedgerState, TimerLedger,
};
use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;

use crate::common::{print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start tracking a task (stops any other running timer)
    Start { id: String },
    /// Stop the running timer (optionally naming the task)
    Stop { id: Option<String> },
    /// Show the running timer with live elapsed time
    Status {
        #[arg(long)]
        json: bool,
    },
    /// List timer sessions
    Sessions {
        #[arg(long)]
        json: bool,
        /// Only sessions for this task
        #[arg(long)]
        item: Option<String>,
    },
    /// Delete a session, compensating the task's accumulated minutes
    DeleteSession { id: String },
}

#[derive(Serialize)]
struct TimerStatus {
    state: String,
    item_id: Option<String>,
    title: Option<String>,
    elapsed_seconds: Option<u64>,
    estimated_finish: Option<chrono::DateTime<Utc>>,
}

pub fn run(action: TimerAction) -> CliResult {
    let db = Database::open()?;
    let mut tasks = db.load_tasks()?;
    let mut sessions = db.load_sessions()?;

    let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
    for note in ledger.repair() {
        tracing::warn!("repaired timer state: {note}");
    }

    match action {
        TimerAction::Start { id } => {
            let events = ledger.start(&id, Utc::now())?;
            drop(ledger);
            persist(&db, &tasks, &sessions)?;
            print_json(&events)?;
        }
        TimerAction::Stop { id } => {
            let target = match id {
                Some(id) => id,
                None => match ledger.state() {
                    LedgerState::Running(id) => id,
                    LedgerState::Idle => {
                        return Err(EngineError::InvalidTimerTransition {
                            message: "no timer is running".into(),
                        }
                        .into())
                    }
                },
            };
            let event = ledger.stop(&target, Utc::now())?;
            drop(ledger);
            persist(&db, &tasks, &sessions)?;
            print_json(&event)?;
        }
        TimerAction::Status { json } => {
            let state = ledger.state();
            drop(ledger);
            persist(&db, &tasks, &sessions)?;

            let now = Utc::now();
            let status = match state {
                LedgerState::Running(id) => {
                    let task = tasks.iter().find(|t| t.id == id);
                    TimerStatus {
                        state: "running".into(),
                        title: task.map(|t| t.title.clone()),
                        elapsed_seconds: task.map(|t| elapsed_display(t, now)),
                        estimated_finish: task.and_then(|t| estimated_finish_time(t, now)),
                        item_id: Some(id),
                    }
                }
                LedgerState::Idle => TimerStatus {
                    state: "idle".into(),
                    item_id: None,
                    title: None,
                    elapsed_seconds: None,
                    estimated_finish: None,
                },
            };
            if json {
                print_json(&status)?;
            } else {
                match &status.item_id {
                    Some(id) => println!(
                        "running {id} ({}s elapsed)",
                        status.elapsed_seconds.unwrap_or(0)
                    ),
                    None => println!("idle"),
                }
            }
        }
        TimerAction::Sessions { json, item } => {
            drop(ledger);
            persist(&db, &tasks, &sessions)?;
            let mut listed = sessions.clone();
            if let Some(item) = item {
                listed.retain(|s| s.item_id == item);
            }
            if json {
                print_json(&listed)?;
            } else {
                for session in &listed {
                    let state = if session.is_open() {
                        "open".to_string()
                    } else {
                        format!("{}s", session.duration_seconds.unwrap_or(0))
                    };
                    println!("{} {} {}", session.id, session.item_id, state);
                }
            }
        }
        TimerAction::DeleteSession { id } => {
            let event = ledger.delete_session(&id, Utc::now())?;
            drop(ledger);
            persist(&db, &tasks, &sessions)?;
            db.delete_session(&id)?;
            print_json(&event)?;
        }
    }

    Ok(())
}

/// Write back every task and surviving session; the ledger mutates in
/// place, so upserting the whole (small) collections keeps the database
/// consistent with what the engine returned.
fn persist(
    db: &Database,
    tasks: &[cadence_core::Task],
    sessions: &[cadence_core::TimerSession],
) -> CliResult {
    for task in tasks {
        db.upsert_task(task)?;
    }
    for session in sessions {
        db.upsert_session(session)?;
    }
    Ok(())
}
