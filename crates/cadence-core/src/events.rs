use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the engine produces an Event.
///
/// The CLI prints them; the storage layer persists the entities they
/// describe. Timestamps are caller-supplied so the engine stays pure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        item_id: String,
        session_id: String,
        at: DateTime<Utc>,
    },
    TimerStopped {
        item_id: String,
        session_id: String,
        duration_seconds: u64,
        at: DateTime<Utc>,
    },
    /// A session was removed; `was_open` distinguishes a detached live timer
    /// from a closed record whose minutes were compensated.
    SessionDeleted {
        session_id: String,
        item_id: String,
        was_open: bool,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        at: DateTime<Utc>,
    },
    /// Completing a recurring task synthesized its next occurrence.
    RecurrenceSpawned {
        source_task_id: String,
        new_task_id: String,
        due_date: NaiveDate,
        at: DateTime<Utc>,
    },
}
