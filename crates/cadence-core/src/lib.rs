//! # Cadence Core Library
//!
//! Core business logic for Cadence, a personal productivity client. The
//! CLI binary is a thin layer over this crate; a GUI would sit on the same
//! surface.
//!
//! ## Architecture
//!
//! - **Logical Clock**: pure date arithmetic around a per-user day-start
//!   hour -- "today" does not have to begin at midnight
//! - **Recurrence Scheduler**: computes the next due date when a repeating
//!   task is completed; completion fans out a new task, never rewrites the
//!   old one
//! - **Timer Ledger**: enforces a single globally active work timer and
//!   turns start/stop into immutable session records
//! - **Streak Aggregator**: derives the consecutive-day activity streak
//!   from tasks, habits, journal entries and notes
//! - **Storage**: SQLite collections and TOML configuration; the engine
//!   itself never does I/O and always takes `now` from the caller
//!
//! ## Key Components
//!
//! - [`TimerLedger`]: single-active-timer state machine
//! - [`RecurrenceRule`] / [`next_occurrence`]: due-date advancement
//! - [`compute_streak`]: streak walk-back with a grace day
//! - [`Database`] / [`Config`]: persistence boundary

pub mod clock;
pub mod error;
pub mod events;
pub mod habit;
pub mod journal;
pub mod recurrence;
pub mod storage;
pub mod streak;
pub mod task;
pub mod timer;

pub use clock::{
    day_difference, logical_date, logical_date_offset, logical_today, reset_countdown,
};
pub use error::{ConfigError, CoreError, EngineError, StorageError};
pub use events::Event;
pub use habit::{GoalType, Habit};
pub use journal::{JournalEntry, Note};
pub use recurrence::{next_occurrence, RecurrenceRule};
pub use storage::{Config, Database};
pub use streak::{activity_dates, compute_streak, StreakState};
pub use task::{Subtask, Task};
pub use timer::{
    elapsed_display, estimated_finish_time, LedgerState, TimerLedger, TimerSession,
};
