//! Task types and the recurrence fan-out choke point.
//!
//! A [`Task`] is anything trackable: it can carry a due date, a recurrence
//! rule, a planned duration, and accumulated timer minutes. Completing a
//! recurring task never rewrites its due date -- it emits a brand-new
//! sibling task (see [`Task::complete`]), so the completed record survives
//! for history and for the streak aggregator.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::logical_date;
use crate::error::EngineError;
use crate::recurrence::{next_occurrence, RecurrenceRule};

/// A checklist line under a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Subtask {
            id: format!("sub-{}", uuid::Uuid::new_v4()),
            title: title.into(),
            completed: false,
        }
    }

    /// Fresh-identity, incomplete copy used when a recurring task spawns
    /// its successor.
    fn as_template(&self) -> Self {
        Subtask::new(self.title.clone())
    }
}

/// A trackable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Task title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,
    /// Priority value (null for default priority)
    pub priority: Option<i32>,
    /// Logical due date (no time component)
    pub due_date: Option<NaiveDate>,
    /// Whether the task is completed
    pub completed: bool,
    /// Recurrence rule, if the task repeats
    pub recurrence: Option<RecurrenceRule>,
    /// Planned duration in minutes
    pub planned_minutes: Option<u32>,
    /// Minutes accumulated from closed timer sessions
    #[serde(default)]
    pub accumulated_minutes: f64,
    /// Set while this task owns the open timer
    pub active_timer_started_at: Option<DateTime<Utc>>,
    /// Checklist
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp (null if not completed)
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new task with default values.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Task {
            id: format!("task-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            title: title.into(),
            description: None,
            tags: Vec::new(),
            priority: None,
            due_date: None,
            completed: false,
            recurrence: None,
            planned_minutes: None,
            accumulated_minutes: 0.0,
            active_timer_started_at: None,
            subtasks: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Mark the task complete; for a recurring task with a due date,
    /// synthesize its next occurrence as a new task.
    ///
    /// The sibling copies title, description, tags, priority, planned
    /// minutes and the rule itself; subtasks come back incomplete with
    /// fresh identities, and time accounting starts from zero. Completing
    /// an already-completed task is rejected without touching the record,
    /// so a double-submitted completion cannot spawn twice.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<Option<Task>, EngineError> {
        if self.completed {
            return Err(EngineError::InvalidCompletion {
                id: self.id.clone(),
            });
        }
        // Compute the next due date before mutating anything, so an invalid
        // rule leaves the task untouched.
        let next_due = match (self.recurrence.as_ref(), self.due_date) {
            (Some(rule), Some(due)) => Some(next_occurrence(due, rule)?),
            _ => None,
        };

        self.completed = true;
        self.completed_at = Some(now);
        self.updated_at = now;

        Ok(next_due.map(|due| {
            let mut next = Task::new(self.title.clone());
            next.description = self.description.clone();
            next.tags = self.tags.clone();
            next.priority = self.priority;
            next.planned_minutes = self.planned_minutes;
            next.recurrence = self.recurrence.clone();
            next.subtasks = self.subtasks.iter().map(Subtask::as_template).collect();
            next.due_date = Some(due);
            next
        }))
    }

    /// Logical dates on which this task counts as activity: its creation
    /// date always, plus its completion date once completed (falling back
    /// to the last-modified date for records without an explicit
    /// completion timestamp).
    pub fn activity_dates<Tz: TimeZone>(&self, day_start_hour: u8, tz: &Tz) -> Vec<NaiveDate> {
        let mut dates = vec![logical_date(&self.created_at.with_timezone(tz), day_start_hour)];
        if self.completed {
            let done = self.completed_at.unwrap_or(self.updated_at);
            dates.push(logical_date(&done.with_timezone(tz), day_start_hour));
        }
        dates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn task_creation() {
        let task = Task::new("Write report");
        assert_eq!(task.title, "Write report");
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert!(task.active_timer_started_at.is_none());
        assert_eq!(task.accumulated_minutes, 0.0);
    }

    #[test]
    fn completing_plain_task_spawns_nothing() {
        let mut task = Task::new("One-off");
        let next = task.complete(Utc::now()).unwrap();
        assert!(next.is_none());
        assert!(task.completed);
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn completing_recurring_task_spawns_sibling() {
        let mut task = Task::new("Water plants");
        task.due_date = Some(date(2024, 1, 5));
        task.recurrence = Some(RecurrenceRule::Daily { interval: 2 });
        task.tags = vec!["home".into()];
        task.priority = Some(70);
        task.planned_minutes = Some(10);
        task.subtasks = vec![{
            let mut s = Subtask::new("front room");
            s.completed = true;
            s
        }];

        let next = task.complete(Utc::now()).unwrap().expect("sibling");

        // Original is completed and untouched otherwise.
        assert!(task.completed);
        assert_eq!(task.due_date, Some(date(2024, 1, 5)));

        // Sibling: fresh identity, advanced due date, reset checklist.
        assert_ne!(next.id, task.id);
        assert_eq!(next.due_date, Some(date(2024, 1, 7)));
        assert_eq!(next.title, task.title);
        assert_eq!(next.tags, task.tags);
        assert_eq!(next.priority, Some(70));
        assert_eq!(next.planned_minutes, Some(10));
        assert_eq!(next.recurrence, task.recurrence);
        assert!(!next.completed);
        assert_eq!(next.accumulated_minutes, 0.0);
        assert!(next.active_timer_started_at.is_none());
        assert_eq!(next.subtasks.len(), 1);
        assert!(!next.subtasks[0].completed);
        assert_ne!(next.subtasks[0].id, task.subtasks[0].id);
    }

    #[test]
    fn double_completion_is_rejected_without_respawn() {
        let mut task = Task::new("Weekly review");
        task.due_date = Some(date(2024, 1, 5));
        task.recurrence = Some(RecurrenceRule::Weekly {
            interval: 1,
            weekdays: BTreeSet::new(),
        });
        let first = task.complete(Utc::now()).unwrap();
        assert!(first.is_some());

        let second = task.complete(Utc::now());
        assert!(matches!(
            second,
            Err(EngineError::InvalidCompletion { .. })
        ));
        assert!(task.completed);
    }

    #[test]
    fn invalid_rule_leaves_task_untouched() {
        let mut task = Task::new("Broken");
        task.due_date = Some(date(2024, 1, 5));
        task.recurrence = Some(RecurrenceRule::Daily { interval: 0 });
        assert!(task.complete(Utc::now()).is_err());
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn activity_includes_completion_date() {
        let mut task = Task::new("Task");
        let dates = task.activity_dates(0, &Utc);
        assert_eq!(dates.len(), 1);

        task.complete(Utc::now()).unwrap();
        let dates = task.activity_dates(0, &Utc);
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn task_serialization_round_trips() {
        let mut task = Task::new("Ship release");
        task.due_date = Some(date(2024, 6, 1));
        task.recurrence = Some(RecurrenceRule::Monthly { interval: 1 });
        task.subtasks = vec![Subtask::new("changelog")];

        let json = serde_json::to_string(&task).unwrap();
        let decoded: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.id, task.id);
        assert_eq!(decoded.due_date, task.due_date);
        assert_eq!(decoded.recurrence, task.recurrence);
        assert_eq!(decoded.subtasks.len(), 1);
    }
}
