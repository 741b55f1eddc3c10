//! Single-active-timer ledger.
//!
//! The ledger borrows the caller's collections for the duration of one
//! operation and never performs I/O -- the caller persists what changed.
//! Timestamps are always supplied explicitly so operations are
//! deterministic and testable.
//!
//! Starting a timer on one item while another is running stops the other
//! first (auto-switch); starting the item that is already running is a
//! no-op, so a rapid double-click cannot double-open a session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::events::Event;
use crate::task::Task;

/// One contiguous tracked interval. Immutable once closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSession {
    pub id: String,
    pub item_id: String,
    pub started_at: DateTime<Utc>,
    /// None while the session is open.
    pub ended_at: Option<DateTime<Utc>>,
    /// Whole seconds, set exactly when the session closes.
    pub duration_seconds: Option<u64>,
}

impl TimerSession {
    fn open(item_id: &str, now: DateTime<Utc>) -> Self {
        TimerSession {
            id: format!("session-{}", uuid::Uuid::new_v4()),
            item_id: item_id.to_string(),
            started_at: now,
            ended_at: None,
            duration_seconds: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Per-user timer state, derived from the collections on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerState {
    Idle,
    Running(String),
}

/// Arbiter of the single-active-timer invariant.
pub struct TimerLedger<'a> {
    tasks: &'a mut Vec<Task>,
    sessions: &'a mut Vec<TimerSession>,
}

impl<'a> TimerLedger<'a> {
    pub fn new(tasks: &'a mut Vec<Task>, sessions: &'a mut Vec<TimerSession>) -> Self {
        Self { tasks, sessions }
    }

    /// Current state: `Running(id)` iff some task carries the running
    /// marker.
    pub fn state(&self) -> LedgerState {
        match self
            .tasks
            .iter()
            .find(|t| t.active_timer_started_at.is_some())
        {
            Some(task) => LedgerState::Running(task.id.clone()),
            None => LedgerState::Idle,
        }
    }

    /// Start tracking `item_id`.
    ///
    /// Stops any other running item first and returns the events in
    /// order (`TimerStopped` then `TimerStarted`). Starting the item that
    /// is already running returns no events.
    pub fn start(
        &mut self,
        item_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, EngineError> {
        if !self.tasks.iter().any(|t| t.id == item_id) {
            return Err(EngineError::UnknownItem {
                id: item_id.to_string(),
            });
        }

        let mut events = Vec::new();
        match self.state() {
            LedgerState::Running(ref running) if running == item_id => {
                debug!(item_id, "timer already running, start is a no-op");
                return Ok(events);
            }
            LedgerState::Running(running) => {
                events.push(self.stop(&running, now)?);
            }
            LedgerState::Idle => {}
        }

        let session = TimerSession::open(item_id, now);
        let session_id = session.id.clone();
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == item_id) {
            task.active_timer_started_at = Some(now);
            task.updated_at = now;
        }
        self.sessions.push(session);
        debug!(item_id, %session_id, "timer started");
        events.push(Event::TimerStarted {
            item_id: item_id.to_string(),
            session_id,
            at: now,
        });
        Ok(events)
    }

    /// Stop tracking `item_id`, closing its open session and folding the
    /// elapsed time into the item's accumulated minutes.
    ///
    /// Negative elapsed time (clock skew) clamps to zero.
    pub fn stop(&mut self, item_id: &str, now: DateTime<Utc>) -> Result<Event, EngineError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == item_id) else {
            return Err(EngineError::UnknownItem {
                id: item_id.to_string(),
            });
        };
        let Some(started_at) = task.active_timer_started_at else {
            return Err(EngineError::InvalidTimerTransition {
                message: format!("no timer running for item {item_id}"),
            });
        };
        let Some(session) = self
            .sessions
            .iter_mut()
            .find(|s| s.item_id == item_id && s.is_open())
        else {
            return Err(EngineError::InvalidTimerTransition {
                message: format!("no open session for item {item_id}"),
            });
        };

        let elapsed = (now - started_at).num_seconds().max(0) as u64;
        task.accumulated_minutes += elapsed as f64 / 60.0;
        task.active_timer_started_at = None;
        task.updated_at = now;
        session.ended_at = Some(now);
        session.duration_seconds = Some(elapsed);
        debug!(item_id, elapsed, "timer stopped");
        Ok(Event::TimerStopped {
            item_id: item_id.to_string(),
            session_id: session.id.clone(),
            duration_seconds: elapsed,
            at: now,
        })
    }

    /// Delete a session by id.
    ///
    /// Deleting the open session detaches the owning item's timer (the
    /// timer lost its backing record; no minutes were ever added, so none
    /// are removed). Deleting a closed session subtracts its contribution
    /// from the item's accumulated minutes, never below zero. The item
    /// having been deleted already is not an error.
    pub fn delete_session(
        &mut self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Event, EngineError> {
        let Some(pos) = self.sessions.iter().position(|s| s.id == session_id) else {
            return Err(EngineError::UnknownSession {
                id: session_id.to_string(),
            });
        };
        let session = self.sessions.remove(pos);
        let was_open = session.is_open();
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == session.item_id) {
            if was_open {
                task.active_timer_started_at = None;
            } else if let Some(secs) = session.duration_seconds {
                task.accumulated_minutes =
                    (task.accumulated_minutes - secs as f64 / 60.0).max(0.0);
            }
            task.updated_at = now;
        }
        debug!(%session_id, was_open, "session deleted");
        Ok(Event::SessionDeleted {
            session_id: session.id,
            item_id: session.item_id,
            was_open,
            at: now,
        })
    }

    /// Restore the single-active-timer invariant on freshly loaded data.
    ///
    /// The only valid running shape is exactly one marked task matching
    /// exactly one open session. Anything else resolves toward `Idle`:
    /// every marker is cleared and every open session dropped, and the
    /// returned notes describe what was detached so the caller can log
    /// them. Valid state returns an empty list and changes nothing.
    pub fn repair(&mut self) -> Vec<String> {
        let marked: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| t.active_timer_started_at.is_some())
            .map(|t| t.id.clone())
            .collect();
        let open: Vec<String> = self
            .sessions
            .iter()
            .filter(|s| s.is_open())
            .map(|s| s.item_id.clone())
            .collect();

        let valid = match (&marked[..], &open[..]) {
            ([], []) => true,
            ([m], [o]) => m == o,
            _ => false,
        };
        if valid {
            return Vec::new();
        }

        let mut repairs = Vec::new();
        for task in self.tasks.iter_mut() {
            if task.active_timer_started_at.take().is_some() {
                repairs.push(format!("cleared running marker on {}", task.id));
            }
        }
        self.sessions.retain(|s| {
            if s.is_open() {
                repairs.push(format!(
                    "dropped unmatched open session {} for item {}",
                    s.id, s.item_id
                ));
                false
            } else {
                true
            }
        });
        for note in &repairs {
            warn!("{note}");
        }
        repairs
    }
}

/// Live elapsed seconds for display: accumulated minutes plus the running
/// interval, if any. Pure read, safe to call every second.
pub fn elapsed_display(task: &Task, now: DateTime<Utc>) -> u64 {
    let base = (task.accumulated_minutes * 60.0).floor().max(0.0) as u64;
    let live = task
        .active_timer_started_at
        .map(|started| (now - started).num_seconds().max(0) as u64)
        .unwrap_or(0);
    base + live
}

/// Projected completion instant, when the task has a planned duration.
pub fn estimated_finish_time(task: &Task, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let planned_secs = u64::from(task.planned_minutes?) * 60;
    let remaining = planned_secs.saturating_sub(elapsed_display(task, now));
    Some(now + Duration::seconds(remaining as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
    }

    fn fixtures() -> (Vec<Task>, Vec<TimerSession>) {
        let mut a = Task::new("A");
        a.id = "a".into();
        let mut b = Task::new("B");
        b.id = "b".into();
        (vec![a, b], Vec::new())
    }

    fn assert_invariant(tasks: &[Task], sessions: &[TimerSession]) {
        let marked: Vec<_> = tasks
            .iter()
            .filter(|t| t.active_timer_started_at.is_some())
            .collect();
        let open: Vec<_> = sessions.iter().filter(|s| s.is_open()).collect();
        assert!(marked.len() <= 1, "more than one running marker");
        assert_eq!(marked.len(), open.len());
        if let (Some(task), Some(session)) = (marked.first(), open.first()) {
            assert_eq!(task.id, session.item_id);
        }
    }

    #[test]
    fn start_opens_session_and_marks_item() {
        let (mut tasks, mut sessions) = fixtures();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        let events = ledger.start("a", t0()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(ledger.state(), LedgerState::Running("a".into()));
        assert_invariant(&tasks, &sessions);
    }

    #[test]
    fn start_unknown_item_fails() {
        let (mut tasks, mut sessions) = fixtures();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        assert!(matches!(
            ledger.start("nope", t0()),
            Err(EngineError::UnknownItem { .. })
        ));
        assert_eq!(ledger.state(), LedgerState::Idle);
    }

    #[test]
    fn double_start_same_item_is_noop() {
        let (mut tasks, mut sessions) = fixtures();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        ledger.start("a", t0()).unwrap();
        let events = ledger.start("a", t0() + Duration::seconds(1)).unwrap();
        assert!(events.is_empty());
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn auto_switch_closes_previous_session() {
        // start(A, t0); start(B, t0+60s) => A closed with 60s, A += 1
        // minute, B open.
        let (mut tasks, mut sessions) = fixtures();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        ledger.start("a", t0()).unwrap();
        let events = ledger.start("b", t0() + Duration::seconds(60)).unwrap();

        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            Event::TimerStopped { item_id, duration_seconds: 60, .. } if item_id == "a"
        ));
        assert!(matches!(
            &events[1],
            Event::TimerStarted { item_id, .. } if item_id == "b"
        ));

        let a = tasks.iter().find(|t| t.id == "a").unwrap();
        assert_eq!(a.accumulated_minutes, 1.0);
        assert!(a.active_timer_started_at.is_none());
        assert_eq!(
            TimerLedger::new(&mut tasks, &mut sessions).state(),
            LedgerState::Running("b".into())
        );
        assert_invariant(&tasks, &sessions);
    }

    #[test]
    fn stop_idle_item_fails() {
        let (mut tasks, mut sessions) = fixtures();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        assert!(matches!(
            ledger.stop("a", t0()),
            Err(EngineError::InvalidTimerTransition { .. })
        ));
    }

    #[test]
    fn clock_skew_clamps_to_zero() {
        let (mut tasks, mut sessions) = fixtures();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        ledger.start("a", t0()).unwrap();
        // Stop "before" the start.
        let event = ledger.stop("a", t0() - Duration::seconds(30)).unwrap();
        assert!(matches!(
            event,
            Event::TimerStopped { duration_seconds: 0, .. }
        ));
        assert_eq!(tasks[0].accumulated_minutes, 0.0);
    }

    #[test]
    fn delete_open_session_detaches_timer() {
        let (mut tasks, mut sessions) = fixtures();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        ledger.start("a", t0()).unwrap();
        let session_id = sessions[0].id.clone();

        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        let event = ledger
            .delete_session(&session_id, t0() + Duration::seconds(10))
            .unwrap();
        assert!(matches!(event, Event::SessionDeleted { was_open: true, .. }));
        assert_eq!(ledger.state(), LedgerState::Idle);
        // No minutes were ever added, none removed.
        assert_eq!(tasks[0].accumulated_minutes, 0.0);
        assert!(sessions.is_empty());
    }

    #[test]
    fn delete_closed_session_compensates_minutes() {
        let (mut tasks, mut sessions) = fixtures();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        ledger.start("a", t0()).unwrap();
        ledger.stop("a", t0() + Duration::seconds(120)).unwrap();
        assert_eq!(tasks[0].accumulated_minutes, 2.0);

        let session_id = sessions[0].id.clone();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        ledger
            .delete_session(&session_id, t0() + Duration::seconds(180))
            .unwrap();
        assert_eq!(tasks[0].accumulated_minutes, 0.0);
    }

    #[test]
    fn delete_never_drives_minutes_negative() {
        let (mut tasks, mut sessions) = fixtures();
        sessions.push(TimerSession {
            id: "s1".into(),
            item_id: "a".into(),
            started_at: t0(),
            ended_at: Some(t0() + Duration::seconds(600)),
            duration_seconds: Some(600),
        });
        // Item only has 1 accumulated minute; session claims 10.
        tasks[0].accumulated_minutes = 1.0;
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        ledger.delete_session("s1", t0()).unwrap();
        assert_eq!(tasks[0].accumulated_minutes, 0.0);
    }

    #[test]
    fn delete_unknown_session_fails() {
        let (mut tasks, mut sessions) = fixtures();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        assert!(matches!(
            ledger.delete_session("nope", t0()),
            Err(EngineError::UnknownSession { .. })
        ));
    }

    #[test]
    fn delete_session_for_missing_item_still_deletes() {
        let (mut tasks, mut sessions) = fixtures();
        sessions.push(TimerSession {
            id: "s1".into(),
            item_id: "gone".into(),
            started_at: t0(),
            ended_at: Some(t0() + Duration::seconds(60)),
            duration_seconds: Some(60),
        });
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        ledger.delete_session("s1", t0()).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn invariant_holds_across_operation_sequences() {
        let (mut tasks, mut sessions) = fixtures();
        let mut c = Task::new("C");
        c.id = "c".into();
        tasks.push(c);

        let steps: &[(&str, &str)] = &[
            ("start", "a"),
            ("start", "b"),
            ("stop", "b"),
            ("start", "c"),
            ("start", "a"),
            ("stop", "a"),
            ("start", "b"),
        ];
        let mut now = t0();
        for (op, id) in steps {
            now += Duration::seconds(37);
            let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
            match *op {
                "start" => {
                    ledger.start(id, now).unwrap();
                }
                _ => {
                    ledger.stop(id, now).unwrap();
                }
            }
            assert_invariant(&tasks, &sessions);
        }
    }

    #[test]
    fn elapsed_display_counts_live_interval() {
        let mut task = Task::new("A");
        task.accumulated_minutes = 2.0;
        assert_eq!(elapsed_display(&task, t0()), 120);

        task.active_timer_started_at = Some(t0());
        assert_eq!(elapsed_display(&task, t0() + Duration::seconds(45)), 165);
    }

    #[test]
    fn estimated_finish_uses_remaining_plan() {
        let mut task = Task::new("A");
        task.planned_minutes = Some(10);
        task.accumulated_minutes = 4.0;
        let finish = estimated_finish_time(&task, t0()).unwrap();
        assert_eq!(finish, t0() + Duration::seconds(6 * 60));

        // Overrun plans finish "now".
        task.accumulated_minutes = 30.0;
        assert_eq!(estimated_finish_time(&task, t0()).unwrap(), t0());

        task.planned_minutes = None;
        assert!(estimated_finish_time(&task, t0()).is_none());
    }

    #[test]
    fn repair_resolves_ambiguity_toward_idle() {
        let (mut tasks, mut sessions) = fixtures();
        // Two items marked running, one stray open session.
        tasks[0].active_timer_started_at = Some(t0());
        tasks[1].active_timer_started_at = Some(t0());
        sessions.push(TimerSession {
            id: "s1".into(),
            item_id: "a".into(),
            started_at: t0(),
            ended_at: None,
            duration_seconds: None,
        });

        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        let repairs = ledger.repair();
        assert_eq!(ledger.state(), LedgerState::Idle);
        assert_eq!(repairs.len(), 3);
        assert!(sessions.iter().all(|s| !s.is_open()));
    }

    #[test]
    fn repair_leaves_valid_state_alone() {
        let (mut tasks, mut sessions) = fixtures();
        let mut ledger = TimerLedger::new(&mut tasks, &mut sessions);
        ledger.start("a", t0()).unwrap();
        let repairs = ledger.repair();
        assert!(repairs.is_empty());
        assert_eq!(ledger.state(), LedgerState::Running("a".into()));
    }
}
