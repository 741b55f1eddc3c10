//! Cross-domain activity streak.
//!
//! The streak is a pure view: it is recomputed on demand from the full
//! activity set and never persisted, so it cannot go stale. Each source
//! kind owns its own inclusion rule (task creation/completion, habit
//! success/skip, journal entry, note edit); this module only unions the
//! dates and walks the run.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::habit::Habit;
use crate::journal::{JournalEntry, Note};
use crate::task::Task;

/// Derived streak view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive logical days with activity, anchored at today or
    /// yesterday.
    pub current_count: u32,
    /// Whether today itself has activity.
    pub active_today: bool,
    /// Every distinct activity date, most recent first.
    pub history: Vec<NaiveDate>,
}

/// Union of activity dates across all sources, each derived with its own
/// rule.
pub fn activity_dates<Tz: TimeZone>(
    tasks: &[Task],
    habits: &[Habit],
    entries: &[JournalEntry],
    notes: &[Note],
    day_start_hour: u8,
    tz: &Tz,
) -> BTreeSet<NaiveDate> {
    let mut dates = BTreeSet::new();
    for task in tasks {
        dates.extend(task.activity_dates(day_start_hour, tz));
    }
    for habit in habits {
        dates.extend(habit.activity_dates());
    }
    for entry in entries {
        dates.insert(entry.activity_date(day_start_hour, tz));
    }
    for note in notes {
        dates.insert(note.activity_date(day_start_hour, tz));
    }
    dates
}

/// Walk the streak backward from its anchor.
///
/// The anchor is today when today has activity, else yesterday (the grace
/// day: a streak does not break just because the user has not acted yet
/// today). No anchor means a zero streak.
pub fn compute_streak(
    activity: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    yesterday: NaiveDate,
) -> StreakState {
    let active_today = activity.contains(&today);
    let anchor = if active_today {
        Some(today)
    } else if activity.contains(&yesterday) {
        Some(yesterday)
    } else {
        None
    };

    let mut current_count = 0;
    if let Some(anchor) = anchor {
        let mut day = anchor;
        while activity.contains(&day) {
            current_count += 1;
            day -= Duration::days(1);
        }
    }

    StreakState {
        current_count,
        active_today,
        history: activity.iter().rev().copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::GoalType;
    use chrono::Utc;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn set(days: &[u32]) -> BTreeSet<NaiveDate> {
        days.iter().map(|d| date(*d)).collect()
    }

    #[test]
    fn empty_activity_is_zero_streak() {
        let state = compute_streak(&BTreeSet::new(), date(10), date(9));
        assert_eq!(state.current_count, 0);
        assert!(!state.active_today);
        assert!(state.history.is_empty());
    }

    #[test]
    fn walks_back_from_today() {
        let state = compute_streak(&set(&[7, 8, 9, 10]), date(10), date(9));
        assert_eq!(state.current_count, 4);
        assert!(state.active_today);
    }

    #[test]
    fn yesterday_is_a_grace_day() {
        // Nothing yet today; the run ending yesterday still counts.
        let state = compute_streak(&set(&[7, 8, 9]), date(10), date(9));
        assert_eq!(state.current_count, 3);
        assert!(!state.active_today);
    }

    #[test]
    fn gap_before_yesterday_breaks_streak() {
        let state = compute_streak(&set(&[6, 7]), date(10), date(9));
        assert_eq!(state.current_count, 0);
        assert!(!state.active_today);
        // History still lists the old activity.
        assert_eq!(state.history, vec![date(7), date(6)]);
    }

    #[test]
    fn stops_at_first_gap() {
        let state = compute_streak(&set(&[5, 6, 8, 9, 10]), date(10), date(9));
        assert_eq!(state.current_count, 3);
    }

    #[test]
    fn history_is_descending() {
        let state = compute_streak(&set(&[3, 10, 7]), date(10), date(9));
        assert_eq!(state.history, vec![date(10), date(7), date(3)]);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let activity = set(&[8, 9, 10]);
        let a = compute_streak(&activity, date(10), date(9));
        let b = compute_streak(&activity, date(10), date(9));
        assert_eq!(a, b);
    }

    #[test]
    fn unions_all_source_kinds() {
        let mut task = Task::new("t");
        task.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        task.updated_at = task.created_at;

        let mut habit = Habit::new("h", GoalType::Build, 1);
        habit.record(date(2), 1, Utc::now());

        let mut entry = JournalEntry::new("j");
        entry.logged_at = Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap();

        let mut note = Note::new("n", "");
        note.modified_at = Utc.with_ymd_and_hms(2024, 5, 4, 12, 0, 0).unwrap();

        let dates = activity_dates(&[task], &[habit], &[entry], &[note], 0, &Utc);
        assert!(dates.contains(&date(1)));
        assert!(dates.contains(&date(2)));
        assert!(dates.contains(&date(3)));
        assert!(dates.contains(&date(4)));
    }
}
