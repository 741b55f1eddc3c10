//! Habit tracking with Build/Limit goals.
//!
//! Progress is recorded against logical days (the caller resolves "today"
//! through the logical clock before recording). A date can also be
//! explicitly skipped; skipping overrides goal evaluation entirely, so a
//! rest day never breaks a streak.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether the daily target is a floor to reach or a ceiling not to exceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Success when progress reaches the target.
    Build,
    /// Success when progress stays under the target.
    Limit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub goal_type: GoalType,
    pub target: u32,
    /// Recorded progress per logical day.
    #[serde(default)]
    pub progress: BTreeMap<NaiveDate, u32>,
    /// Days the user explicitly opted out of evaluation.
    #[serde(default)]
    pub skipped: BTreeSet<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(title: impl Into<String>, goal_type: GoalType, target: u32) -> Self {
        let now = Utc::now();
        Habit {
            id: format!("habit-{}", uuid::Uuid::new_v4()),
            title: title.into(),
            goal_type,
            target,
            progress: BTreeMap::new(),
            skipped: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add `delta` to the day's progress count.
    pub fn record(&mut self, date: NaiveDate, delta: u32, now: DateTime<Utc>) {
        *self.progress.entry(date).or_insert(0) += delta;
        self.updated_at = now;
    }

    /// Overwrite the day's progress count.
    pub fn set_progress(&mut self, date: NaiveDate, count: u32, now: DateTime<Utc>) {
        self.progress.insert(date, count);
        self.updated_at = now;
    }

    pub fn skip(&mut self, date: NaiveDate, now: DateTime<Utc>) {
        self.skipped.insert(date);
        self.updated_at = now;
    }

    pub fn unskip(&mut self, date: NaiveDate, now: DateTime<Utc>) {
        self.skipped.remove(&date);
        self.updated_at = now;
    }

    pub fn progress_on(&self, date: NaiveDate) -> u32 {
        self.progress.get(&date).copied().unwrap_or(0)
    }

    /// Whether the date counts as a success for this habit.
    ///
    /// A skipped date always qualifies. Otherwise only recorded days are
    /// evaluated: Build succeeds at or above target, Limit strictly below
    /// it. Days with nothing recorded never qualify, even for Limit goals
    /// -- silence is not success.
    pub fn qualifies_on(&self, date: NaiveDate) -> bool {
        if self.skipped.contains(&date) {
            return true;
        }
        match self.progress.get(&date) {
            None => false,
            Some(count) => match self.goal_type {
                GoalType::Build => *count >= self.target,
                GoalType::Limit => *count < self.target,
            },
        }
    }

    /// Logical dates on which this habit counts as activity: qualifying
    /// recorded days plus every skipped day.
    pub fn activity_dates(&self) -> BTreeSet<NaiveDate> {
        let mut dates: BTreeSet<NaiveDate> = self
            .progress
            .keys()
            .copied()
            .filter(|date| self.qualifies_on(*date))
            .collect();
        dates.extend(self.skipped.iter().copied());
        dates
    }
}
