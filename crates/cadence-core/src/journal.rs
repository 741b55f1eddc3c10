//! Journal entries and notes.
//!
//! Thin record types whose only engine-facing role is contributing
//! activity dates to the streak aggregator: a journal entry counts on the
//! logical day it was written, a note on the logical day it was last
//! touched.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::logical_date;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub body: String,
    pub logged_at: DateTime<Utc>,
}

impl JournalEntry {
    pub fn new(body: impl Into<String>) -> Self {
        JournalEntry {
            id: format!("entry-{}", uuid::Uuid::new_v4()),
            body: body.into(),
            logged_at: Utc::now(),
        }
    }

    pub fn activity_date<Tz: TimeZone>(&self, day_start_hour: u8, tz: &Tz) -> NaiveDate {
        logical_date(&self.logged_at.with_timezone(tz), day_start_hour)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Note {
            id: format!("note-{}", uuid::Uuid::new_v4()),
            title: title.into(),
            body: body.into(),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn edit(&mut self, body: impl Into<String>, now: DateTime<Utc>) {
        self.body = body.into();
        self.modified_at = now;
    }

    /// Notes count on their last-modified day, not their creation day.
    pub fn activity_date<Tz: TimeZone>(&self, day_start_hour: u8, tz: &Tz) -> NaiveDate {
        logical_date(&self.modified_at.with_timezone(tz), day_start_hour)
    }
}
