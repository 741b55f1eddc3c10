//! Recurring due-date scheduling.
//!
//! [`next_occurrence`] computes where a recurring task's due date advances
//! to when it is completed. All arithmetic happens in date-only space
//! (no time component), so results cannot drift across timezone shifts.
//!
//! The rule never fires "in place": the result is always strictly after the
//! previous due date, and repeated application increases without bound.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// How a repeating item's due date advances.
///
/// Weekdays are numbered 0 = Sunday .. 6 = Saturday. An empty weekday set
/// on a weekly rule defaults to the weekday of the date being advanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecurrenceRule {
    Daily {
        interval: u32,
    },
    Weekly {
        interval: u32,
        #[serde(default)]
        weekdays: BTreeSet<u8>,
    },
    Monthly {
        interval: u32,
    },
    Yearly {
        interval: u32,
    },
}

impl RecurrenceRule {
    pub fn interval(&self) -> u32 {
        match self {
            RecurrenceRule::Daily { interval }
            | RecurrenceRule::Weekly { interval, .. }
            | RecurrenceRule::Monthly { interval }
            | RecurrenceRule::Yearly { interval } => *interval,
        }
    }

    /// Reject zero intervals and out-of-range weekdays.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.interval() == 0 {
            return Err(EngineError::InvalidRule {
                message: "interval must be at least 1".into(),
            });
        }
        if let RecurrenceRule::Weekly { weekdays, .. } = self {
            if let Some(day) = weekdays.iter().find(|d| **d > 6) {
                return Err(EngineError::InvalidRule {
                    message: format!("weekday {day} out of range 0-6"),
                });
            }
        }
        Ok(())
    }
}

/// Next due date strictly after `last_due` according to `rule`.
pub fn next_occurrence(
    last_due: NaiveDate,
    rule: &RecurrenceRule,
) -> Result<NaiveDate, EngineError> {
    rule.validate()?;
    let next = match rule {
        RecurrenceRule::Daily { interval } => last_due + Duration::days(i64::from(*interval)),
        RecurrenceRule::Weekly { interval, weekdays } => {
            let w = last_due.weekday().num_days_from_sunday() as u8;
            let days: BTreeSet<u8> = if weekdays.is_empty() {
                BTreeSet::from([w])
            } else {
                weekdays.clone()
            };
            if let Some(day) = days.iter().copied().find(|d| *d > w) {
                // A later day exists in the same week.
                last_due + Duration::days(i64::from(day - w))
            } else {
                // Wrap to the first listed day, `interval` weeks out.
                let first = days.iter().copied().next().unwrap_or(w);
                let ahead =
                    i64::from(7 - w) + i64::from(interval - 1) * 7 + i64::from(first);
                last_due + Duration::days(ahead)
            }
        }
        RecurrenceRule::Monthly { interval } => add_months(last_due, *interval),
        RecurrenceRule::Yearly { interval } => add_months(last_due, interval * 12),
    };
    Ok(next)
}

/// Calendar-month addition, clamping day-of-month to the target month's
/// length (Jan 31 + 1 month = Feb 29 in a leap year, Feb 28 otherwise).
fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + (date.month() as i32 - 1) + months as i32;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
