//! Shared helpers for command modules.

use cadence_core::clock::{logical_date_offset, logical_today};
use chrono::NaiveDate;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Parse a user-facing date argument: `today`, `tomorrow`, `yesterday`, or
/// `YYYY-MM-DD`. Relative names resolve against the logical clock, not the
/// calendar one.
pub fn parse_date_arg(raw: &str, day_start_hour: u8) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match raw {
        "today" => Ok(logical_today(day_start_hour)),
        "tomorrow" => Ok(logical_date_offset(1, day_start_hour)),
        "yesterday" => Ok(logical_date_offset(-1, day_start_hour)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|_| format!("cannot parse date '{other}' (expected YYYY-MM-DD)").into()),
    }
}

/// Pretty-print any serializable value as JSON to stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
