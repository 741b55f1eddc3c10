//! Work-timer tracking.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running(item) -> Idle
//!           |
//!           +-- start(other) auto-stops the running item first
//! ```
//!
//! The ledger is per user, not per item: at most one item owns the open
//! timer at any moment, and the [`ledger::TimerLedger`] is the sole
//! arbiter of that invariant.

pub mod ledger;

pub use ledger::{
    elapsed_display, estimated_finish_time, LedgerState, TimerLedger, TimerSession,
};
