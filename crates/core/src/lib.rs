//! TimeTrack domain logic.
//!
//! Pure, I/O-free building blocks shared by the persistence and HTTP
//! layers: the error taxonomy, roles, task lists, hour arithmetic, the
//! time-entry validation pipeline and every aggregation used by dashboards
//! and reports.

pub mod calendar;
pub mod entry_validation;
pub mod error;
pub mod hours;
pub mod roles;
pub mod rollup;
pub mod tasks;
pub mod types;
