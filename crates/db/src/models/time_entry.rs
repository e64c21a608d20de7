//! Time entry model and DTOs.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use timetrack_core::entry_validation::DayEntry;
use timetrack_core::hours::parse_clock_time;
use timetrack_core::rollup::HoursRecord;
use timetrack_core::types::{DbId, Timestamp};

/// A `time_entries` row joined with user, project and client identifiers.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub task_name: String,
    pub date: NaiveDate,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub hours: f64,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub user_name: Option<String>,
    pub project_name: Option<String>,
    pub client_id: Option<DbId>,
}

impl TimeEntry {
    /// The entry as seen by overlap and daily-cap checks.
    ///
    /// Returns `None` if a stored time no longer parses.
    pub fn as_day_entry(&self) -> Option<DayEntry> {
        Some(DayEntry {
            id: self.id,
            start_time: parse_clock_time(&self.start_time)?,
            end_time: parse_clock_time(&self.end_time)?,
            hours: self.hours,
        })
    }
}

impl HoursRecord for TimeEntry {
    fn entry_id(&self) -> DbId {
        self.id
    }
    fn user_id(&self) -> DbId {
        self.user_id
    }
    fn project_id(&self) -> DbId {
        self.project_id
    }
    fn client_id(&self) -> Option<DbId> {
        self.client_id
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn hours(&self) -> f64 {
        self.hours
    }
    fn user_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or_default()
    }
    fn project_name(&self) -> &str {
        self.project_name.as_deref().unwrap_or_default()
    }
}

/// A fully validated entry ready to be written. Used for both insert and
/// full-row update.
#[derive(Debug, Clone)]
pub struct NewTimeEntry {
    pub user_id: DbId,
    pub project_id: DbId,
    pub task_name: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub hours: f64,
    pub description: Option<String>,
}
