//! Time-entry validation pipeline.
//!
//! [`validate_entry`] decides whether a proposed (new or edited) time entry
//! may be persisted, given the target project's access scope and the other
//! entries the same user already has on the same day. Checks run in a fixed
//! order and the first failure wins:
//!
//! 1. project present, existing, and open to the submitter
//! 2. non-empty task name
//! 3. date present and not in the future
//! 4. start/end present, parseable, end after start
//! 5. single-entry cap
//! 6. client-supplied `hours` matches the recomputed value
//! 7. no half-open overlap with other entries that day
//! 8. daily total cap

use chrono::{NaiveDate, NaiveTime};

use crate::error::CoreError;
use crate::hours::{
    compute_hours, format_clock_time, hours_to_tenths, parse_clock_time, tenths_to_hours,
};
use crate::roles::Role;
use crate::types::DbId;

/// Hour cap applied both to a single entry and to a user's daily total.
pub const DEFAULT_DAILY_HOUR_CAP: f64 = 12.0;

/// Largest tolerated difference between client-supplied and recomputed hours.
const HOURS_MISMATCH_TOLERANCE_TENTHS: i64 = 0;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Hour caps enforced by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourLimits {
    pub max_entry_hours: f64,
    pub max_daily_hours: f64,
}

impl HourLimits {
    /// The same cap for a single entry and for the day.
    pub fn uniform(cap: f64) -> Self {
        Self {
            max_entry_hours: cap,
            max_daily_hours: cap,
        }
    }
}

impl Default for HourLimits {
    fn default() -> Self {
        Self::uniform(DEFAULT_DAILY_HOUR_CAP)
    }
}

/// The user submitting the entry (the entry's owner).
#[derive(Debug, Clone, Copy)]
pub struct Submitter {
    pub user_id: DbId,
    pub role: Role,
}

/// What the pipeline needs to know about the target project.
#[derive(Debug, Clone)]
pub struct ProjectScope {
    pub project_id: DbId,
    pub leader_id: DbId,
    /// Explicitly assigned developers. Empty means the project is open.
    pub developer_ids: Vec<DbId>,
}

impl ProjectScope {
    /// Admins, the project's leader and assigned developers may log time.
    /// A project with no assignments is open to everyone.
    pub fn allows(&self, submitter: &Submitter) -> bool {
        submitter.role == Role::Admin
            || submitter.user_id == self.leader_id
            || self.developer_ids.is_empty()
            || self.developer_ids.contains(&submitter.user_id)
    }
}

/// Raw fields of a proposed entry, as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub project_id: Option<DbId>,
    pub task_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Hours as computed by the client, if it sent any.
    pub hours: Option<f64>,
}

/// An entry already stored for the same user and day.
#[derive(Debug, Clone)]
pub struct DayEntry {
    pub id: DbId,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours: f64,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// A draft that passed every check, with normalised fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    pub project_id: DbId,
    pub task_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours: f64,
}

impl ValidatedEntry {
    /// `HH:MM` start time for storage.
    pub fn start_hhmm(&self) -> String {
        format_clock_time(self.start_time)
    }

    /// `HH:MM` end time for storage.
    pub fn end_hhmm(&self) -> String {
        format_clock_time(self.end_time)
    }
}

/// Why a proposed entry was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryRejection {
    #[error("projectId is required")]
    MissingProject,

    #[error("Project {0} does not exist")]
    ProjectNotFound(DbId),

    #[error("You are not assigned to project {0}")]
    ProjectNotAssigned(DbId),

    #[error("taskName is required")]
    MissingTask,

    #[error("date is required")]
    MissingDate,

    #[error("Cannot log time for a future date ({date})")]
    FutureDate { date: NaiveDate },

    #[error("startTime and endTime are required")]
    MissingTimes,

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("End time must be after start time")]
    EndNotAfterStart,

    #[error("A single entry cannot exceed {max} hours (got {hours})")]
    EntryTooLong { hours: f64, max: f64 },

    #[error("hours ({claimed}) does not match startTime/endTime ({computed})")]
    HoursMismatch { claimed: f64, computed: f64 },

    #[error("Entry overlaps an existing entry from {start} to {end}")]
    Overlap {
        existing_id: DbId,
        start: String,
        end: String,
    },

    #[error("Daily total would be {total} hours, exceeding the {max}-hour limit")]
    DailyCapExceeded { total: f64, max: f64 },
}

impl From<EntryRejection> for CoreError {
    fn from(rejection: EntryRejection) -> Self {
        match rejection {
            EntryRejection::ProjectNotAssigned(_) => CoreError::Forbidden(rejection.to_string()),
            other => CoreError::Validation(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full validation pipeline.
///
/// - `project` is the looked-up scope for `draft.project_id` (`None` when no
///   such project exists).
/// - `same_day` holds the submitter's other entries on `draft.date`; when
///   editing, the entry being edited must already be excluded.
/// - `today` is the submission date used for the future-date check.
pub fn validate_entry(
    draft: &EntryDraft,
    submitter: &Submitter,
    project: Option<&ProjectScope>,
    same_day: &[DayEntry],
    limits: &HourLimits,
    today: NaiveDate,
) -> Result<ValidatedEntry, EntryRejection> {
    // 1. Project.
    let project_id = draft.project_id.ok_or(EntryRejection::MissingProject)?;
    let scope = project.ok_or(EntryRejection::ProjectNotFound(project_id))?;
    if !scope.allows(submitter) {
        return Err(EntryRejection::ProjectNotAssigned(project_id));
    }

    // 2. Task.
    let task_name = draft
        .task_name
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(EntryRejection::MissingTask)?;

    // 3. Date.
    let date = draft.date.ok_or(EntryRejection::MissingDate)?;
    if date > today {
        return Err(EntryRejection::FutureDate { date });
    }

    // 4. Times.
    let (start_raw, end_raw) = match (draft.start_time.as_deref(), draft.end_time.as_deref()) {
        (Some(s), Some(e)) if !s.trim().is_empty() && !e.trim().is_empty() => (s, e),
        _ => return Err(EntryRejection::MissingTimes),
    };
    let start_time =
        parse_clock_time(start_raw).ok_or_else(|| EntryRejection::InvalidTime(start_raw.into()))?;
    let end_time =
        parse_clock_time(end_raw).ok_or_else(|| EntryRejection::InvalidTime(end_raw.into()))?;
    let hours = compute_hours(start_time, end_time);
    let tenths = hours_to_tenths(hours);
    if tenths <= 0 {
        return Err(EntryRejection::EndNotAfterStart);
    }

    // 5. Single-entry cap.
    if tenths > hours_to_tenths(limits.max_entry_hours) {
        return Err(EntryRejection::EntryTooLong {
            hours,
            max: limits.max_entry_hours,
        });
    }

    // 6. Stored hours are a projection of start/end; refuse divergent input.
    if let Some(claimed) = draft.hours {
        if (hours_to_tenths(claimed) - tenths).abs() > HOURS_MISMATCH_TOLERANCE_TENTHS {
            return Err(EntryRejection::HoursMismatch {
                claimed,
                computed: hours,
            });
        }
    }

    // 7. Overlap.
    if let Some(existing) = find_overlap(start_time, end_time, same_day) {
        return Err(EntryRejection::Overlap {
            existing_id: existing.id,
            start: format_clock_time(existing.start_time),
            end: format_clock_time(existing.end_time),
        });
    }

    // 8. Daily total.
    let total_tenths: i64 = same_day.iter().map(|e| hours_to_tenths(e.hours)).sum::<i64>() + tenths;
    if total_tenths > hours_to_tenths(limits.max_daily_hours) {
        return Err(EntryRejection::DailyCapExceeded {
            total: tenths_to_hours(total_tenths),
            max: limits.max_daily_hours,
        });
    }

    Ok(ValidatedEntry {
        project_id,
        task_name: task_name.to_string(),
        date,
        start_time,
        end_time,
        hours,
    })
}

/// Whether half-open intervals `[a_start, a_end)` and `[b_start, b_end)` intersect.
///
/// Touching endpoints (`a_end == b_start`) do not overlap.
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// First entry in `same_day` that overlaps `[start, end)`.
pub fn find_overlap(start: NaiveTime, end: NaiveTime, same_day: &[DayEntry]) -> Option<&DayEntry> {
    same_day
        .iter()
        .find(|e| intervals_overlap(start, end, e.start_time, e.end_time))
}
