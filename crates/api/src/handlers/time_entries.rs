//! Handlers for the `/time-entries` resource.
//!
//! Every create and update runs the full validation pipeline from
//! `timetrack_core::entry_validation` while holding the `(user, date)` entry
//! lock, so the overlap and daily-cap checks see a stable view of the day.

use axum::extract::State;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use timetrack_core::calendar::Month;
use timetrack_core::entry_validation::{
    validate_entry, DayEntry, EntryDraft, EntryRejection, Submitter, ValidatedEntry,
};
use timetrack_core::error::CoreError;
use timetrack_core::rollup::{period_totals, week_bounds, PeriodTotals};
use timetrack_core::types::DbId;
use timetrack_db::models::time_entry::{NewTimeEntry, TimeEntry};
use timetrack_db::repositories::{ProjectRepo, TimeEntryRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireReviewer;
use crate::response::ApiResponse;
use crate::state::{AppState, DayKey};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /time-entries`. Fields are optional so that missing ones
/// are reported by the validation pipeline rather than by the JSON parser.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeEntryRequest {
    /// Owner of the entry. Defaults to the caller; only admins may set another user.
    pub user_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub task_name: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Client-computed hours. Checked against start/end, never trusted.
    pub hours: Option<f64>,
    pub description: Option<String>,
}

/// Body of `PUT /time-entries/{id}`. Absent fields keep their stored value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeEntryRequest {
    pub project_id: Option<DbId>,
    pub task_name: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub hours: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TotalsQuery {
    /// Reference date; defaults to today.
    pub date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "TimeEntry",
        id,
    })
}

fn forbidden(msg: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(msg.into()))
}

fn parse_date(raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid date '{s}', expected YYYY-MM-DD"))),
    }
}

/// Server-local calendar date used for the future-date check.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Look up everything the pipeline needs and run it.
///
/// The caller must already hold the entry lock for `(owner, draft.date)`.
async fn run_pipeline(
    state: &AppState,
    owner: DbId,
    draft: &EntryDraft,
    exclude_id: Option<DbId>,
) -> AppResult<ValidatedEntry> {
    let owner_user = UserRepo::find_by_id(&state.pool, owner)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("User {owner} does not exist")))?;
    let submitter = Submitter {
        user_id: owner,
        role: owner_user.role(),
    };

    let scope = match draft.project_id {
        Some(project_id) => ProjectRepo::find_by_id(&state.pool, project_id)
            .await?
            .map(|p| p.scope()),
        None => None,
    };

    let same_day: Vec<DayEntry> = match draft.date {
        Some(date) => TimeEntryRepo::list_same_day(&state.pool, owner, date, exclude_id)
            .await?
            .iter()
            .filter_map(TimeEntry::as_day_entry)
            .collect(),
        None => Vec::new(),
    };

    validate_entry(
        draft,
        &submitter,
        scope.as_ref(),
        &same_day,
        &state.config.limits,
        today(),
    )
    .map_err(|rejection: EntryRejection| {
        tracing::info!(
            user_id = owner,
            date = ?draft.date,
            reason = %rejection,
            "Time entry rejected"
        );
        AppError::from(rejection)
    })
}

fn to_row(owner: DbId, entry: &ValidatedEntry, description: Option<String>) -> NewTimeEntry {
    NewTimeEntry {
        user_id: owner,
        project_id: entry.project_id,
        task_name: entry.task_name.clone(),
        date: entry.date,
        start_time: entry.start_hhmm(),
        end_time: entry.end_hhmm(),
        hours: entry.hours,
        description,
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/time-entries
pub async fn list(
    State(state): State<AppState>,
    _reviewer: RequireReviewer,
) -> AppResult<ApiResponse<Vec<TimeEntry>>> {
    Ok(ApiResponse::data(TimeEntryRepo::list(&state.pool).await?))
}

/// GET /api/time-entries/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<TimeEntry>> {
    let entry = TimeEntryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !auth.can_view_user(entry.user_id) {
        return Err(forbidden("You can only view your own time entries"));
    }
    Ok(ApiResponse::data(entry))
}

/// GET /api/time-entries/user/{user_id}
pub async fn list_by_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<ApiResponse<Vec<TimeEntry>>> {
    if !auth.can_view_user(user_id) {
        return Err(forbidden("You can only view your own time entries"));
    }
    Ok(ApiResponse::data(
        TimeEntryRepo::list_by_user(&state.pool, user_id).await?,
    ))
}

/// GET /api/time-entries/project/{project_id}
pub async fn list_by_project(
    State(state): State<AppState>,
    _reviewer: RequireReviewer,
    Path(project_id): Path<DbId>,
) -> AppResult<ApiResponse<Vec<TimeEntry>>> {
    Ok(ApiResponse::data(
        TimeEntryRepo::list_by_project(&state.pool, project_id).await?,
    ))
}

/// GET /api/time-entries/date-range?start=YYYY-MM-DD&end=YYYY-MM-DD
pub async fn list_by_date_range(
    State(state): State<AppState>,
    _reviewer: RequireReviewer,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<ApiResponse<Vec<TimeEntry>>> {
    let (Some(start), Some(end)) = (range.start, range.end) else {
        return Err(AppError::BadRequest("start and end dates are required".into()));
    };
    if start > end {
        return Err(AppError::BadRequest("start must not be after end".into()));
    }
    Ok(ApiResponse::data(
        TimeEntryRepo::list_by_date_range(&state.pool, Some(start), Some(end)).await?,
    ))
}

/// GET /api/time-entries/user/{user_id}/totals?date=YYYY-MM-DD
///
/// Day, Sunday–Saturday week and calendar month totals around `date`.
pub async fn user_totals(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
    Query(query): Query<TotalsQuery>,
) -> AppResult<ApiResponse<PeriodTotals>> {
    if !auth.can_view_user(user_id) {
        return Err(forbidden("You can only view your own totals"));
    }
    let date = query.date.unwrap_or_else(today);
    let (week_start, week_end) = week_bounds(date);
    let month = Month::containing(date);
    let from = week_start.min(month.first_day());
    let to = week_end.max(month.last_day());

    let entries = TimeEntryRepo::list_by_user_between(&state.pool, user_id, from, to).await?;
    Ok(ApiResponse::data(period_totals(&entries, user_id, date)))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/time-entries
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateTimeEntryRequest>,
) -> AppResult<ApiResponse<TimeEntry>> {
    let owner = input.user_id.unwrap_or(auth.user_id);
    if !auth.is_self_or_admin(owner) {
        return Err(forbidden("You can only log time for yourself"));
    }

    let draft = EntryDraft {
        project_id: input.project_id,
        task_name: input.task_name,
        date: parse_date(input.date.as_deref())?,
        start_time: input.start_time,
        end_time: input.end_time,
        hours: input.hours,
    };

    let keys: Vec<DayKey> = draft.date.map(|d| (owner, d)).into_iter().collect();
    let _guards = state.entry_locks.acquire(&keys).await;

    let validated = run_pipeline(&state, owner, &draft, None).await?;
    let entry = TimeEntryRepo::create(
        &state.pool,
        &to_row(owner, &validated, super::trimmed(input.description.as_deref())),
    )
    .await?;
    tracing::info!(
        entry_id = entry.id,
        user_id = owner,
        date = %entry.date,
        hours = entry.hours,
        "Time entry created"
    );

    Ok(ApiResponse::created(entry, "Time entry created successfully"))
}

/// PUT /api/time-entries/{id}
///
/// Absent fields keep their stored values; the merged entry is re-validated
/// with itself excluded from the overlap and daily-cap checks.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTimeEntryRequest>,
) -> AppResult<ApiResponse<TimeEntry>> {
    let existing = TimeEntryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !auth.is_self_or_admin(existing.user_id) {
        return Err(forbidden("You can only edit your own time entries"));
    }
    let owner = existing.user_id;

    let date = match parse_date(input.date.as_deref())? {
        Some(date) => date,
        None => existing.date,
    };
    let draft = EntryDraft {
        project_id: Some(input.project_id.unwrap_or(existing.project_id)),
        task_name: Some(input.task_name.unwrap_or(existing.task_name)),
        date: Some(date),
        start_time: Some(input.start_time.unwrap_or(existing.start_time)),
        end_time: Some(input.end_time.unwrap_or(existing.end_time)),
        hours: input.hours,
    };
    let description = match input.description {
        Some(d) => super::trimmed(Some(d.as_str())),
        None => existing.description,
    };

    // Moving an entry to another day touches both days.
    let _guards = state
        .entry_locks
        .acquire(&[(owner, existing.date), (owner, date)])
        .await;

    let validated = run_pipeline(&state, owner, &draft, Some(id)).await?;
    let entry = TimeEntryRepo::update(&state.pool, id, &to_row(owner, &validated, description))
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(entry_id = id, user_id = owner, "Time entry updated");

    Ok(ApiResponse::with_message(entry, "Time entry updated successfully"))
}

/// DELETE /api/time-entries/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    let existing = TimeEntryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !auth.is_self_or_admin(existing.user_id) {
        return Err(forbidden("You can only delete your own time entries"));
    }
    if !TimeEntryRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(entry_id = id, user_id = existing.user_id, "Time entry deleted");
    Ok(ApiResponse::message("Time entry deleted successfully"))
}
