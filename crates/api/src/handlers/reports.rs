//! Handlers for the `/reports` resource: filtered summaries and the leader
//! month calendar.

use axum::extract::State;
use chrono::Local;
use serde::Deserialize;
use timetrack_core::calendar::{build_month_calendar, Month, MonthCalendar};
use timetrack_core::error::CoreError;
use timetrack_core::roles::Role;
use timetrack_core::rollup::{build_report, ReportFilter, ReportSummary};
use timetrack_core::types::DbId;
use timetrack_db::repositories::TimeEntryRepo;

use crate::error::{AppError, AppResult};
use crate::extract::Query;
use crate::middleware::rbac::RequireReviewer;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    /// `YYYY-MM`; defaults to the current month.
    pub month: Option<String>,
    /// Restrict to projects led by this user. Leaders always see their own.
    pub leader_id: Option<DbId>,
}

/// GET /api/reports/summary?clientId&projectId&userId&startDate&endDate
pub async fn summary(
    State(state): State<AppState>,
    _reviewer: RequireReviewer,
    Query(filter): Query<ReportFilter>,
) -> AppResult<ApiResponse<ReportSummary>> {
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        if start > end {
            return Err(AppError::BadRequest(
                "startDate must not be after endDate".into(),
            ));
        }
    }
    let entries =
        TimeEntryRepo::list_by_date_range(&state.pool, filter.start_date, filter.end_date).await?;
    Ok(ApiResponse::data(build_report(&entries, &filter)))
}

/// GET /api/reports/calendar?month=YYYY-MM&leaderId=N
///
/// Per-developer daily hours for one month with heat-map bands and
/// non-working days. Leaders are limited to the projects they lead.
pub async fn calendar(
    State(state): State<AppState>,
    RequireReviewer(auth): RequireReviewer,
    Query(query): Query<CalendarQuery>,
) -> AppResult<ApiResponse<MonthCalendar>> {
    let month: Month = match query.month.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw.parse()?,
        _ => Month::containing(Local::now().date_naive()),
    };

    let leader_id = match (auth.role, query.leader_id) {
        (Role::Leader, Some(id)) if id != auth.user_id => {
            return Err(AppError::Core(CoreError::Forbidden(
                "Leaders can only view their own projects".into(),
            )));
        }
        (Role::Leader, _) => Some(auth.user_id),
        (_, requested) => requested,
    };

    let (first, last) = (month.first_day(), month.last_day());
    let entries = match leader_id {
        Some(leader_id) => {
            TimeEntryRepo::list_by_leader_between(&state.pool, leader_id, first, last).await?
        }
        None => TimeEntryRepo::list_by_date_range(&state.pool, Some(first), Some(last)).await?,
    };

    Ok(ApiResponse::data(build_month_calendar(
        month,
        &entries,
        &state.config.calendar,
    )))
}
