//! Route definitions for the `/time-entries` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::time_entries;
use crate::state::AppState;

/// Routes mounted at `/time-entries`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /date-range                -> list_by_date_range
/// GET    /user/{user_id}            -> list_by_user
/// GET    /user/{user_id}/totals     -> user_totals
/// GET    /project/{project_id}      -> list_by_project
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(time_entries::list).post(time_entries::create))
        .route("/date-range", get(time_entries::list_by_date_range))
        .route("/user/{user_id}", get(time_entries::list_by_user))
        .route("/user/{user_id}/totals", get(time_entries::user_totals))
        .route("/project/{project_id}", get(time_entries::list_by_project))
        .route(
            "/{id}",
            get(time_entries::get_by_id)
                .put(time_entries::update)
                .delete(time_entries::delete),
        )
}
