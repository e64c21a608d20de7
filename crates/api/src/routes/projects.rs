//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                     -> list
/// POST   /                     -> create
/// GET    /leader/{leader_id}   -> list_by_leader
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update
/// DELETE /{id}                 -> delete
/// GET    /{id}/developers      -> get_developers
/// PUT    /{id}/developers      -> set_developers
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route("/leader/{leader_id}", get(projects::list_by_leader))
        .route(
            "/{id}",
            get(projects::get_by_id)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route(
            "/{id}/developers",
            get(projects::get_developers).put(projects::set_developers),
        )
}
