pub mod auth;
pub mod clients;
pub mod health;
pub mod projects;
pub mod reports;
pub mod templates;
pub mod time_entries;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                    liveness + DB check (public)
///
/// /auth/login                                login (public)
/// /auth/logout                               logout (public)
/// /auth/me                                   current session user
///
/// /users                                     list, create (admin)
/// /users/{id}                                get, update (admin or self), delete (admin)
///
/// /clients                                   list, create (admin)
/// /clients/{id}                              get, update, delete (admin)
///
/// /projects                                  list, create (admin)
/// /projects/{id}                             get, update, delete (admin)
/// /projects/{id}/developers                  get, replace (admin)
/// /projects/leader/{leader_id}               projects led by a user
///
/// /templates                                 list, create (admin)
/// /templates/{id}                            get, update, delete (admin)
///
/// /time-entries                              list (admin, leader), create
/// /time-entries/{id}                         get, update, delete (owner or admin)
/// /time-entries/user/{user_id}               a user's entries (self, admin, leader)
/// /time-entries/user/{user_id}/totals        day/week/month totals
/// /time-entries/project/{project_id}         a project's entries (admin, leader)
/// /time-entries/date-range                   entries in [start, end] (admin, leader)
///
/// /reports/summary                           filtered rollups (admin, leader)
/// /reports/calendar                          month heat-map (admin, leader)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/clients", clients::router())
        .nest("/projects", projects::router())
        .nest("/templates", templates::router())
        .nest("/time-entries", time_entries::router())
        .nest("/reports", reports::router())
}
