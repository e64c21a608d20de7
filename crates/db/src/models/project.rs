//! Project entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use timetrack_core::entry_validation::ProjectScope;
use timetrack_core::types::{DbId, Timestamp};

/// A project row joined with its client and leader names.
///
/// `developer_ids` is not a column; repositories fill it from
/// `project_developers` after the main query.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub client_id: DbId,
    pub leader_id: DbId,
    pub tasks: String,
    pub created_at: Timestamp,
    pub client_name: Option<String>,
    pub leader_name: Option<String>,
    #[sqlx(skip)]
    pub developer_ids: Vec<DbId>,
}

impl Project {
    /// Access scope used by time-entry validation.
    pub fn scope(&self) -> ProjectScope {
        ProjectScope {
            project_id: self.id,
            leader_id: self.leader_id,
            developer_ids: self.developer_ids.clone(),
        }
    }
}

/// DTO for creating a new project. `tasks` is already normalised.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub client_id: DbId,
    pub leader_id: DbId,
    pub tasks: String,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub client_id: Option<DbId>,
    pub leader_id: Option<DbId>,
    pub tasks: Option<String>,
}

/// One row of the `project_developers` join table.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct ProjectDeveloper {
    pub project_id: DbId,
    pub user_id: DbId,
}
