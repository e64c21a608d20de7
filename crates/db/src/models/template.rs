//! Task template model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use timetrack_core::types::{DbId, Timestamp};

/// A template row from the `templates` table. `tasks` is comma-separated.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub tasks: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateTemplate {
    pub name: String,
    pub description: Option<String>,
    pub tasks: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tasks: Option<String>,
}
