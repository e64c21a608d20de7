//! Client entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use timetrack_core::types::{DbId, Timestamp};

/// A client row from the `clients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new client.
#[derive(Debug, Clone)]
pub struct CreateClient {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating an existing client. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub description: Option<String>,
}
