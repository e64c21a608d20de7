//! Handlers for the `/clients` resource.

use axum::extract::State;
use serde::Deserialize;
use timetrack_core::error::CoreError;
use timetrack_core::types::DbId;
use timetrack_db::models::client::{Client, CreateClient, UpdateClient};
use timetrack_db::repositories::ClientRepo;
use validator::Validate;

use super::trimmed;
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(custom(function = "super::not_blank", message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(custom(function = "super::not_blank", message = "name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Client", id })
}

/// GET /api/clients
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<ApiResponse<Vec<Client>>> {
    Ok(ApiResponse::data(ClientRepo::list(&state.pool).await?))
}

/// GET /api/clients/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Client>> {
    let client = ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::data(client))
}

/// POST /api/clients
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateClientRequest>,
) -> AppResult<ApiResponse<Client>> {
    input.validate()?;
    let client = ClientRepo::create(
        &state.pool,
        &CreateClient {
            name: input.name.trim().to_string(),
            description: input.description,
        },
    )
    .await?;
    tracing::info!(client_id = client.id, created_by = admin.user_id, "Client created");
    Ok(ApiResponse::created(client, "Client created successfully"))
}

/// PUT /api/clients/{id}
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateClientRequest>,
) -> AppResult<ApiResponse<Client>> {
    input.validate()?;
    let client = ClientRepo::update(
        &state.pool,
        id,
        &UpdateClient {
            name: trimmed(input.name.as_deref()),
            description: input.description,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::with_message(client, "Client updated successfully"))
}

/// DELETE /api/clients/{id}
///
/// Cascades to the client's projects and their time entries.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    if !ClientRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(client_id = id, deleted_by = admin.user_id, "Client deleted");
    Ok(ApiResponse::message("Client deleted successfully"))
}
