//! Handlers for the `/templates` resource.

use axum::extract::State;
use serde::Deserialize;
use timetrack_core::error::CoreError;
use timetrack_core::tasks::normalize_tasks;
use timetrack_core::types::DbId;
use timetrack_db::models::template::{CreateTemplate, Template, UpdateTemplate};
use timetrack_db::repositories::TemplateRepo;
use validator::Validate;

use super::trimmed;
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    #[validate(custom(function = "super::not_blank", message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    /// Comma-separated task names.
    pub tasks: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTemplateRequest {
    #[validate(custom(function = "super::not_blank", message = "name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub tasks: Option<String>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Template",
        id,
    })
}

/// Normalise a task list, refusing one with no task names.
fn required_tasks(raw: &str) -> AppResult<String> {
    let tasks = normalize_tasks(raw);
    if tasks.is_empty() {
        return Err(AppError::BadRequest(
            "tasks must contain at least one task".into(),
        ));
    }
    Ok(tasks)
}

/// GET /api/templates
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<ApiResponse<Vec<Template>>> {
    Ok(ApiResponse::data(TemplateRepo::list(&state.pool).await?))
}

/// GET /api/templates/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Template>> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::data(template))
}

/// POST /api/templates
pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(input): Json<CreateTemplateRequest>,
) -> AppResult<ApiResponse<Template>> {
    input.validate()?;
    let template = TemplateRepo::create(
        &state.pool,
        &CreateTemplate {
            name: input.name.trim().to_string(),
            description: input.description,
            tasks: required_tasks(&input.tasks)?,
        },
    )
    .await?;
    Ok(ApiResponse::created(template, "Template created successfully"))
}

/// PUT /api/templates/{id}
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplateRequest>,
) -> AppResult<ApiResponse<Template>> {
    input.validate()?;
    let tasks = input.tasks.as_deref().map(required_tasks).transpose()?;
    let template = TemplateRepo::update(
        &state.pool,
        id,
        &UpdateTemplate {
            name: trimmed(input.name.as_deref()),
            description: input.description,
            tasks,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::with_message(template, "Template updated successfully"))
}

/// DELETE /api/templates/{id}
///
/// Projects created from the template keep their copied tasks.
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    if !TemplateRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(ApiResponse::message("Template deleted successfully"))
}
