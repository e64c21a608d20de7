//! Handlers for the `/projects` resource and developer assignment.

use axum::extract::State;
use serde::Deserialize;
use timetrack_core::error::CoreError;
use timetrack_core::roles::Role;
use timetrack_core::tasks::normalize_tasks;
use timetrack_core::types::DbId;
use timetrack_db::models::project::{CreateProject, Project, UpdateProject};
use timetrack_db::repositories::{ClientRepo, ProjectRepo, TemplateRepo, UserRepo};
use timetrack_db::DbPool;
use validator::Validate;

use super::trimmed;
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(custom(function = "super::not_blank", message = "name is required"))]
    pub name: String,
    pub client_id: Option<DbId>,
    pub leader_id: Option<DbId>,
    /// Comma-separated task names.
    pub tasks: Option<String>,
    /// Copy this template's tasks into the new project.
    pub template_id: Option<DbId>,
    #[serde(default)]
    pub developer_ids: Vec<DbId>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(custom(function = "super::not_blank", message = "name cannot be empty"))]
    pub name: Option<String>,
    pub client_id: Option<DbId>,
    pub leader_id: Option<DbId>,
    pub tasks: Option<String>,
    /// Replaces the assignment list when present.
    pub developer_ids: Option<Vec<DbId>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDevelopersRequest {
    pub developer_ids: Vec<DbId>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

// ---------------------------------------------------------------------------
// Reference checks
// ---------------------------------------------------------------------------

async fn ensure_client(pool: &DbPool, client_id: DbId) -> AppResult<()> {
    if ClientRepo::find_by_id(pool, client_id).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Client {client_id} does not exist"
        )));
    }
    Ok(())
}

/// Leaders and admins may lead a project.
async fn ensure_leader(pool: &DbPool, leader_id: DbId) -> AppResult<()> {
    let leader = UserRepo::find_by_id(pool, leader_id)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("User {leader_id} does not exist")))?;
    if !matches!(leader.role(), Role::Leader | Role::Admin) {
        return Err(AppError::BadRequest(format!(
            "User {leader_id} is not a leader"
        )));
    }
    Ok(())
}

async fn ensure_users(pool: &DbPool, user_ids: &[DbId]) -> AppResult<()> {
    for &id in user_ids {
        if UserRepo::find_by_id(pool, id).await?.is_none() {
            return Err(AppError::BadRequest(format!("User {id} does not exist")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<ApiResponse<Vec<Project>>> {
    Ok(ApiResponse::data(ProjectRepo::list(&state.pool).await?))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Project>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::data(project))
}

/// GET /api/projects/leader/{leader_id}
pub async fn list_by_leader(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(leader_id): Path<DbId>,
) -> AppResult<ApiResponse<Vec<Project>>> {
    Ok(ApiResponse::data(
        ProjectRepo::list_by_leader(&state.pool, leader_id).await?,
    ))
}

/// POST /api/projects
///
/// With `templateId`, the template's tasks are copied in ahead of any
/// explicitly listed tasks.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<ApiResponse<Project>> {
    input.validate()?;
    let client_id = input
        .client_id
        .ok_or_else(|| AppError::BadRequest("clientId is required".into()))?;
    let leader_id = input
        .leader_id
        .ok_or_else(|| AppError::BadRequest("leaderId is required".into()))?;
    ensure_client(&state.pool, client_id).await?;
    ensure_leader(&state.pool, leader_id).await?;
    ensure_users(&state.pool, &input.developer_ids).await?;

    let mut tasks = String::new();
    if let Some(template_id) = input.template_id {
        let template = TemplateRepo::find_by_id(&state.pool, template_id)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Template {template_id} does not exist"))
            })?;
        tasks = template.tasks;
    }
    if let Some(extra) = input.tasks.as_deref() {
        tasks = format!("{tasks},{extra}");
    }

    let project = ProjectRepo::create(
        &state.pool,
        &CreateProject {
            name: input.name.trim().to_string(),
            client_id,
            leader_id,
            tasks: normalize_tasks(&tasks),
        },
        &input.developer_ids,
    )
    .await?;
    tracing::info!(project_id = project.id, created_by = admin.user_id, "Project created");

    Ok(ApiResponse::created(project, "Project created successfully"))
}

/// PUT /api/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectRequest>,
) -> AppResult<ApiResponse<Project>> {
    input.validate()?;
    if let Some(client_id) = input.client_id {
        ensure_client(&state.pool, client_id).await?;
    }
    if let Some(leader_id) = input.leader_id {
        ensure_leader(&state.pool, leader_id).await?;
    }
    if let Some(developer_ids) = &input.developer_ids {
        ensure_users(&state.pool, developer_ids).await?;
    }

    let project = ProjectRepo::update(
        &state.pool,
        id,
        &UpdateProject {
            name: trimmed(input.name.as_deref()),
            client_id: input.client_id,
            leader_id: input.leader_id,
            tasks: input.tasks.as_deref().map(normalize_tasks),
        },
        input.developer_ids.as_deref(),
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(ApiResponse::with_message(project, "Project updated successfully"))
}

/// DELETE /api/projects/{id}
///
/// Cascades to the project's time entries.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    if !ProjectRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(project_id = id, deleted_by = admin.user_id, "Project deleted");
    Ok(ApiResponse::message("Project deleted successfully"))
}

/// GET /api/projects/{id}/developers
pub async fn get_developers(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Vec<DbId>>> {
    if ProjectRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    Ok(ApiResponse::data(
        ProjectRepo::developer_ids(&state.pool, id).await?,
    ))
}

/// PUT /api/projects/{id}/developers
///
/// Replace the developer assignment. An empty list opens the project to
/// every user.
pub async fn set_developers(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignDevelopersRequest>,
) -> AppResult<ApiResponse<Vec<DbId>>> {
    if ProjectRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    ensure_users(&state.pool, &input.developer_ids).await?;
    let assigned = ProjectRepo::set_developers(&state.pool, id, &input.developer_ids).await?;
    Ok(ApiResponse::with_message(assigned, "Developers updated successfully"))
}
