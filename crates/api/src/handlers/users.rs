//! Handlers for the `/users` resource.

use axum::extract::State;
use serde::Deserialize;
use timetrack_core::error::CoreError;
use timetrack_core::roles::Role;
use timetrack_core::types::DbId;
use timetrack_db::models::user::{CreateUser, UpdateUser, UserResponse};
use timetrack_db::repositories::UserRepo;
use validator::Validate;

use super::trimmed;
use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "super::not_blank", message = "name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    pub role: String,
}

/// All fields optional. Only admins may change `role`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "super::not_blank", message = "name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,
    pub role: Option<String>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(ApiResponse::data(users.into_iter().map(Into::into).collect()))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::data(user.into()))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    input.validate()?;
    let role: Role = input.role.trim().parse()?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            password_hash: hash(&input.password)?,
            role,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, role = %role, created_by = admin.user_id, "User created");

    Ok(ApiResponse::created(user.into(), "User created successfully"))
}

/// PUT /api/users/{id}
///
/// Admins may edit anyone. Other users may edit their own name, email and
/// password but not their role.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    if !auth.is_self_or_admin(id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only edit your own profile".into(),
        )));
    }
    input.validate()?;

    let role = match input.role.as_deref().map(str::trim) {
        Some(raw) => {
            let role: Role = raw.parse()?;
            if !auth.is_admin() {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Only admins can change roles".into(),
                )));
            }
            Some(role)
        }
        None => None,
    };
    let password_hash = match input.password.as_deref() {
        Some(password) => Some(hash(password)?),
        None => None,
    };

    let user = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            name: trimmed(input.name.as_deref()),
            email: trimmed(input.email.as_deref()),
            password_hash,
            role,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(ApiResponse::with_message(user.into(), "User updated successfully"))
}

/// DELETE /api/users/{id}
///
/// Cascades to the user's time entries and the projects they lead.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    if id == admin.user_id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");
    Ok(ApiResponse::message("User deleted successfully"))
}
