//! Handlers for the `/auth` resource (login, logout, session restore).

use axum::extract::State;
use serde::{Deserialize, Serialize};
use timetrack_core::error::CoreError;
use timetrack_db::models::user::UserResponse;
use timetrack_db::repositories::UserRepo;
use validator::Validate;

use crate::auth::jwt::generate_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "super::not_blank", message = "Email and password are required"))]
    pub email: String,
    #[validate(custom(function = "super::not_blank", message = "Email and password are required"))]
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Authenticate with email + password and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    input.validate()?;
    let email = input.email.trim();

    let Some(user) = UserRepo::find_by_email(&state.pool, email).await? else {
        tracing::info!(email, "Login failed: unknown email");
        return Err(invalid_credentials());
    };

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login failed: wrong password");
        return Err(invalid_credentials());
    }

    let token = generate_token(user.id, user.role(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    tracing::info!(user_id = user.id, role = %user.role(), "Login successful");

    Ok(ApiResponse::with_message(
        LoginResponse {
            user: user.into(),
            token,
            expires_in: state.config.jwt.expires_in_secs(),
        },
        "Login successful",
    ))
}

/// POST /api/auth/logout
///
/// Sessions are stateless; the client discards its token.
pub async fn logout() -> ApiResponse<()> {
    ApiResponse::message("Logout successful")
}

/// GET /api/auth/me
///
/// Restore a session: the user behind the bearer token.
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
        })?;
    Ok(ApiResponse::data(user.into()))
}
