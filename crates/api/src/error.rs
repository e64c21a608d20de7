use axum::body::Body;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::header::CONTENT_LENGTH;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use timetrack_core::entry_validation::EntryRejection;
use timetrack_core::error::CoreError;

/// Underlying cause of a 500, carried as a response extension.
///
/// The body never includes it; [`attach_error_detail`] copies it into the
/// `error` member when the router runs outside production.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail {
    pub message: String,
    pub detail: String,
}

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Renders as `{ "success": false, "message": ..., "error"?: ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `timetrack_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<EntryRejection> for AppError {
    fn from(rejection: EntryRejection) -> Self {
        AppError::Core(rejection.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let message = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        AppError::BadRequest(message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    format!("{entity} with id {id} not found"),
                    None,
                ),
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal(msg)
            }
        };

        let body = json!({
            "success": false,
            "message": message,
        });
        let mut response = (status, axum::Json(body)).into_response();
        if let Some(detail) = detail {
            response
                .extensions_mut()
                .insert(InternalErrorDetail { message, detail });
        }
        response
    }
}

fn internal(detail: &str) -> (StatusCode, String, Option<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
        Some(detail.to_string()),
    )
}

/// Response mapper that exposes [`InternalErrorDetail`] in the error body.
///
/// Installed by the router only when the server is not in production.
pub async fn attach_error_detail(response: Response) -> Response {
    let Some(InternalErrorDetail { message, detail }) =
        response.extensions().get::<InternalErrorDetail>().cloned()
    else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    let body = json!({
        "success": false,
        "message": message,
        "error": detail,
    });
    Response::from_parts(parts, Body::from(body.to_string()))
}

/// Classify a sqlx error into an HTTP status and message.
///
/// - `RowNotFound` maps to 404.
/// - A unique violation on `users.email` maps to 400; other unique violations to 409.
/// - Foreign-key and CHECK violations map to 400.
/// - Everything else maps to 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, String, Option<String>) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "Resource not found".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err) => {
            if db_err.is_unique_violation() {
                if db_err.message().contains("users.email") {
                    return (
                        StatusCode::BAD_REQUEST,
                        "Email is already registered".to_string(),
                        None,
                    );
                }
                return (
                    StatusCode::CONFLICT,
                    "Duplicate value violates a unique constraint".to_string(),
                    None,
                );
            }
            if db_err.is_foreign_key_violation() {
                return (
                    StatusCode::BAD_REQUEST,
                    "Referenced record does not exist".to_string(),
                    None,
                );
            }
            if db_err.is_check_violation() {
                return (
                    StatusCode::BAD_REQUEST,
                    "Value violates a data constraint".to_string(),
                    None,
                );
            }
            tracing::error!(error = %db_err, "Database error");
            internal(db_err.message())
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal(&other.to_string())
        }
    }
}
