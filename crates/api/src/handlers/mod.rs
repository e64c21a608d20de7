//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers check access, validate the request body, delegate to the
//! repositories in `timetrack_db` and map errors via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod clients;
pub mod projects;
pub mod reports;
pub mod templates;
pub mod time_entries;
pub mod users;

use validator::ValidationError;

/// `validator` hook: reject strings that are empty after trimming.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Trim an optional string, mapping blank to `None`.
pub(crate) fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
