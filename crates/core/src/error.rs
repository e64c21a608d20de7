use crate::types::DbId;

/// Domain failures raised by core rules and surfaced by the API layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced user, client, project, template or entry does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input rejected by a business rule; the message is shown to the caller.
    #[error("{0}")]
    Validation(String),

    /// No valid session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role or ownership check failed.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}
