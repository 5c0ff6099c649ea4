use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// An observation was constructed outside its value contract while
    /// bypassing the clamping path.
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
