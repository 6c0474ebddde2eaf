/// Domain-level failure kinds shared by every layer.
///
/// Field-level form problems are not represented here; they are carried as
/// [`FieldErrors`](crate::validation::rules::FieldErrors) state on the draft.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
