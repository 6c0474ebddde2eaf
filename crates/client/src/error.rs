use folio_core::error::CoreError;

/// Client-level error type for user actions.
///
/// Wraps [`CoreError`] for domain errors and adds local-state and
/// configuration variants. [`ClientError::classify`] turns any variant
/// into the code and message the UI shows.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A domain-level error from `folio_core` or a backend adapter.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Reading or writing persisted local state failed.
    #[error("Local storage error: {0}")]
    Storage(String),

    /// Required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for user-action return values.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Shorthand for a fail-closed authorization error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Core(CoreError::Unauthorized(message.into()))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Core(CoreError::Unauthorized(_)))
    }

    /// Stable error code and user-facing message.
    ///
    /// Network and internal details are logged, not shown.
    pub fn classify(&self) -> (&'static str, String) {
        match self {
            ClientError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    ("NOT_FOUND", format!("{entity} with id {id} not found"))
                }
                CoreError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
                CoreError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone()),
                CoreError::UploadRejected(msg) => ("UPLOAD_REJECTED", msg.clone()),
                CoreError::Network(msg) => {
                    tracing::error!(error = %msg, "Backend request failed");
                    (
                        "NETWORK_ERROR",
                        "Could not reach the server. Please try again.".to_string(),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    ("INTERNAL_ERROR", "An internal error occurred".to_string())
                }
            },
            ClientError::Storage(msg) => {
                tracing::error!(error = %msg, "Local storage error");
                ("STORAGE_ERROR", "Could not access local settings".to_string())
            }
            ClientError::Config(msg) => ("CONFIG_ERROR", msg.clone()),
        }
    }

    /// Message to surface for a failed action. Authorization failures are
    /// always logged so they are never silent.
    pub fn surface(&self) -> String {
        let (code, message) = self.classify();
        if self.is_unauthorized() {
            tracing::warn!(code, message = %message, "Action rejected");
        }
        message
    }
}
