use stepdish_core::error::CoreError;
use stepdish_core::image::ImageError;
use stepdish_db::StoreError;
use stepdish_storage::StorageError;

/// Application-level error type for every service in this crate.
///
/// Wraps [`CoreError`] for domain errors and the failures of each
/// collaborator. The interface layer only ever shows
/// [`user_message`](Self::user_message).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A domain-level error from `stepdish_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A photo could not be normalized.
    #[error("Image processing failed: {0}")]
    Image(#[from] ImageError),

    /// Object storage rejected an upload or removal.
    #[error("Upload failed: {0}")]
    Storage(#[from] StorageError),

    /// A record read or write failed.
    #[error("Save failed: {0}")]
    Store(#[from] StoreError),
}

/// Convenience type alias for service return values.
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// The single human-readable message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => format!("{entity} not found"),
                CoreError::Validation(msg)
                | CoreError::Conflict(msg)
                | CoreError::Unauthorized(msg)
                | CoreError::Forbidden(msg) => msg.clone(),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    "Something went wrong".to_string()
                }
            },
            PipelineError::Image(_) | PipelineError::Storage(_) | PipelineError::Store(_) => {
                self.to_string()
            }
        }
    }

    /// Whether the failure was detected before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::Core(CoreError::Validation(_)))
    }
}
