use infodocs_storage::error::StorageError;
use infodocs_template::TemplateError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ExportError {
    /// No backend can serve the request. Not retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The template or payload cannot be rendered as submitted.
    #[error("content error: {0}")]
    Content(String),

    /// The selected backend failed for this document.
    #[error("{backend} failed: {message}")]
    Render { backend: String, message: String },

    #[error("template not found: {0}")]
    TemplateNotFound(Uuid),

    #[error("render worker failed: {0}")]
    Worker(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<TemplateError> for ExportError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::Empty => ExportError::Content(e.to_string()),
        }
    }
}
