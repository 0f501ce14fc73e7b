use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use infodocs_core::error::CoreError;
use infodocs_export::error::ExportError;
use infodocs_storage::error::StorageError;
use serde::Serialize;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    /// The request is well-formed but cannot be rendered as submitted.
    Unprocessable(String),
    /// No rendering backend is installed.
    Unavailable(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Unavailable(msg) => {
                tracing::warn!("service unavailable: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { key } => ApiError::NotFound(format!("object not found: {key}")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Configuration(msg) => ApiError::Unavailable(msg),
            ExportError::Content(msg) => ApiError::Unprocessable(msg),
            ExportError::TemplateNotFound(id) => {
                ApiError::NotFound(format!("template not found: {id}"))
            }
            ExportError::Storage(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::OrganizationRequired(_)
            | CoreError::MissingField(_)
            | CoreError::InvalidCategory(_) => ApiError::Unprocessable(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
