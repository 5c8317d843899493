use crate::envelope::Reply;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed request parameter.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Resource not found error.
    #[error("Book not found: {0}")]
    NotFound(String),

    /// Ebook parse failure.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Storage or collaborator failure.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!(error = %self, "Request error");

        // Client errors carry their message; anything 500-class gets a
        // generic body so upstream detail never leaks to the caller.
        let msg = match &self {
            AppError::Validation(m) => m.clone(),
            AppError::NotFound(m) => format!("book not found: {}", m),
            _ => "implementation failure".to_string(),
        };

        (status, Reply::<()>::fail(msg)).into_response()
    }
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
