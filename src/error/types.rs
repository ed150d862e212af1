use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::current_request_id;
use crate::models::DocumentKind;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid or missing access token")]
    InvalidToken,

    #[error("File too large: exceeds limit of {limit_mb}MB")]
    FileTooLarge { limit_mb: usize },

    #[error("Unsupported file format. Only .docx and .pdf allowed.")]
    UnsupportedFormat,

    #[error("No file uploaded")]
    MissingFile,

    #[error("{kind} extraction failed: {message}")]
    ExtractionFailed { kind: DocumentKind, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Analysis service failed: {message}")]
    AnalysisUnavailable { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            AppError::MissingFile => "MISSING_FILE",
            AppError::ExtractionFailed { .. } => "EXTRACTION_FAILED",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::AnalysisUnavailable { .. } => "ANALYSIS_UNAVAILABLE",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedFormat => StatusCode::BAD_REQUEST,
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::ExtractionFailed { .. } => StatusCode::BAD_REQUEST,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::AnalysisUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client. Server-side details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ExtractionFailed { kind, .. } => match kind {
                DocumentKind::Pdf => "Error reading PDF file. Try uploading a .docx instead.".to_string(),
                DocumentKind::Docx => "Error reading DOCX file. Try uploading a .pdf instead.".to_string(),
            },
            AppError::ValidationError { message } => message.clone(),
            AppError::AnalysisUnavailable { .. } => "Failed to analyze resume".to_string(),
            AppError::Internal { .. } => "Failed to process the file".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let detail = self.to_string();
        let request_id = current_request_id().unwrap_or_else(|| Uuid::new_v4().to_string());

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = error_code,
                status_code = %status,
                error_message = %detail,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = error_code,
                status_code = %status,
                error_message = %detail,
                "Request rejected"
            );
        }

        let body = Json(json!({
            "error": self.public_message(),
            "code": error_code,
            "requestId": request_id,
        }));

        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal {
            message: format!("Worker task failed: {}", err),
        }
    }
}

// Helper methods for creating specific errors
impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
        }
    }

    pub fn extraction(kind: DocumentKind, message: impl Into<String>) -> Self {
        AppError::ExtractionFailed {
            kind,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
