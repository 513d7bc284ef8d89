use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;

/// Shown for every analysis failure; the detail only goes to the log.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "The analysis failed. Check that the API key is valid or try another file.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Upload error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Upload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedMediaType(mime) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                format!("Unsupported file type '{mime}'. Upload a PDF, PNG or JPEG file."),
            ),
            AppError::Multipart(e) => (e.status(), "UPLOAD_ERROR", e.body_text()),
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                format!("The uploaded file is too large. The maximum size is {limit} bytes."),
            ),
            AppError::Analysis(e) => {
                tracing::error!("Analysis error: {e}");
                let (status, code) = match e {
                    AnalysisError::Configuration(_) => {
                        (StatusCode::SERVICE_UNAVAILABLE, "CONFIGURATION_ERROR")
                    }
                    AnalysisError::Encode(_) => (StatusCode::BAD_REQUEST, "UPLOAD_READ_ERROR"),
                    AnalysisError::Transport(_) => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
                    AnalysisError::EmptyResponse | AnalysisError::MalformedResponse(_) => {
                        (StatusCode::BAD_GATEWAY, "INVALID_AI_RESPONSE")
                    }
                };
                (status, code, ANALYSIS_FAILED_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
