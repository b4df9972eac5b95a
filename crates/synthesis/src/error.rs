use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Synthesis service errors with their HTTP status codes
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The engine failed to initialize at startup
    #[error("TTS engine not initialized: {0}")]
    EngineUnavailable(String),

    /// The engine raised during inference, message passed through verbatim
    #[error("{0}")]
    Inference(String),

    /// The transcoder could not be run or exited non-zero
    #[error("Transcoding failed: {0}")]
    Transcode(String),

    /// Request fields failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body was not JSON
    #[error("Unsupported Content-Type, expected: 'Content-Type: application/json'")]
    UnsupportedMediaType,

    /// Request body exceeded the size limit
    #[error("Request body is too large, limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// Engine or transcoder configuration could not be applied
    #[error("Configuration error: {0}")]
    Config(String),

    /// Scratch file handling failed
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal failure whose details stay in the logs
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl SynthesisError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EngineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Inference(_) | Self::Transcode(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Error kind reported alongside the detail message
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::EngineUnavailable(_) => "engine_unavailable",
            Self::Inference(_) => "inference_error",
            Self::Transcode(_) => "transcode_error",
            Self::InvalidRequest(_) | Self::UnsupportedMediaType | Self::PayloadTooLarge(_) => "invalid_request_error",
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// Message safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
    r#type: &'static str,
}

impl IntoResponse for SynthesisError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            detail: self.client_message(),
            r#type: self.error_type(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}
