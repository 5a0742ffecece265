use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::current_request_id;
use crate::models::ErrorResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to decode document: {message}")]
    Decode { message: String },

    #[error("Unsupported document format: {message}")]
    UnsupportedFormat { message: String },

    #[error("OCR engine failed: {message}")]
    OcrEngine { message: String },

    #[error("PDF rasterization failed: {message}")]
    Rasterization { message: String },

    #[error("Summarization failed: {message}")]
    Summarization { message: String },

    #[error("Summarization model unavailable: {model}")]
    ModelUnavailable { model: String },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid upload: {message}")]
    InvalidFile { message: String },

    #[error("Upload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Decode { .. } => "DECODE_ERROR",
            AppError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            AppError::OcrEngine { .. } => "OCR_ENGINE_ERROR",
            AppError::Rasterization { .. } => "RASTERIZATION_ERROR",
            AppError::Summarization { .. } => "SUMMARIZATION_ERROR",
            AppError::ModelUnavailable { .. } => "MODEL_UNAVAILABLE",
            AppError::MissingFile => "MISSING_FILE",
            AppError::InvalidFile { .. } => "INVALID_FILE",
            AppError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            AppError::Internal { .. } => "INTERNAL_ERROR",
            AppError::ConfigError { .. } => "CONFIG_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Decode { .. } => StatusCode::BAD_REQUEST,
            AppError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::OcrEngine { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Rasterization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Summarization { .. } => StatusCode::BAD_GATEWAY,
            AppError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::InvalidFile { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_kind = self.error_code();
        let message = self.to_string();
        let request_id = current_request_id().unwrap_or_else(|| Uuid::new_v4().to_string());

        tracing::error!(
            error_kind = error_kind,
            status_code = %status,
            request_id = %request_id,
            error_message = %message,
            "API error occurred"
        );

        let body = Json(ErrorResponse {
            error_kind: error_kind.to_string(),
            message,
            request_id,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal {
            message: format!("Extraction task failed: {}", err),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Decode {
            message: format!("invalid image: {}", err),
        }
    }
}

impl From<lopdf::Error> for AppError {
    fn from(err: lopdf::Error) -> Self {
        AppError::Decode {
            message: format!("invalid PDF: {}", err),
        }
    }
}

// Helper methods for creating specific errors
impl AppError {
    pub fn decode(message: impl Into<String>) -> Self {
        AppError::Decode {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        AppError::UnsupportedFormat {
            message: message.into(),
        }
    }

    pub fn ocr(message: impl Into<String>) -> Self {
        AppError::OcrEngine {
            message: message.into(),
        }
    }

    pub fn rasterization(message: impl Into<String>) -> Self {
        AppError::Rasterization {
            message: message.into(),
        }
    }

    pub fn summarization(message: impl Into<String>) -> Self {
        AppError::Summarization {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        AppError::ConfigError {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
