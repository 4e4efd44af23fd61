use std::fmt;

use actix_multipart::MultipartError;
use actix_web::{
    error::{PayloadError, ResponseError},
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use once_cell::sync::OnceCell;
use serde::Serialize;
use validator::ValidationErrors;

use crate::entities::envelope::ApiResponse;

/// Set once at startup. When true, 5xx responses carry no error detail.
static HIDE_ERROR_DETAILS: OnceCell<bool> = OnceCell::new();

pub fn hide_error_details(hide: bool) {
    if HIDE_ERROR_DETAILS.set(hide).is_err() {
        tracing::debug!("Error detail visibility already configured");
    }
}

fn error_details_hidden() -> bool {
    HIDE_ERROR_DETAILS.get().copied().unwrap_or(false)
}

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    InvalidInput(String),
    NotFound(String),
    PayloadTooLarge(String),
    StoreError(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::InvalidInput(msg) => write!(f, "{}", msg),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "{}", msg),
            AppError::StoreError(msg) => write!(f, "Store operation failed: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl AppError {
    /// Short machine-readable kind, used as the envelope `error` for client errors.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::StoreError(_) => "store_error",
            AppError::InternalError(_) => "internal_server_error",
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            let detail = (!error_details_hidden()).then(|| self.to_string());
            ApiResponse::<()>::failure("Internal server error", detail)
        } else {
            ApiResponse::<()>::failure(self.to_string(), Some(self.kind().to_string()))
        };

        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();

        AppError::ValidationError(field_errors)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StoreError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("Malformed document: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::Payload(PayloadError::Overflow) => {
                AppError::PayloadTooLarge("File too large".to_string())
            }
            MultipartError::ContentTypeMissing
            | MultipartError::ContentTypeParse
            | MultipartError::ContentTypeIncompatible => {
                AppError::InvalidInput("Request must be multipart/form-data".to_string())
            }
            _ => AppError::InvalidInput(format!("Invalid multipart payload: {}", err)),
        }
    }
}

/// Failures raised by the document and object store clients.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display("Document store error: {_0}")]
    Document(String),

    #[display("Object store error: {_0}")]
    Object(String),

    #[display("Serialization error: {_0}")]
    Serialization(String),

    #[display("Store unavailable: {_0}")]
    Unavailable(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Document(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
