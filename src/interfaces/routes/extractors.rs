use actix_multipart::form::MultipartFormConfig;
use actix_web::{
    error::{JsonPayloadError, QueryPayloadError},
    web,
};

use crate::{constants::JSON_BODY_LIMIT, errors::AppError};

/// Headroom over the file ceiling for the text fields and part headers.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Extractor limits and error handlers, so malformed bodies get the
/// standard envelope instead of actix's plain-text errors.
pub fn config_routes(cfg: &mut web::ServiceConfig, max_upload_bytes: usize) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(|err, _req| AppError::from(err).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::from(err).into()),
    )
    .app_data(
        MultipartFormConfig::default()
            .total_limit(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))
            .error_handler(|err, _req| AppError::from(err).into()),
    );
}

impl From<JsonPayloadError> for AppError {
    fn from(err: JsonPayloadError) -> Self {
        match err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                AppError::PayloadTooLarge(format!("JSON payload error: {}", err))
            }
            _ => AppError::InvalidInput(format!("JSON payload error: {}", err)),
        }
    }
}

impl From<QueryPayloadError> for AppError {
    fn from(err: QueryPayloadError) -> Self {
        AppError::InvalidInput(format!("Query error: {}", err))
    }
}
