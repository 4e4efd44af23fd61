use uuid::Uuid;

use crate::errors::AppError;

/// Document ids are UUIDs; anything else cannot name a stored document.
pub fn valid_document_id(id: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::NotFound(format!("{what} not found")))
}
