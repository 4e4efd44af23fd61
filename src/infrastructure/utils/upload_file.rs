use std::{io, path::Path};

use bytes::Bytes;
use derive_more::Display;
use tokio::fs;

use crate::errors::AppError;

const GENERIC_MIME: &str = "application/octet-stream";
const FALLBACK_NAME: &str = "upload";

/// A multipart file part read fully into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Bytes,
    pub original_name: String,
    pub mime_type: String,
}

/// Reads an uploaded temp file and settles its MIME type.
///
/// - `original_filename`: the client-supplied name from `TempFile::file_name`
/// - `declared_mime`: the part's `Content-Type`, if any
/// - `file_path`: the path from `TempFile::file.path()`
/// - `max_size`: max size in bytes
///
/// The declared type wins unless it is missing or generic, in which case the
/// type is sniffed from the file's magic bytes.
pub async fn read_uploaded_file(
    original_filename: Option<&str>,
    declared_mime: Option<&str>,
    file_path: &Path,
    max_size: usize,
) -> Result<UploadedFile, UploadError> {
    // 1. Size check before buffering
    let metadata = fs::metadata(file_path)
        .await
        .map_err(UploadError::IoError)?;
    if metadata.len() > max_size as u64 {
        return Err(UploadError::FileTooLarge(max_size));
    }

    // 2. Read content
    let bytes = fs::read(file_path)
        .await
        .map_err(UploadError::IoError)?;
    if bytes.is_empty() {
        return Err(UploadError::EmptyFile);
    }

    // 3. MIME resolution
    let declared = declared_mime
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty() && m != GENERIC_MIME);
    let mime_type = declared
        .or_else(|| infer::get(&bytes).map(|kind| kind.mime_type().to_string()))
        .unwrap_or_else(|| GENERIC_MIME.to_string());

    Ok(UploadedFile {
        bytes: Bytes::from(bytes),
        original_name: sanitize_file_name(original_filename),
        mime_type,
    })
}

/// Keeps only the final path component of a client-supplied name.
pub fn sanitize_file_name(original_filename: Option<&str>) -> String {
    original_filename
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_NAME)
        .to_string()
}

/// All errors related to reading an uploaded file.
#[derive(Debug, Display)]
pub enum UploadError {
    #[display("Uploaded file is empty.")]
    EmptyFile,

    #[display("File size exceeds the maximum of {_0} bytes.")]
    FileTooLarge(usize),

    #[display("Failed to read uploaded file: {_0}")]
    IoError(io::Error),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::EmptyFile => AppError::InvalidInput(err.to_string()),
            UploadError::FileTooLarge(_) => AppError::PayloadTooLarge(err.to_string()),
            UploadError::IoError(_) => AppError::InternalError(err.to_string()),
        }
    }
}
