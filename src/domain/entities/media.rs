use std::fmt;

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::{timestamp, Document};

const MAX_TITLE_LENGTH: u64 = 200;
const MAX_DATE_LENGTH: u64 = 64;

// ───── Stored Models ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
}

impl MediaType {
    /// Classifies a MIME type by its top-level prefix.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if mime_type.starts_with("image/") {
            Some(MediaType::Photo)
        } else if mime_type.starts_with("video/") {
            Some(MediaType::Video)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Photo => "photo",
            MediaType::Video => "video",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub url: String,
    pub thumbnail: String,
    pub title: String,
    pub date: String,
    pub likes: u64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub original_name: String,
    pub file_size: u64,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_key: Option<String>,
}

impl Document for MediaItem {
    fn id(&self) -> &str {
        &self.id
    }
}

// ───── Request Models ────────────────────────────────────────────────

/// Multipart body of `POST /api/media/upload`.
#[derive(Debug, MultipartForm)]
pub struct MediaUploadForm {
    #[multipart(rename = "media")]
    pub media: Option<TempFile>,

    pub title: Option<Text<String>>,

    #[multipart(rename = "type")]
    pub media_type: Option<Text<String>>,

    pub date: Option<Text<String>>,
}

/// A fully buffered upload, ready for the media pipeline.
#[derive(Debug, Clone)]
pub struct NewMediaUpload {
    pub bytes: Bytes,
    pub original_name: String,
    pub mime_type: String,
    pub title: Option<String>,
    pub date: Option<String>,
    pub requested_type: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMediaRequest {
    #[validate(length(max = MAX_TITLE_LENGTH))]
    pub title: Option<String>,

    #[validate(length(max = MAX_DATE_LENGTH))]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Like,
    Unlike,
}

impl LikeAction {
    pub fn delta(&self) -> i64 {
        match self {
            LikeAction::Like => 1,
            LikeAction::Unlike => -1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeRequest {
    pub action: LikeAction,
}

#[derive(Debug, Deserialize)]
pub struct ListMediaQuery {
    #[serde(rename = "type")]
    pub media_type: Option<MediaType>,
}

// ───── Response Models ───────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LikeResponse {
    pub likes: u64,
}
