use bytes::Bytes;
use chrono::SecondsFormat;
use futures::future::join_all;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        media::{LikeAction, LikeResponse, MediaItem, MediaType, NewMediaUpload, UpdateMediaRequest},
        timestamp,
    },
    errors::{AppError, StoreError},
    imaging::{self, ResizeSpec},
    repositories::{
        collection::Collection,
        document_store::{DocumentQuery, DocumentStore},
    },
    storage::ObjectStore,
    utils::{
        storage_key::{key_from_url, media_key, thumbnail_key},
        valid_id::valid_document_id,
    },
};

const THUMBNAIL_MIME: &str = "image/jpeg";

pub struct MediaHandler<D, O>
where
    D: DocumentStore,
    O: ObjectStore,
{
    pub media: Collection<D, MediaItem>,
    pub objects: O,
    pub main_image: ResizeSpec,
    pub thumbnail: ResizeSpec,
}

impl<D, O> MediaHandler<D, O>
where
    D: DocumentStore,
    O: ObjectStore,
{
    pub fn new(documents: D, collection: impl Into<String>, objects: O) -> Self {
        MediaHandler {
            media: Collection::new(documents, collection),
            objects,
            main_image: imaging::MAIN_IMAGE,
            thumbnail: imaging::THUMBNAIL,
        }
    }

    /// Stores an uploaded photo or video and records its metadata.
    ///
    /// Photos are downscaled and get a square thumbnail; both steps fall back
    /// (original bytes, primary URL) instead of failing the upload. The blob
    /// is written before the document, and nothing is rolled back if the
    /// document write fails.
    #[instrument(skip(self, upload), fields(name = %upload.original_name, mime = %upload.mime_type, size = upload.bytes.len()))]
    pub async fn upload_media(&self, upload: NewMediaUpload) -> Result<MediaItem, AppError> {
        let media_type = MediaType::from_mime(&upload.mime_type).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Unsupported file type '{}'. Only images and videos are allowed.",
                upload.mime_type
            ))
        })?;

        if let Some(requested) = upload.requested_type.as_deref().map(str::trim) {
            if !requested.is_empty() && !requested.eq_ignore_ascii_case(media_type.as_str()) {
                warn!(requested, detected = %media_type, "Ignoring requested media type");
            }
        }

        let id = Uuid::new_v4().to_string();
        let storage_key = media_key(&id, &upload.original_name, &upload.mime_type);
        let file_size = upload.bytes.len() as u64;

        let (body, content_type) = match media_type {
            MediaType::Photo => self.downscale(&id, upload.bytes.clone(), &upload.mime_type).await,
            MediaType::Video => (upload.bytes.clone(), upload.mime_type.clone()),
        };

        let url = self.objects.put(&storage_key, body.clone(), &content_type).await?;

        let (thumbnail, thumbnail_key) = match media_type {
            MediaType::Photo => match self.store_thumbnail(&id, body).await {
                Ok((thumb_url, key)) => (thumb_url, Some(key)),
                Err(e) => {
                    warn!(media_id = %id, error = %e, "Thumbnail generation failed, using primary URL");
                    (url.clone(), None)
                }
            },
            MediaType::Video => (url.clone(), None),
        };

        let now = timestamp::now();
        let item = MediaItem {
            id: id.clone(),
            media_type,
            url,
            thumbnail,
            title: non_blank(upload.title).unwrap_or_else(|| format!("Untitled {}", media_type)),
            date: non_blank(upload.date)
                .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            likes: 0,
            created_at: now,
            updated_at: now,
            original_name: upload.original_name,
            file_size,
            mime_type: upload.mime_type,
            storage_key: Some(storage_key),
            thumbnail_key,
        };

        self.media.insert(&item).await?;

        info!(media_id = %item.id, media_type = %item.media_type, "Media uploaded");
        Ok(item)
    }

    /// All media, newest first. Optionally restricted to one media type.
    pub async fn list_media(&self, media_type: Option<MediaType>) -> Result<Vec<MediaItem>, AppError> {
        let mut query = DocumentQuery::new().newest_first("createdAt");
        if let Some(media_type) = media_type {
            query = query.filter("type", media_type.as_str());
        }

        Ok(self.media.list(&query).await?)
    }

    pub async fn get_media(&self, id: &str) -> Result<MediaItem, AppError> {
        valid_document_id(id, "Media")?;

        self.media
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))
    }

    /// Merges the supplied fields. Unknown ids are reported as not found
    /// rather than created.
    pub async fn update_media(&self, id: &str, update: UpdateMediaRequest) -> Result<MediaItem, AppError> {
        update.validate()?;
        self.get_media(id).await?;

        let mut patch = json!({ "updatedAt": timestamp::format(&timestamp::now()) });
        if let Some(title) = update.title {
            patch["title"] = json!(title);
        }
        if let Some(date) = update.date {
            patch["date"] = json!(date);
        }

        self.media
            .merge(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))
    }

    /// Removes the blobs best-effort, then the metadata document.
    #[instrument(skip(self))]
    pub async fn delete_media(&self, id: &str) -> Result<(), AppError> {
        let item = self.get_media(id).await?;

        let primary = item.storage_key.clone().or_else(|| key_from_url(&item.url));
        let thumbnail = if item.thumbnail != item.url {
            item.thumbnail_key.clone().or_else(|| key_from_url(&item.thumbnail))
        } else {
            None
        };

        let keys: Vec<String> = [primary, thumbnail].into_iter().flatten().collect();
        let results = join_all(keys.iter().map(|key| self.objects.delete(key))).await;

        for (key, result) in keys.iter().zip(results) {
            if let Err(e) = result {
                warn!(media_id = %item.id, key = %key, error = %e, "Failed to delete media object");
            }
        }

        if !self.media.remove(id).await? {
            return Err(AppError::NotFound("Media not found".to_string()));
        }

        info!(media_id = %item.id, "Media deleted");
        Ok(())
    }

    /// Applies a like/unlike as one atomic counter update. Unlike stops at zero.
    pub async fn like_media(&self, id: &str, action: LikeAction) -> Result<LikeResponse, AppError> {
        valid_document_id(id, "Media")?;

        let patch = json!({ "updatedAt": timestamp::format(&timestamp::now()) });

        self.media
            .increment_clamped(id, "likes", action.delta(), patch)
            .await?
            .map(|likes| LikeResponse { likes: likes.max(0) as u64 })
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))
    }

    async fn downscale(&self, id: &str, original: Bytes, mime_type: &str) -> (Bytes, String) {
        match imaging::transform_blocking(original.clone(), self.main_image).await {
            Ok(jpeg) => (jpeg, "image/jpeg".to_string()),
            Err(e) => {
                warn!(media_id = %id, error = %e, "Image transcoding failed, storing original bytes");
                (original, mime_type.to_string())
            }
        }
    }

    async fn store_thumbnail(&self, id: &str, source: Bytes) -> Result<(String, String), ThumbnailError> {
        let jpeg = imaging::transform_blocking(source, self.thumbnail)
            .await
            .map_err(|e| ThumbnailError(e.to_string()))?;

        let key = thumbnail_key(id);
        let url = self.objects
            .put(&key, jpeg, THUMBNAIL_MIME)
            .await
            .map_err(|e: StoreError| ThumbnailError(e.to_string()))?;

        Ok((url, key))
    }
}

#[derive(Debug, derive_more::Display)]
#[display("{_0}")]
struct ThumbnailError(String);

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
