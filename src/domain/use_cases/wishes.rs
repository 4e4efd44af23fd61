use serde_json::{json, Map, Value};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        media::{LikeAction, LikeResponse},
        timestamp,
        wish::{ListWishesQuery, NewWishRequest, UpdateWishRequest, WishItem, WishStats},
    },
    errors::AppError,
    repositories::{
        collection::Collection,
        document_store::{DocumentQuery, DocumentStore},
    },
    utils::valid_id::valid_document_id,
};

/// Fields that may be cleared by sending a blank string.
const OPTIONAL_FIELDS: [&str; 5] = ["relation", "email", "tone", "artworkStyle", "artworkPrompt"];

/// Fields stored lowercase so list filters match regardless of case.
const LOWERCASE_FIELDS: [&str; 2] = ["tone", "language"];

pub struct WishHandler<D>
where
    D: DocumentStore,
{
    pub wishes: Collection<D, WishItem>,
}

impl<D> WishHandler<D>
where
    D: DocumentStore,
{
    pub fn new(documents: D, collection: impl Into<String>) -> Self {
        WishHandler {
            wishes: Collection::new(documents, collection),
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_wish(&self, request: NewWishRequest) -> Result<WishItem, AppError> {
        request.validate()?;

        let wish = request.prepare_for_insert(Uuid::new_v4().to_string());
        self.wishes.insert(&wish).await?;

        info!(wish_id = %wish.id, "Wish created");
        Ok(wish)
    }

    /// Newest first, optionally narrowed by language and/or tone.
    pub async fn list_wishes(&self, query: ListWishesQuery) -> Result<Vec<WishItem>, AppError> {
        let mut document_query = DocumentQuery::new().newest_first("createdAt");

        if let Some(language) = query.language.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            document_query = document_query.filter("language", language.to_lowercase());
        }
        if let Some(tone) = query.tone.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            document_query = document_query.filter("tone", tone.to_lowercase());
        }

        Ok(self.wishes.list(&document_query).await?)
    }

    pub async fn get_wish(&self, id: &str) -> Result<WishItem, AppError> {
        valid_document_id(id, "Wish")?;

        self.wishes
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Wish not found".to_string()))
    }

    pub async fn update_wish(&self, id: &str, update: UpdateWishRequest) -> Result<WishItem, AppError> {
        update.validate()?;
        self.get_wish(id).await?;

        let patch = update_patch(update)?;

        self.wishes
            .merge(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Wish not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn delete_wish(&self, id: &str) -> Result<(), AppError> {
        valid_document_id(id, "Wish")?;

        if !self.wishes.remove(id).await? {
            return Err(AppError::NotFound("Wish not found".to_string()));
        }

        info!(wish_id = %id, "Wish deleted");
        Ok(())
    }

    pub async fn like_wish(&self, id: &str, action: LikeAction) -> Result<LikeResponse, AppError> {
        valid_document_id(id, "Wish")?;

        let patch = json!({ "updatedAt": timestamp::format(&timestamp::now()) });

        self.wishes
            .increment_clamped(id, "likes", action.delta(), patch)
            .await?
            .map(|likes| LikeResponse { likes: likes.max(0) as u64 })
            .ok_or_else(|| AppError::NotFound("Wish not found".to_string()))
    }

    pub async fn wish_stats(&self) -> Result<WishStats, AppError> {
        let wishes = self.wishes.list(&DocumentQuery::new()).await?;
        Ok(WishStats::tally(&wishes))
    }
}

/// Turns a validated update into a merge patch: strings are trimmed, blank
/// optional fields become `null`, tone and language are lowercased, and
/// `updatedAt` is refreshed.
fn update_patch(update: UpdateWishRequest) -> Result<Value, AppError> {
    let mut patch: Map<String, Value> = match serde_json::to_value(update)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    for (field, value) in patch.iter_mut() {
        if let Value::String(s) = value {
            let trimmed = s.trim();
            *value = if trimmed.is_empty() && OPTIONAL_FIELDS.contains(&field.as_str()) {
                Value::Null
            } else if LOWERCASE_FIELDS.contains(&field.as_str()) {
                Value::String(trimmed.to_lowercase())
            } else {
                Value::String(trimmed.to_string())
            };
        }
    }

    if matches!(patch.get("language"), Some(Value::String(l)) if l.is_empty()) {
        patch.remove("language");
    }

    patch.insert(
        "updatedAt".to_string(),
        Value::String(timestamp::format(&timestamp::now())),
    );

    Ok(Value::Object(patch))
}
