use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

use crate::entities::{timestamp, Document};

const MAX_NAME_LENGTH: u64 = 100;
const MAX_WISH_LENGTH: u64 = 5000;
const MAX_SHORT_FIELD_LENGTH: u64 = 100;
const MAX_PROMPT_LENGTH: u64 = 1000;
const DEFAULT_LANGUAGE: &str = "en";
const UNSPECIFIED: &str = "unspecified";

// ───── Stored Models ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WishItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub wish: String,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub artwork_style: Option<String>,
    #[serde(default)]
    pub artwork_prompt: Option<String>,
    pub language: String,
    pub likes: u64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Document for WishItem {
    fn id(&self) -> &str {
        &self.id
    }
}

// ───── Request Models ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewWishRequest {
    #[validate(
        length(max = MAX_NAME_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(length(max = MAX_SHORT_FIELD_LENGTH))]
    pub relation: Option<String>,

    #[validate(
        length(max = MAX_SHORT_FIELD_LENGTH),
        custom(function = "validate_optional_email")
    )]
    pub email: Option<String>,

    #[validate(
        length(max = MAX_WISH_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub wish: String,

    #[validate(length(max = MAX_SHORT_FIELD_LENGTH))]
    pub tone: Option<String>,

    #[validate(length(max = MAX_SHORT_FIELD_LENGTH))]
    pub artwork_style: Option<String>,

    #[validate(length(max = MAX_PROMPT_LENGTH))]
    pub artwork_prompt: Option<String>,

    #[validate(length(max = MAX_SHORT_FIELD_LENGTH))]
    pub language: Option<String>,
}

impl NewWishRequest {
    pub fn prepare_for_insert(self, id: String) -> WishItem {
        let now = timestamp::now();

        WishItem {
            id,
            name: self.name.trim().to_string(),
            relation: non_blank(self.relation),
            email: non_blank(self.email),
            wish: self.wish.trim().to_string(),
            tone: non_blank(self.tone).map(|t| t.to_lowercase()),
            artwork_style: non_blank(self.artwork_style),
            artwork_prompt: non_blank(self.artwork_prompt),
            language: non_blank(self.language)
                .map(|l| l.to_lowercase())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            likes: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWishRequest {
    #[validate(
        length(max = MAX_NAME_LENGTH),
        custom(function = "validate_not_blank")
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[validate(length(max = MAX_SHORT_FIELD_LENGTH))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,

    #[validate(
        length(max = MAX_SHORT_FIELD_LENGTH),
        custom(function = "validate_optional_email")
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[validate(
        length(max = MAX_WISH_LENGTH),
        custom(function = "validate_not_blank")
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wish: Option<String>,

    #[validate(length(max = MAX_SHORT_FIELD_LENGTH))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,

    #[validate(length(max = MAX_SHORT_FIELD_LENGTH))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_style: Option<String>,

    #[validate(length(max = MAX_PROMPT_LENGTH))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_prompt: Option<String>,

    #[validate(length(max = MAX_SHORT_FIELD_LENGTH))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Tone and language are matched case-insensitively; both are stored lowercase.
#[derive(Debug, Default, Deserialize)]
pub struct ListWishesQuery {
    pub language: Option<String>,
    pub tone: Option<String>,
}

// ───── Statistics ────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WishStats {
    pub total: u64,
    pub total_likes: u64,
    pub by_tone: BTreeMap<String, u64>,
    pub by_language: BTreeMap<String, u64>,
    pub by_relation: BTreeMap<String, u64>,
    pub latest_at: Option<String>,
}

impl WishStats {
    /// Single pass over the collection.
    pub fn tally<'a>(wishes: impl IntoIterator<Item = &'a WishItem>) -> Self {
        let mut stats = WishStats::default();
        let mut latest: Option<DateTime<Utc>> = None;

        for wish in wishes {
            stats.total += 1;
            stats.total_likes += wish.likes;
            *stats.by_tone.entry(bucket(wish.tone.as_deref())).or_default() += 1;
            *stats.by_language.entry(bucket(Some(&wish.language))).or_default() += 1;
            *stats.by_relation.entry(bucket(wish.relation.as_deref())).or_default() += 1;

            if latest.map_or(true, |l| wish.created_at > l) {
                latest = Some(wish.created_at);
            }
        }

        stats.latest_at = latest.as_ref().map(timestamp::format);
        stats
    }
}

// ───── Helper Functions ──────────────────────────────────────────────

fn bucket(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_lowercase(),
        _ => UNSPECIFIED.to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Field is required".into());
        return Err(err);
    }
    Ok(())
}

/// Blank counts as absent so an update can clear the address.
fn validate_optional_email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.validate_email() {
        return Ok(());
    }
    let mut err = ValidationError::new("email");
    err.message = Some("Invalid email format".into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, wish: &str) -> NewWishRequest {
        NewWishRequest {
            name: name.into(),
            relation: None,
            email: None,
            wish: wish.into(),
            tone: None,
            artwork_style: None,
            artwork_prompt: None,
            language: None,
        }
    }

    #[test]
    fn blank_name_fails_validation() {
        assert!(request("   ", "Congratulations!").validate().is_err());
        assert!(request("Ana", "").validate().is_err());
        assert!(request("Ana", "Congratulations!").validate().is_ok());
    }

    #[test]
    fn insert_defaults_language_and_trims() {
        let mut req = request("  Ana ", " Be happy ");
        req.tone = Some("  ".into());

        let wish = req.prepare_for_insert("w1".into());
        assert_eq!(wish.name, "Ana");
        assert_eq!(wish.wish, "Be happy");
        assert_eq!(wish.language, "en");
        assert_eq!(wish.tone, None);
        assert_eq!(wish.likes, 0);
    }

    #[test]
    fn email_is_checked_only_when_present() {
        let mut req = request("Ana", "Cheers");
        req.email = Some("not-an-email".into());
        assert!(req.validate().is_err());

        req.email = Some(" ana@example.com ".into());
        assert!(req.validate().is_ok());

        req.email = Some("".into());
        assert!(req.validate().is_ok());

        let update = UpdateWishRequest {
            email: Some("ana@".into()),
            ..Default::default()
        };
        let errors = update.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn insert_lowercases_tone_and_language() {
        let mut req = request("Ana", "Cheers");
        req.tone = Some(" Funny ".into());
        req.language = Some("VI".into());

        let wish = req.prepare_for_insert("w1".into());
        assert_eq!(wish.tone.as_deref(), Some("funny"));
        assert_eq!(wish.language, "vi");
    }

    #[test]
    fn tally_counts_by_category() {
        let mut first = request("Ana", "Cheers").prepare_for_insert("1".into());
        first.tone = Some("Funny".into());
        first.relation = Some("friend".into());
        first.likes = 3;

        let mut second = request("Ben", "Love").prepare_for_insert("2".into());
        second.tone = Some("heartfelt".into());
        second.language = "vi".into();
        second.likes = 2;
        second.created_at = first.created_at + chrono::Duration::seconds(5);

        let third = request("Cy", "Yay").prepare_for_insert("3".into());

        let stats = WishStats::tally([&first, &second, &third]);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.total_likes, 5);
        assert_eq!(stats.by_tone["funny"], 1);
        assert_eq!(stats.by_tone["heartfelt"], 1);
        assert_eq!(stats.by_tone["unspecified"], 1);
        assert_eq!(stats.by_language["en"], 2);
        assert_eq!(stats.by_language["vi"], 1);
        assert_eq!(stats.by_relation["friend"], 1);
        assert_eq!(stats.by_relation["unspecified"], 2);
        assert_eq!(stats.latest_at, Some(timestamp::format(&second.created_at)));
    }

    #[test]
    fn tally_of_nothing_is_empty() {
        let stats = WishStats::tally(std::iter::empty());
        assert_eq!(stats, WishStats::default());
    }
}
