use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Seconds a `/health` result is reused.
pub const HEALTH_CACHE_SECS: i64 = 5;

/// Page cap of the `/docs` inspection endpoint.
pub const DOCS_PAGE_LIMIT: usize = 50;

/// Largest accepted JSON body.
pub const JSON_BODY_LIMIT: usize = 256 * 1024;
