use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

/// Equality filters, ordering and a row cap for collection scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<(String, String)>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn newest_first(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(OrderBy { field: field.into(), descending: true });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Schemaless JSON documents grouped in named collections.
///
/// Documents are JSON objects keyed by `(collection, id)`. Lookups that miss
/// return `None`/`false` instead of an error so callers decide what a missing
/// document means.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    async fn list(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Value>, StoreError>;

    /// Shallow-merges the top-level keys of `patch` into the stored document
    /// and returns the merged result.
    async fn merge(&self, collection: &str, id: &str, patch: Value) -> Result<Option<Value>, StoreError>;

    /// Adds `delta` to the integer `field` in one atomic write, flooring the
    /// result at zero, and merges `patch` in the same write. Returns the new
    /// value.
    async fn increment_clamped(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
        patch: Value,
    ) -> Result<Option<i64>, StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    async fn check_connection(&self) -> Result<(), StoreError>;

    /// Human-readable backend name for status endpoints.
    fn backend_name(&self) -> &'static str;
}

#[async_trait]
impl<T> DocumentStore for Arc<T>
where
    T: DocumentStore + ?Sized,
{
    async fn create(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        (**self).create(collection, id, document).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(collection, id).await
    }

    async fn list(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Value>, StoreError> {
        (**self).list(collection, query).await
    }

    async fn merge(&self, collection: &str, id: &str, patch: Value) -> Result<Option<Value>, StoreError> {
        (**self).merge(collection, id, patch).await
    }

    async fn increment_clamped(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
        patch: Value,
    ) -> Result<Option<i64>, StoreError> {
        (**self).increment_clamped(collection, id, field, delta, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        (**self).delete(collection, id).await
    }

    async fn check_connection(&self) -> Result<(), StoreError> {
        (**self).check_connection().await
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
