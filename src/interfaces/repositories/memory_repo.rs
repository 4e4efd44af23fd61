use std::{
    cmp::Ordering as CmpOrdering,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::{
    errors::StoreError,
    repositories::document_store::{DocumentQuery, DocumentStore},
};

#[derive(Debug, Clone)]
struct StoredDocument {
    seq: u64,
    data: Map<String, Value>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_seq: AtomicU64,
    documents: DashMap<(String, String), StoredDocument>,
}

/// In-process document store for development and tests.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<MemoryInner>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.inner
            .documents
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .count()
    }
}

fn key(collection: &str, id: &str) -> (String, String) {
    (collection.to_string(), id.to_string())
}

fn as_object(document: Value) -> Result<Map<String, Value>, StoreError> {
    match document {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "documents must be JSON objects, got {}",
            other
        ))),
    }
}

fn field_as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        _ => field_as_text(a).cmp(&field_as_text(b)),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let data = as_object(document)?;
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);

        match self.inner.documents.entry(key(collection, id)) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::Document(format!(
                "document {collection}/{id} already exists"
            ))),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(StoredDocument { seq, data });
                Ok(())
            }
        }
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .inner
            .documents
            .get(&key(collection, id))
            .map(|doc| Value::Object(doc.data.clone())))
    }

    async fn list(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Value>, StoreError> {
        let mut matches: Vec<StoredDocument> = self
            .inner
            .documents
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .filter(|entry| {
                query.filters.iter().all(|(field, expected)| {
                    field_as_text(entry.value().data.get(field)).as_deref() == Some(expected.as_str())
                })
            })
            .map(|entry| entry.value().clone())
            .collect();

        match &query.order_by {
            Some(order) => matches.sort_by(|a, b| {
                let ordering = compare_fields(a.data.get(&order.field), b.data.get(&order.field))
                    .then(a.seq.cmp(&b.seq));
                if order.descending { ordering.reverse() } else { ordering }
            }),
            None => matches.sort_by_key(|doc| doc.seq),
        }

        if let Some(limit) = query.limit {
            matches.truncate(limit);
        }

        Ok(matches.into_iter().map(|doc| Value::Object(doc.data)).collect())
    }

    async fn merge(&self, collection: &str, id: &str, patch: Value) -> Result<Option<Value>, StoreError> {
        let patch = as_object(patch)?;

        Ok(self
            .inner
            .documents
            .get_mut(&key(collection, id))
            .map(|mut doc| {
                doc.data.extend(patch);
                Value::Object(doc.data.clone())
            }))
    }

    async fn increment_clamped(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
        patch: Value,
    ) -> Result<Option<i64>, StoreError> {
        let patch = as_object(patch)?;

        // The entry guard holds the shard lock for the whole read-modify-write
        Ok(self
            .inner
            .documents
            .get_mut(&key(collection, id))
            .map(|mut doc| {
                let current = doc.data.get(field).and_then(Value::as_i64).unwrap_or(0);
                let next = current.saturating_add(delta).max(0);
                doc.data.insert(field.to_string(), Value::from(next));
                doc.data.extend(patch);
                next
            }))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.documents.remove(&key(collection, id)).is_some())
    }

    async fn check_connection(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
