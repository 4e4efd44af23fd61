use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    entities::Document,
    errors::StoreError,
    repositories::document_store::{DocumentQuery, DocumentStore},
};

/// Typed view over one named collection of a [`DocumentStore`].
pub struct Collection<D, T>
where
    D: DocumentStore,
{
    store: D,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<D, T> Collection<D, T>
where
    D: DocumentStore,
    T: Document + Serialize + DeserializeOwned,
{
    pub fn new(store: D, name: impl Into<String>) -> Self {
        Collection {
            store,
            name: name.into(),
            _marker: PhantomData,
        }
    }

    pub async fn insert(&self, document: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(document)?;
        self.store.create(&self.name, document.id(), value).await
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.store
            .get(&self.name, id)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn list(&self, query: &DocumentQuery) -> Result<Vec<T>, StoreError> {
        self.store
            .list(&self.name, query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn merge(&self, id: &str, patch: Value) -> Result<Option<T>, StoreError> {
        self.store
            .merge(&self.name, id, patch)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn increment_clamped(
        &self,
        id: &str,
        field: &str,
        delta: i64,
        patch: Value,
    ) -> Result<Option<i64>, StoreError> {
        self.store
            .increment_clamped(&self.name, id, field, delta, patch)
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(&self.name, id).await
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(StoreError::from)
}
