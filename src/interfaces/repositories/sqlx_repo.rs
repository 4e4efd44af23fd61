use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};

use crate::{
    errors::StoreError,
    repositories::document_store::{DocumentQuery, DocumentStore},
};

/// Document store backed by a single PostgreSQL `documents` table with a
/// JSONB payload column. See `db::postgres::ensure_schema`.
#[derive(Clone)]
pub struct SqlxDocumentStore {
    pub pool: PgPool,
}

impl SqlxDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        SqlxDocumentStore { pool }
    }
}

#[async_trait]
impl DocumentStore for SqlxDocumentStore {
    async fn create(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            "#
        )
        .bind(collection)
        .bind(id)
        .bind(Json(document))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let document: Option<Json<Value>> = sqlx::query_scalar(
            r#"SELECT data FROM documents WHERE collection = $1 AND id = $2"#
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document.map(|Json(value)| value))
    }

    async fn list(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Value>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT data FROM documents WHERE collection = ");
        builder.push_bind(collection);

        for (field, value) in &query.filters {
            builder.push(" AND data->>(");
            builder.push_bind(field);
            builder.push("::text) = ");
            builder.push_bind(value);
        }

        match &query.order_by {
            Some(order) => {
                let direction = if order.descending { "DESC" } else { "ASC" };
                builder.push(" ORDER BY data->>(");
                builder.push_bind(&order.field);
                builder.push(format!("::text) {direction}, seq {direction}"));
            }
            None => {
                builder.push(" ORDER BY seq ASC");
            }
        }

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit as i64);
        }

        let documents: Vec<Json<Value>> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await?;

        Ok(documents.into_iter().map(|Json(value)| value).collect())
    }

    async fn merge(&self, collection: &str, id: &str, patch: Value) -> Result<Option<Value>, StoreError> {
        let merged: Option<Json<Value>> = sqlx::query_scalar(
            r#"
            UPDATE documents
            SET data = data || $3
            WHERE collection = $1 AND id = $2
            RETURNING data
            "#
        )
        .bind(collection)
        .bind(id)
        .bind(Json(patch))
        .fetch_optional(&self.pool)
        .await?;

        Ok(merged.map(|Json(value)| value))
    }

    async fn increment_clamped(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
        patch: Value,
    ) -> Result<Option<i64>, StoreError> {
        // Row-level lock of the UPDATE makes concurrent increments serialize
        let value: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE documents
            SET data = data
                || jsonb_build_object(
                    $3::text,
                    GREATEST(COALESCE((data->>($3::text))::bigint, 0) + $4, 0)
                )
                || $5
            WHERE collection = $1 AND id = $2
            RETURNING (data->>($3::text))::bigint
            "#
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(delta)
        .bind(Json(patch))
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"DELETE FROM documents WHERE collection = $1 AND id = $2"#
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn check_connection(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
