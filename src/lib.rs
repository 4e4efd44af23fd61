use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, imaging, storage, utils, web};

use repositories::{
    document_store::DocumentStore, memory_repo::MemoryDocumentStore, sqlx_repo::SqlxDocumentStore,
};
use settings::{AppConfig, DocumentBackend, ObjectBackend};
use storage::{memory::MemoryObjectStore, s3::S3ObjectStore, ObjectStore};
use use_cases::{media::MediaHandler, wishes::WishHandler};

pub type SharedDocumentStore = Arc<dyn DocumentStore>;
pub type SharedObjectStore = Arc<dyn ObjectStore>;

pub type AppMediaHandler = MediaHandler<SharedDocumentStore, SharedObjectStore>;
pub type AppWishHandler = WishHandler<SharedDocumentStore>;

pub struct AppState {
    pub media_handler: AppMediaHandler,
    pub wish_handler: AppWishHandler,
    pub document_store: SharedDocumentStore,
    pub object_store: SharedObjectStore,
    pub default_collection: String,
    pub project_id: String,
    pub app_name: String,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        document_store: SharedDocumentStore,
        object_store: SharedObjectStore,
    ) -> Self {
        let media_handler = MediaHandler::new(
            document_store.clone(),
            config.media_collection.clone(),
            object_store.clone(),
        );
        let wish_handler = WishHandler::new(document_store.clone(), config.wishes_collection.clone());

        AppState {
            media_handler,
            wish_handler,
            document_store,
            object_store,
            default_collection: config.default_collection.clone(),
            project_id: config.project_id.clone(),
            app_name: config.name.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Connects the backends selected in `config`. The Postgres backend gets
    /// its schema created on first use.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let document_store: SharedDocumentStore = match config.document_store {
            DocumentBackend::Postgres => {
                let pool = db::postgres::create_pool(&config.database_url).await?;
                db::postgres::ensure_schema(&pool).await?;
                Arc::new(SqlxDocumentStore::new(pool))
            }
            DocumentBackend::Memory => {
                tracing::warn!("Using the in-memory document store; data is lost on restart");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        let object_store: SharedObjectStore = match config.object_store {
            ObjectBackend::S3 => Arc::new(S3ObjectStore::new(config).await),
            ObjectBackend::Memory => {
                tracing::warn!("Using the in-memory object store; uploads are lost on restart");
                Arc::new(MemoryObjectStore::new(config.storage_bucket.clone()))
            }
        };

        Ok(AppState::new(config, document_store, object_store))
    }
}
