pub mod collection;
pub mod document_store;
pub mod memory_repo;
pub mod sqlx_repo;
