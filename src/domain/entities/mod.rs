pub mod envelope;
pub mod media;
pub mod timestamp;
pub mod wish;

/// A record stored in a document collection, keyed by its own id.
pub trait Document {
    fn id(&self) -> &str;
}
