pub mod media;
pub mod wishes;
