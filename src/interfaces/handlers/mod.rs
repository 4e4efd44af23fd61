pub mod home;
pub mod media;
pub mod system;
pub mod wishes;
