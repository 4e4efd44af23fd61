pub mod storage_key;
pub mod upload_file;
pub mod valid_id;
