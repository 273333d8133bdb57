pub mod s3_client;
pub mod s3_shared_store;
