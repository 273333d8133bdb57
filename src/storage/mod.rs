pub mod file;
pub mod local_queue;
pub mod memory;
pub mod s3;
pub mod shared_store_impl;
