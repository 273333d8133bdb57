pub mod file_shared_store;
