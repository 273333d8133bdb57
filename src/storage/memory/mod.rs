pub mod memory_shared_store;
