pub mod agent;
pub mod consolidator;
pub mod health_monitor;
pub mod loader;
pub mod rest_server;
