#![allow(clippy::async_fn_in_trait)]
pub mod common;
pub mod handler;
pub mod rest;
pub mod server;
pub mod storage;
pub mod traits;

pub use server::agent::agent_start;
pub use server::consolidator::consolidator_start;
pub use server::health_monitor::health_monitor_start;
