pub mod clock;
pub mod config;
pub mod consolidated;
pub mod health;
pub mod layout;
pub mod message;
pub mod status;
pub mod utils;
pub mod wake;
