pub mod consolidate;
pub mod context;
pub mod health_check;
pub mod inbound_messages;
pub mod outbound_messages;
pub mod peer_status;
pub mod publish_status;
pub mod wake_requests;
