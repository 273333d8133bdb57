use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// A request queued in the target node's shared wake queue, asking one of its
/// instances to become active.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WakeRequest {
    pub from: String,
    pub to: String,
    pub target_instance: String,
    pub reason: String,
    #[serde(default)]
    pub priority: Priority,
    pub timestamp: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WakeContext {
    pub cross_computer: bool,
    pub source_node: String,
}

/// The local artifact a drained wake request turns into. Keyed by instance
/// and overwritten: a second request for the same instance replaces the
/// first, it does not queue.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WakeFlag {
    pub from: String,
    pub timestamp: i64,
    pub reason: String,
    pub priority: Priority,
    pub context: WakeContext,
}

impl WakeFlag {
    pub fn from_request(request: &WakeRequest, timestamp: i64) -> Self {
        Self {
            from: format!("Node {} (shared-folder sync)", request.from),
            timestamp,
            reason: request.reason.clone(),
            priority: request.priority.clone(),
            context: WakeContext {
                cross_computer: true,
                source_node: request.from.clone(),
            },
        }
    }
}
