use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lifecycle of one worker instance. `unknown` is what the agent publishes
/// when a local status artifact exists but cannot be read.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Active,
    Standby,
    NotActive,
    Error,
    Unknown,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Active => "active",
            InstanceStatus::Standby => "standby",
            InstanceStatus::NotActive => "not_active",
            InstanceStatus::Error => "error",
            InstanceStatus::Unknown => "unknown",
        }
    }
}

/// Locally-authored instance state. The agent only relays it; it never
/// mutates anything beyond filling in `unknown`/`not_active` placeholders.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InstanceState {
    pub status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstanceState {
    pub fn not_active() -> Self {
        Self {
            status: InstanceStatus::NotActive,
            current_task: None,
            last_activity: None,
            timestamp: None,
            error: None,
        }
    }

    pub fn unknown(error: String) -> Self {
        Self {
            status: InstanceStatus::Unknown,
            current_task: None,
            last_activity: None,
            timestamp: None,
            error: Some(error),
        }
    }
}

/// The whole-file status document a node publishes every sync cycle.
/// Overwritten wholesale; the file's mtime is the liveness signal.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub node_id: String,
    pub timestamp: i64,
    pub instances: IndexMap<String, InstanceState>,
}
