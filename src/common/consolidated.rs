use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::status::InstanceState;

/// One node as seen by the consolidator: its last published status plus how
/// long ago the status file was rewritten.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub instances: IndexMap<String, InstanceState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<f64>,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodeView {
    pub fn not_connected(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            timestamp: None,
            instances: IndexMap::new(),
            last_seen: None,
            connected: false,
            error: None,
        }
    }

    pub fn unreadable(node_id: &str, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::not_connected(node_id)
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAggregate {
    pub total_instances: usize,
    pub active_instances: usize,
    pub connected_nodes: usize,
    pub disconnected_nodes: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub instance: String,
    pub activity: String,
    pub timestamp: i64,
}

/// The global snapshot, rebuilt from scratch every consolidation cycle.
/// `instances` is the flat `nodeId-instanceId` map; `recent_activity` is
/// newest-first and capped at 10 entries.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedView {
    pub timestamp: i64,
    pub nodes: IndexMap<String, NodeView>,
    pub aggregate: NetworkAggregate,
    pub instances: IndexMap<String, InstanceState>,
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDetail {
    pub instance: String,
    pub status: String,
    pub task: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_instances: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<InstanceDetail>,
}

/// Operator-facing digest derived from the consolidated view.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommanderSummary {
    pub timestamp: i64,
    pub headline: String,
    pub nodes: IndexMap<String, NodeSummary>,
    pub recent_activity: Vec<ActivityEntry>,
    pub next_actions: Vec<String>,
    pub alerts: Vec<String>,
}

/// Small-screen slice of the commander summary: the headline plus the bits
/// worth glancing at, nothing else.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PhoneView {
    pub timestamp: i64,
    pub summary: String,
    pub nodes: IndexMap<String, NodeSummary>,
    pub recent_activity: Vec<ActivityEntry>,
    pub next_actions: Vec<String>,
}

impl PhoneView {
    pub fn from_summary(summary: &CommanderSummary) -> Self {
        Self {
            timestamp: summary.timestamp,
            summary: summary.headline.clone(),
            nodes: summary.nodes.clone(),
            recent_activity: summary.recent_activity.clone(),
            next_actions: summary.next_actions.clone(),
        }
    }
}
