use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallHealth {
    Excellent,
    Good,
    Warning,
    Degraded,
    Critical,
    Error,
    Unknown,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Critical,
    Warning,
    Info,
}

/// Operator-visible failure surface: every alert names the required action.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub action: String,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            action: action.into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    pub timestamp: i64,
    pub nodes_online: usize,
    pub nodes_offline: usize,
    pub instances_active: usize,
    pub instances_standby: usize,
    pub sync_healthy: bool,
    pub overall_health: OverallHealth,
}

impl HealthMetrics {
    pub fn empty(timestamp: i64) -> Self {
        Self {
            timestamp,
            nodes_online: 0,
            nodes_offline: 0,
            instances_active: 0,
            instances_standby: 0,
            sync_healthy: true,
            overall_health: OverallHealth::Unknown,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub timestamp: i64,
    pub metrics: HealthMetrics,
    pub alerts: Vec<Alert>,
    pub consecutive_failures: u32,
}

/// Carried forward by the monitoring loop between evaluations. An explicit
/// value, not a shared mutable singleton: each evaluation returns the next
/// state and the caller passes it back in.
#[derive(Debug, Clone, Default)]
pub struct HealthState {
    pub consecutive_failures: u32,
}
