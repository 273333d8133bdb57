use crate::common::consolidated::ConsolidatedView;
use crate::common::health::{
    Alert,
    AlertLevel,
    HealthMetrics,
    HealthReport,
    HealthState,
    OverallHealth,
};
use crate::common::layout::{consolidated_status_path, health_report_path, status_path};
use crate::common::status::InstanceStatus;
use crate::handler::context::HandlerContext;
use crate::traits::shared_store::SharedStore;
use anyhow::Result;

/// One monitoring cycle. Evaluation failures never escape: they increment
/// the carried-forward failure count and, at the configured threshold, raise
/// the "monitoring itself is failing" alert. The returned state must be
/// passed back in on the next cycle.
pub async fn handle_health_check(ctx: &HandlerContext, state: &HealthState) -> (HealthReport, HealthState) {
    let now = ctx.clock.now_ms();
    let (metrics, alerts, next_state) = match evaluate(ctx).await {
        Ok((metrics, alerts)) => (metrics, alerts, HealthState { consecutive_failures: 0 }),
        Err(e) => {
            log::error!("health check failed: {:?}", e);
            let failures = state.consecutive_failures + 1;
            let mut alerts = Vec::new();
            if failures >= ctx.settings.consecutive_failure_alerts {
                alerts.push(Alert::new(
                    AlertLevel::Critical,
                    format!("Health monitoring failing ({failures} consecutive failures)"),
                    "Check shared folder access and file permissions",
                ));
            }
            let mut metrics = HealthMetrics::empty(now);
            metrics.sync_healthy = false;
            metrics.overall_health = OverallHealth::Error;
            (metrics, alerts, HealthState { consecutive_failures: failures })
        }
    };

    let report = HealthReport {
        timestamp: now,
        metrics,
        alerts,
        consecutive_failures: next_state.consecutive_failures,
    };

    // The report is advisory; failing to persist it must not count as a
    // monitoring failure.
    match serde_json::to_value(&report) {
        Ok(doc) => {
            if let Err(e) = ctx.shared_store.write(&health_report_path(), &doc).await {
                log::warn!("could not save health report: {:?}", e);
            }
        }
        Err(e) => log::warn!("could not serialize health report: {:?}", e),
    }

    log_health_report(&report);
    (report, next_state)
}

/// Pure-ish classifier: reads the consolidated view (or falls back to direct
/// node reads when it is absent) and derives metrics + alerts. Overall
/// health is a function of what this cycle observed, never of prior state.
async fn evaluate(ctx: &HandlerContext) -> Result<(HealthMetrics, Vec<Alert>)> {
    let now = ctx.clock.now_ms();
    let mut metrics = HealthMetrics::empty(now);
    let mut alerts = Vec::new();

    let path = consolidated_status_path();
    let age = ctx.shared_store.mtime_age(&path).await?;
    let doc = ctx.shared_store.read(&path).await?;

    let (age, doc) = match (age, doc) {
        (Some(age), Some(doc)) => (age, doc),
        _ => {
            alerts.push(Alert::new(
                AlertLevel::Critical,
                "Master coordinator not running - no consolidated status file",
                "Start the consolidator process",
            ));
            metrics.sync_healthy = false;
            metrics.overall_health = OverallHealth::Critical;
            direct_node_scan(ctx, &mut metrics).await;
            return Ok((metrics, alerts));
        }
    };

    if age > ctx.settings.consolidated_stale_seconds {
        alerts.push(Alert::new(
            AlertLevel::Warning,
            format!("Master coordinator stale ({}s since last update)", age.floor()),
            "Check whether the consolidator process is still running",
        ));
        metrics.sync_healthy = false;
    }

    // Malformed consolidated output is an evaluation failure, not "empty":
    // the coordinator is running but producing garbage.
    let view: ConsolidatedView = serde_json::from_value(doc)?;

    for (node, node_view) in &view.nodes {
        if node_view.connected {
            metrics.nodes_online += 1;
            if node_view.last_seen.unwrap_or(0.0) > ctx.settings.node_offline_seconds {
                alerts.push(Alert::new(
                    AlertLevel::Warning,
                    format!(
                        "Node {} connection degraded (last seen {}s ago)",
                        node,
                        node_view.last_seen.unwrap_or(0.0).floor()
                    ),
                    format!("Check the sync agent on node {node}"),
                ));
            }
            for state in node_view.instances.values() {
                if state.status == InstanceStatus::Active {
                    metrics.instances_active += 1;
                } else {
                    metrics.instances_standby += 1;
                }
            }
        } else {
            metrics.nodes_offline += 1;
            if view.aggregate.connected_nodes < view.nodes.len() {
                alerts.push(Alert::new(
                    AlertLevel::Info,
                    format!("Node {node} offline - ready for deployment"),
                    format!("Deploy the sync agent to node {node}"),
                ));
            }
        }
    }

    if metrics.instances_active < ctx.settings.min_active_instances {
        let missing = ctx.settings.min_active_instances - metrics.instances_active;
        alerts.push(Alert::new(
            AlertLevel::Info,
            format!(
                "Only {} instance(s) active (minimum recommended: {})",
                metrics.instances_active, ctx.settings.min_active_instances
            ),
            format!("wake {missing} more instance(s)"),
        ));
    }

    let stale_cutoff = ctx.settings.instance_stale_minutes * 60 * 1000;
    for (key, state) in &view.instances {
        if state.status == InstanceStatus::Active {
            if let Some(ts) = state.timestamp {
                if now - ts > stale_cutoff {
                    alerts.push(Alert::new(
                        AlertLevel::Info,
                        format!("Instance {key} active but idle for over {} minute(s)", ctx.settings.instance_stale_minutes),
                        format!("Check the worker behind {key}"),
                    ));
                }
            }
        }
    }

    metrics.overall_health = classify(&metrics, &alerts, view.nodes.len(), ctx.settings.min_active_instances);
    Ok((metrics, alerts))
}

/// Failover path when the consolidated view is missing: derive node counts
/// from the status files directly so the report is not all zeros.
async fn direct_node_scan(ctx: &HandlerContext, metrics: &mut HealthMetrics) {
    for node in &ctx.cluster.nodes {
        match ctx.shared_store.mtime_age(&status_path(node)).await {
            Ok(Some(age)) if age < ctx.settings.node_offline_seconds => metrics.nodes_online += 1,
            Ok(_) => metrics.nodes_offline += 1,
            Err(e) => {
                log::warn!("direct scan could not stat node {}: {:?}", node, e);
                metrics.nodes_offline += 1;
            }
        }
    }
}

/// Deterministic classification from this cycle's metrics and alerts alone.
fn classify(
    metrics: &HealthMetrics,
    alerts: &[Alert],
    node_count: usize,
    min_active_instances: usize,
) -> OverallHealth {
    if alerts.iter().any(|a| a.level == AlertLevel::Critical) {
        OverallHealth::Critical
    } else if alerts.iter().any(|a| a.level == AlertLevel::Warning) {
        OverallHealth::Warning
    } else if metrics.nodes_online == node_count && metrics.instances_active >= min_active_instances {
        OverallHealth::Excellent
    } else if metrics.nodes_online >= 1 {
        OverallHealth::Good
    } else {
        OverallHealth::Degraded
    }
}

fn log_health_report(report: &HealthReport) {
    log::info!("overall health: {:?}", report.metrics.overall_health);
    log::info!(
        "nodes online: {}, offline: {}; instances active: {}, standby: {}; sync healthy: {}",
        report.metrics.nodes_online,
        report.metrics.nodes_offline,
        report.metrics.instances_active,
        report.metrics.instances_standby,
        report.metrics.sync_healthy,
    );
    for alert in &report.alerts {
        log::info!("{:?}: {} -> {}", alert.level, alert.message, alert.action);
    }
}
