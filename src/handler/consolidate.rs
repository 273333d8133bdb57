use crate::common::consolidated::{
    ActivityEntry,
    CommanderSummary,
    ConsolidatedView,
    InstanceDetail,
    NetworkAggregate,
    NodeSummary,
    NodeView,
    PhoneView,
};
use crate::common::layout::{
    commander_inbox_path,
    consolidated_status_path,
    node_id_from_dir,
    phone_view_path,
    status_path,
};
use crate::common::status::{InstanceStatus, NodeStatus};
use crate::handler::context::HandlerContext;
use crate::traits::shared_store::SharedStore;
use anyhow::Result;
use indexmap::IndexMap;

/// One consolidation cycle: read every known node's published status, merge
/// into a fresh ConsolidatedView, derive the commander summary and its
/// phone-sized slice, and write all three to the MASTER area. The view is
/// rebuilt from scratch every cycle, never merged incrementally.
pub async fn handle_consolidate(ctx: &HandlerContext) -> Result<(ConsolidatedView, CommanderSummary)> {
    let nodes = known_nodes(ctx).await;

    let mut views = IndexMap::new();
    for node in &nodes {
        views.insert(node.clone(), read_node_view(ctx, node).await);
    }

    let view = consolidate(ctx, views);
    let summary = commander_summary(ctx, &view);

    ctx.shared_store
        .write(&consolidated_status_path(), &serde_json::to_value(&view)?)
        .await?;
    ctx.shared_store
        .write(&commander_inbox_path(), &serde_json::to_value(&summary)?)
        .await?;
    let phone = PhoneView::from_summary(&summary);
    ctx.shared_store
        .write(&phone_view_path(), &serde_json::to_value(&phone)?)
        .await?;

    log::info!("{}", summary.headline);
    for action in &summary.next_actions {
        log::info!("next action: {}", action);
    }
    Ok((view, summary))
}

/// Configured nodes plus any NODE_* directory that has appeared in the
/// shared folder, in stable order.
async fn known_nodes(ctx: &HandlerContext) -> Vec<String> {
    let mut nodes = ctx.cluster.nodes.clone();
    match ctx.shared_store.list("").await {
        Ok(entries) => {
            for entry in entries {
                if let Some(id) = node_id_from_dir(&entry) {
                    if !nodes.iter().any(|n| n == id) {
                        nodes.push(id.to_string());
                    }
                }
            }
        }
        Err(e) => log::warn!("could not list shared folder, using configured nodes: {:?}", e),
    }
    nodes
}

async fn read_node_view(ctx: &HandlerContext, node: &str) -> NodeView {
    let path = status_path(node);
    let age = match ctx.shared_store.mtime_age(&path).await {
        Ok(Some(age)) => age,
        Ok(None) => return NodeView::not_connected(node),
        Err(e) => return NodeView::unreadable(node, e.to_string()),
    };
    let doc = match ctx.shared_store.read(&path).await {
        Ok(Some(doc)) => doc,
        Ok(None) => return NodeView::not_connected(node),
        Err(e) => return NodeView::unreadable(node, e.to_string()),
    };
    let status: NodeStatus = match serde_json::from_value(doc) {
        Ok(status) => status,
        Err(e) => return NodeView::unreadable(node, e.to_string()),
    };
    NodeView {
        node_id: node.to_string(),
        timestamp: Some(status.timestamp),
        instances: status.instances,
        last_seen: Some(age),
        connected: age < ctx.settings.node_offline_seconds,
        error: None,
    }
}

fn consolidate(ctx: &HandlerContext, views: IndexMap<String, NodeView>) -> ConsolidatedView {
    let now = ctx.clock.now_ms();
    let total_instances = views.len() * ctx.cluster.instances.len();

    let mut flat = IndexMap::new();
    let mut active_instances = 0;
    let mut recent_activity = Vec::new();

    for (node, view) in &views {
        if !view.connected {
            continue;
        }
        for (instance, state) in &view.instances {
            let key = format!("{node}-{instance}");
            if state.status == InstanceStatus::Active {
                active_instances += 1;
            }
            if let Some(activity) = &state.last_activity {
                recent_activity.push(ActivityEntry {
                    instance: key.clone(),
                    activity: activity.clone(),
                    timestamp: state.timestamp.unwrap_or(now),
                });
            }
            flat.insert(key, state.clone());
        }
    }

    recent_activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent_activity.truncate(10);

    let connected_nodes = views.values().filter(|v| v.connected).count();
    let disconnected_nodes = views
        .values()
        .filter(|v| !v.connected)
        .map(|v| v.node_id.clone())
        .collect();

    ConsolidatedView {
        timestamp: now,
        nodes: views,
        aggregate: NetworkAggregate {
            total_instances,
            active_instances,
            connected_nodes,
            disconnected_nodes,
        },
        instances: flat,
        recent_activity,
    }
}

fn commander_summary(ctx: &HandlerContext, view: &ConsolidatedView) -> CommanderSummary {
    let node_count = view.nodes.len();
    let per_node = ctx.cluster.instances.len();
    let aggregate = &view.aggregate;

    let mut nodes = IndexMap::new();
    let mut alerts = Vec::new();
    for (node, node_view) in &view.nodes {
        if node_view.connected {
            let active = node_view
                .instances
                .values()
                .filter(|i| i.status == InstanceStatus::Active)
                .count();
            nodes.insert(
                node.clone(),
                NodeSummary {
                    status: "ONLINE".to_string(),
                    active_instances: Some(format!("{active}/{per_node}")),
                    last_seen: Some(format!("{}s ago", node_view.last_seen.unwrap_or(0.0).floor())),
                    message: None,
                    details: node_view
                        .instances
                        .iter()
                        .map(|(instance, state)| InstanceDetail {
                            instance: instance.clone(),
                            status: state.status.as_str().to_string(),
                            task: state.current_task.clone().unwrap_or_else(|| "idle".to_string()),
                        })
                        .collect(),
                },
            );
        } else {
            nodes.insert(
                node.clone(),
                NodeSummary {
                    status: "OFFLINE".to_string(),
                    active_instances: None,
                    last_seen: None,
                    message: Some("Not connected to the shared folder".to_string()),
                    details: Vec::new(),
                },
            );
            alerts.push(format!("Node {node} is offline"));
        }
    }

    let mut next_actions = Vec::new();
    if aggregate.connected_nodes == node_count {
        next_actions.push("All nodes connected - full network operational".to_string());
    } else {
        next_actions.push(format!(
            "Connect {} more node(s)",
            node_count - aggregate.connected_nodes
        ));
    }
    if aggregate.active_instances < aggregate.total_instances {
        next_actions.push(format!(
            "Wake {} more instance(s)",
            aggregate.total_instances - aggregate.active_instances
        ));
    }

    CommanderSummary {
        timestamp: view.timestamp,
        headline: format!(
            "{}/{} instances active across {}/{} nodes",
            aggregate.active_instances, aggregate.total_instances, aggregate.connected_nodes, node_count
        ),
        nodes,
        recent_activity: view.recent_activity.iter().take(5).cloned().collect(),
        next_actions,
        alerts,
    }
}
