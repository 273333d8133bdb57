use crate::common::layout::status_path;
use crate::common::status::{InstanceState, NodeStatus};
use crate::handler::context::HandlerContext;
use crate::traits::shared_store::SharedStore;
use anyhow::Result;
use indexmap::IndexMap;
use std::fs::File;
use std::io::BufReader;

/// Assembles this node's status from the locally-authored instance artifacts
/// and overwrites the node's slot in the shared store. A missing artifact is
/// `not_active`; an unreadable one is `unknown` with the error attached.
pub async fn handle_publish_status(ctx: &HandlerContext) -> Result<NodeStatus> {
    let mut instances = IndexMap::new();
    for instance in &ctx.cluster.instances {
        instances.insert(instance.clone(), read_instance_state(ctx, instance));
    }

    let status = NodeStatus {
        node_id: ctx.cluster.node_id.clone(),
        timestamp: ctx.clock.now_ms(),
        instances,
    };
    ctx.shared_store
        .write(&status_path(&ctx.cluster.node_id), &serde_json::to_value(&status)?)
        .await?;
    Ok(status)
}

/// Final best-effort write on shutdown: every instance reported
/// `not_active` so peers see this node as going offline rather than as a
/// stale-but-active ghost.
pub async fn handle_shutdown_status(ctx: &HandlerContext) -> Result<()> {
    let mut instances = IndexMap::new();
    for instance in &ctx.cluster.instances {
        instances.insert(instance.clone(), InstanceState::not_active());
    }
    let status = NodeStatus {
        node_id: ctx.cluster.node_id.clone(),
        timestamp: ctx.clock.now_ms(),
        instances,
    };
    ctx.shared_store
        .write(&status_path(&ctx.cluster.node_id), &serde_json::to_value(&status)?)
        .await
}

fn read_instance_state(ctx: &HandlerContext, instance: &str) -> InstanceState {
    let path = ctx.local.instance_status_file(instance);
    if !path.exists() {
        return InstanceState::not_active();
    }
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("unreadable status artifact for {}: {}", instance, e);
            return InstanceState::unknown(e.to_string());
        }
    };
    match serde_json::from_reader::<_, InstanceState>(BufReader::new(file)) {
        Ok(state) => state,
        Err(e) => {
            log::warn!("malformed status artifact for {}: {}", instance, e);
            InstanceState::unknown(e.to_string())
        }
    }
}
