use crate::common::layout::wake_queue_path;
use crate::common::wake::{Priority, WakeFlag, WakeRequest};
use crate::handler::context::HandlerContext;
use crate::storage::shared_store_impl::{append_json_array, SharedStoreImpl};
use crate::traits::shared_store::SharedStore;
use anyhow::Result;
use serde_json::Value;

/// Drains this node's shared wake queue into local wake flags, then clears
/// the queue.
///
/// Flags are overwrite-keyed by instance: a second request for the same
/// instance before the flag is consumed replaces the first. If the queue
/// cannot be read or parsed it is left untouched for the next cycle.
pub async fn handle_wake_requests(ctx: &HandlerContext) -> Result<usize> {
    let path = wake_queue_path(&ctx.cluster.node_id);
    let doc = match ctx.shared_store.read(&path).await? {
        Some(doc) => doc,
        None => return Ok(0),
    };
    let requests: Vec<WakeRequest> = match serde_json::from_value(doc) {
        Ok(requests) => requests,
        Err(e) => {
            log::warn!("malformed wake queue at {}, leaving for retry: {}", path, e);
            return Ok(0);
        }
    };
    if requests.is_empty() {
        return Ok(0);
    }

    log::info!("{} wake request(s) from other nodes", requests.len());
    for request in &requests {
        log::info!(
            "wake {} requested by node {} ({})",
            request.target_instance,
            request.from,
            request.reason
        );
        let flag = WakeFlag::from_request(request, ctx.clock.now_ms());
        let flag_path = ctx.local.wake_flag_file(&request.target_instance);
        let json = serde_json::to_string_pretty(&flag)?;
        std::fs::write(&flag_path, json)?;
    }

    // All flags written; consume the queue. A crash before this line means
    // the requests are reprocessed next cycle (at-least-once, overwrite-safe).
    ctx.shared_store.write(&path, &Value::Array(vec![])).await?;
    Ok(requests.len())
}

/// CLI side: queue a wake request for an instance on another node. The
/// append is the shared-store whole-file RMW, unsynchronized by design.
pub async fn enqueue_remote_wake(
    store: &SharedStoreImpl,
    from_node: &str,
    to_node: &str,
    target_instance: &str,
    reason: &str,
    timestamp: i64,
) -> Result<()> {
    let request = WakeRequest {
        from: from_node.to_string(),
        to: to_node.to_string(),
        target_instance: target_instance.to_string(),
        reason: reason.to_string(),
        priority: Priority::High,
        timestamp,
    };
    append_json_array(store, &wake_queue_path(to_node), serde_json::to_value(&request)?).await
}
