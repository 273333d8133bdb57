use crate::common::layout::inbound_messages_path;
use crate::common::message::Message;
use crate::handler::context::HandlerContext;
use crate::storage::local_queue;
use crate::storage::shared_store_impl::append_json_array;
use anyhow::Result;

/// Forwards locally-authored messages to their target nodes' shared inbound
/// mailboxes, stamping send time and the forwarding node, then clears the
/// local outbound queue.
pub async fn handle_outbound_messages(ctx: &HandlerContext) -> Result<usize> {
    let queue_path = ctx.local.outbound_queue_file();
    let outbound: Vec<Message> = local_queue::read_all(&queue_path)?;
    if outbound.is_empty() {
        return Ok(0);
    }

    let mut forwarded = 0;
    for message in &outbound {
        let Some(target) = message.target_node.as_deref() else {
            log::warn!(
                "outbound message {} has no target node, dropping (subject: {})",
                message.id,
                message.subject
            );
            continue;
        };
        let mut stamped = message.clone();
        stamped.sent_at = Some(ctx.clock.now_ms());
        stamped.via_node = Some(ctx.cluster.node_id.clone());
        append_json_array(
            &ctx.shared_store,
            &inbound_messages_path(target),
            serde_json::to_value(&stamped)?,
        )
        .await?;
        log::info!("forwarded message {} to node {}", message.id, target);
        forwarded += 1;
    }

    local_queue::clear(&queue_path)?;
    Ok(forwarded)
}

/// CLI side: author a message into the local outbound queue for the agent to
/// forward on its next cycle.
pub fn queue_outbound(ctx_local: &crate::common::layout::LocalLayout, message: Message) -> Result<()> {
    local_queue::append(&ctx_local.outbound_queue_file(), message)
}
