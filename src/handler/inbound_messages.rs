use crate::common::layout::inbound_messages_path;
use crate::common::message::Message;
use crate::handler::context::HandlerContext;
use crate::storage::local_queue;
use crate::traits::shared_store::SharedStore;
use anyhow::Result;
use serde_json::Value;

/// Drains this node's shared inbound mailbox into the addressed instances'
/// local inboxes (append-only), then clears the mailbox.
///
/// Inboxes are append-keyed, so a reprocessed drain duplicates entries; that
/// is the accepted at-least-once behavior, the opposite of wake flags.
pub async fn handle_inbound_messages(ctx: &HandlerContext) -> Result<usize> {
    let path = inbound_messages_path(&ctx.cluster.node_id);
    let doc = match ctx.shared_store.read(&path).await? {
        Some(doc) => doc,
        None => return Ok(0),
    };
    let messages: Vec<Message> = match serde_json::from_value(doc) {
        Ok(messages) => messages,
        Err(e) => {
            log::warn!("malformed inbound mailbox at {}, leaving for retry: {}", path, e);
            return Ok(0);
        }
    };
    if messages.is_empty() {
        return Ok(0);
    }

    log::info!("{} message(s) from other nodes", messages.len());
    for message in &messages {
        log::info!(
            "message from {} to {}: {}",
            message.from,
            message.to,
            message.subject
        );
        let inbox = ctx.local.inbox_file(&message.to);
        local_queue::append(&inbox, message.clone())?;
    }

    ctx.shared_store.write(&path, &Value::Array(vec![])).await?;
    Ok(messages.len())
}
