mod common;

use common::{backdate, harness};
use serde_json::json;
use syncmesh::common::layout::{inbound_messages_path, status_path, wake_queue_path};
use syncmesh::common::message::{Message, MessageType};
use syncmesh::common::wake::WakeFlag;
use syncmesh::handler::inbound_messages::handle_inbound_messages;
use syncmesh::handler::outbound_messages::{handle_outbound_messages, queue_outbound};
use syncmesh::handler::peer_status::handle_peer_status;
use syncmesh::handler::publish_status::{handle_publish_status, handle_shutdown_status};
use syncmesh::handler::wake_requests::{enqueue_remote_wake, handle_wake_requests};
use syncmesh::storage::local_queue;
use syncmesh::traits::shared_store::SharedStore;

#[tokio::test]
async fn publish_reports_missing_artifacts_as_not_active() {
    let h = harness("A");
    let now = h.ctx.clock.now_ms();
    std::fs::write(
        h.ctx.local.instance_status_file("c1"),
        json!({"status": "active", "currentTask": "indexing", "timestamp": now}).to_string(),
    )
    .unwrap();

    let status = handle_publish_status(&h.ctx).await.unwrap();
    assert_eq!(status.node_id, "A");
    assert_eq!(status.instances["c1"].status.as_str(), "active");
    assert_eq!(status.instances["c2"].status.as_str(), "not_active");
    assert_eq!(status.instances["c3"].status.as_str(), "not_active");

    let published = h.ctx.shared_store.read(&status_path("A")).await.unwrap().unwrap();
    assert_eq!(published["nodeId"], "A");
    assert_eq!(published["instances"]["c1"]["currentTask"], "indexing");
}

#[tokio::test]
async fn publish_marks_malformed_artifacts_unknown() {
    let h = harness("A");
    std::fs::write(h.ctx.local.instance_status_file("c2"), "{garbage").unwrap();

    let status = handle_publish_status(&h.ctx).await.unwrap();
    assert_eq!(status.instances["c2"].status.as_str(), "unknown");
    assert!(status.instances["c2"].error.is_some());
    // the broken artifact must not take the whole publish down
    assert_eq!(status.instances["c1"].status.as_str(), "not_active");
}

#[tokio::test]
async fn shutdown_publishes_everything_not_active() {
    let h = harness("A");
    let now = h.ctx.clock.now_ms();
    std::fs::write(
        h.ctx.local.instance_status_file("c1"),
        json!({"status": "active", "timestamp": now}).to_string(),
    )
    .unwrap();
    handle_publish_status(&h.ctx).await.unwrap();

    handle_shutdown_status(&h.ctx).await.unwrap();
    let published = h.ctx.shared_store.read(&status_path("A")).await.unwrap().unwrap();
    assert_eq!(published["instances"]["c1"]["status"], "not_active");
}

#[tokio::test]
async fn wake_drain_writes_flags_and_clears_the_queue() {
    let h = harness("B");
    let now = h.ctx.clock.now_ms();
    enqueue_remote_wake(&h.ctx.shared_store, "A", "B", "c1", "Need more capacity", now)
        .await
        .unwrap();

    let drained = handle_wake_requests(&h.ctx).await.unwrap();
    assert_eq!(drained, 1);

    let flag: WakeFlag = serde_json::from_str(
        &std::fs::read_to_string(h.ctx.local.wake_flag_file("c1")).unwrap(),
    )
    .unwrap();
    assert_eq!(flag.from, "Node A (shared-folder sync)");
    assert_eq!(flag.reason, "Need more capacity");
    assert!(flag.context.cross_computer);
    assert_eq!(flag.context.source_node, "A");

    let queue = h.ctx.shared_store.read(&wake_queue_path("B")).await.unwrap().unwrap();
    assert_eq!(queue, json!([]));
}

#[tokio::test]
async fn wake_flags_overwrite_per_instance() {
    let h = harness("B");
    let now = h.ctx.clock.now_ms();
    enqueue_remote_wake(&h.ctx.shared_store, "A", "B", "c1", "first", now)
        .await
        .unwrap();
    enqueue_remote_wake(&h.ctx.shared_store, "C", "B", "c1", "second", now)
        .await
        .unwrap();

    let drained = handle_wake_requests(&h.ctx).await.unwrap();
    assert_eq!(drained, 2);

    // one flag file, last request wins
    let flag: WakeFlag = serde_json::from_str(
        &std::fs::read_to_string(h.ctx.local.wake_flag_file("c1")).unwrap(),
    )
    .unwrap();
    assert_eq!(flag.reason, "second");
    assert_eq!(flag.context.source_node, "C");
}

#[tokio::test]
async fn wake_drain_is_a_no_op_on_an_empty_queue() {
    let h = harness("B");
    assert_eq!(handle_wake_requests(&h.ctx).await.unwrap(), 0);
    // absent before, still absent after (no spurious write)
    assert!(h.ctx.shared_store.read(&wake_queue_path("B")).await.unwrap().is_none());

    h.ctx.shared_store.write(&wake_queue_path("B"), &json!([])).await.unwrap();
    assert_eq!(handle_wake_requests(&h.ctx).await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_wake_queue_is_left_for_retry() {
    let h = harness("B");
    h.ctx
        .shared_store
        .write(&wake_queue_path("B"), &json!({"not": "an array"}))
        .await
        .unwrap();

    assert_eq!(handle_wake_requests(&h.ctx).await.unwrap(), 0);
    let queue = h.ctx.shared_store.read(&wake_queue_path("B")).await.unwrap().unwrap();
    assert_eq!(queue, json!({"not": "an array"}));
}

#[tokio::test]
async fn inbound_drain_delivers_then_clears() {
    let h = harness("B");
    let now = h.ctx.clock.now_ms();
    let message = Message::new(
        MessageType::Ask,
        "alice",
        "Bob",
        Some("B"),
        "status?",
        "how is the index build going",
        now,
    );
    h.ctx
        .shared_store
        .write(&inbound_messages_path("B"), &json!([message]))
        .await
        .unwrap();

    assert_eq!(handle_inbound_messages(&h.ctx).await.unwrap(), 1);

    let inbox: Vec<Message> = local_queue::read_all(&h.ctx.local.inbox_file("Bob")).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].subject, "status?");
    assert!(inbox[0].requires_response);

    let mailbox = h.ctx.shared_store.read(&inbound_messages_path("B")).await.unwrap().unwrap();
    assert_eq!(mailbox, json!([]));
}

#[tokio::test]
async fn redelivered_inbound_messages_duplicate_in_the_inbox() {
    let h = harness("B");
    let now = h.ctx.clock.now_ms();
    let message = Message::new(MessageType::Tell, "alice", "bob", Some("B"), "hi", "", now);
    let doc = json!([message]);

    h.ctx.shared_store.write(&inbound_messages_path("B"), &doc).await.unwrap();
    handle_inbound_messages(&h.ctx).await.unwrap();
    // the producer re-appends after a lost clear; delivery is at-least-once
    h.ctx.shared_store.write(&inbound_messages_path("B"), &doc).await.unwrap();
    handle_inbound_messages(&h.ctx).await.unwrap();

    let inbox: Vec<Message> = local_queue::read_all(&h.ctx.local.inbox_file("bob")).unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].id, inbox[1].id);
}

#[tokio::test]
async fn outbound_forwarding_stamps_and_clears() {
    let h = harness("A");
    let now = h.ctx.clock.now_ms();
    queue_outbound(
        &h.ctx.local,
        Message::new(MessageType::Show, "ops", "bob", Some("B"), "report", "weekly", now),
    )
    .unwrap();
    // no target node, should be dropped rather than block the queue
    queue_outbound(
        &h.ctx.local,
        Message::new(MessageType::Tell, "ops", "bob", None, "lost", "", now),
    )
    .unwrap();

    h.ctx.clock.advance_ms(5_000);
    assert_eq!(handle_outbound_messages(&h.ctx).await.unwrap(), 1);

    let mailbox = h.ctx.shared_store.read(&inbound_messages_path("B")).await.unwrap().unwrap();
    // the routing field keeps its historical wire name
    assert_eq!(mailbox[0]["targetComputer"], "B");
    assert!(mailbox[0].get("targetNode").is_none());
    let delivered: Vec<Message> = serde_json::from_value(mailbox).unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].sent_at, Some(now + 5_000));
    assert_eq!(delivered[0].via_node.as_deref(), Some("A"));

    let remaining: Vec<Message> =
        local_queue::read_all(&h.ctx.local.outbound_queue_file()).unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn peer_classification_follows_the_offline_threshold() {
    let h = harness("A");
    h.ctx.shared_store.write(&status_path("B"), &json!({})).await.unwrap();
    h.ctx.shared_store.write(&status_path("C"), &json!({})).await.unwrap();
    backdate(&h.ctx.shared_store, &status_path("B"), 119.0).await;
    backdate(&h.ctx.shared_store, &status_path("C"), 121.0).await;

    let peers = handle_peer_status(&h.ctx).await;
    assert_eq!(peers.len(), 2);

    let b = peers.iter().find(|p| p.node_id == "B").unwrap();
    assert!(b.connected);
    assert_eq!(b.last_seen, Some(119.0));

    let c = peers.iter().find(|p| p.node_id == "C").unwrap();
    assert!(!c.connected);
    assert_eq!(c.last_seen, Some(121.0));
}
