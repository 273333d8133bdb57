#![allow(dead_code)]

use std::sync::Arc;

use syncmesh::common::clock::ClockImpl;
use syncmesh::common::config::{ClusterConfig, Settings, StorageType};
use syncmesh::common::layout::LocalLayout;
use syncmesh::handler::context::HandlerContext;
use syncmesh::storage::memory::memory_shared_store::MemorySharedStore;
use syncmesh::storage::shared_store_impl::SharedStoreImpl;
use tempfile::TempDir;

pub struct Harness {
    pub ctx: HandlerContext,
    _local: TempDir,
}

pub fn harness(node_id: &str) -> Harness {
    harness_with(
        node_id,
        &["A", "B", "C"],
        &["c1", "c2", "c3"],
        ClockImpl::manual(1_700_000_000_000),
    )
}

pub fn harness_with(
    node_id: &str,
    nodes: &[&str],
    instances: &[&str],
    clock: ClockImpl,
) -> Harness {
    let local = TempDir::new().unwrap();
    let layout = LocalLayout::new(local.path());
    layout.ensure_dirs().unwrap();

    let store = SharedStoreImpl::Memory(MemorySharedStore::new(clock.clone()));
    let ctx = HandlerContext {
        shared_store: Arc::new(store),
        cluster: Arc::new(ClusterConfig {
            cluster_id: "mesh-test".to_string(),
            node_id: node_id.to_string(),
            nodes: nodes.iter().map(|s| s.to_string()).collect(),
            instances: instances.iter().map(|s| s.to_string()).collect(),
        }),
        settings: Arc::new(settings()),
        local: layout,
        clock,
    };
    Harness { ctx, _local: local }
}

pub fn settings() -> Settings {
    Settings {
        store_type: StorageType::Memory,
        shared_root: String::new(),
        local_root: String::new(),
        sync_interval_secs: 30,
        node_offline_seconds: 120.0,
        consolidated_stale_seconds: 60.0,
        instance_stale_minutes: 10,
        min_active_instances: 3,
        consecutive_failure_alerts: 3,
        rest_port: None,
        s3_bucket: None,
        s3_prefix: None,
        s3_endpoint: None,
        s3_access_key: None,
        s3_secret_key: None,
        s3_region: None,
    }
}

/// Rewinds a shared document's mtime on the in-memory backend.
pub async fn backdate(store: &SharedStoreImpl, path: &str, seconds: f64) {
    match store {
        SharedStoreImpl::Memory(m) => m.backdate(path, seconds).await,
        _ => panic!("backdate only works on the in-memory store"),
    }
}

pub async fn remove(store: &SharedStoreImpl, path: &str) {
    match store {
        SharedStoreImpl::Memory(m) => m.remove(path).await,
        _ => panic!("remove only works on the in-memory store"),
    }
}
