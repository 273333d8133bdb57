use crate::common::clock::ClockImpl;
use crate::common::config::{load_cluster_config, load_settings};
use crate::common::layout::LocalLayout;
use crate::common::utils::jittered_delay;
use crate::handler::consolidate::handle_consolidate;
use crate::handler::context::HandlerContext;
use crate::server::loader::load_shared_store;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// The master consolidation daemon: merges every node's published view into
/// one snapshot on its own timer, independent of the agents.
pub async fn consolidator_start(config_path: &str) -> Result<()> {
    let cluster = Arc::new(load_cluster_config(config_path)?);
    let settings = Arc::new(load_settings()?);
    let shared_store = Arc::new(load_shared_store(&settings).await?);

    let ctx = HandlerContext {
        shared_store,
        cluster: Arc::clone(&cluster),
        settings: Arc::clone(&settings),
        local: LocalLayout::new(&settings.local_root),
        clock: ClockImpl::System,
    };

    log::info!(
        "consolidator starting (interval {}s, nodes: {:?})",
        settings.sync_interval_secs,
        cluster.nodes
    );
    tokio::time::sleep(Duration::from_millis(jittered_delay(1_000))).await;

    let mut interval = tokio::time::interval(Duration::from_secs(settings.sync_interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycle: u64 = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                cycle += 1;
                log::info!("consolidation #{}", cycle);
                if let Err(e) = handle_consolidate(&ctx).await {
                    log::error!("consolidation #{} failed: {:?}", cycle, e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupt received, consolidator exiting");
                return Ok(());
            }
        }
    }
}
