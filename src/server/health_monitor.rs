use crate::common::clock::ClockImpl;
use crate::common::config::{load_cluster_config, load_settings};
use crate::common::health::HealthState;
use crate::common::layout::LocalLayout;
use crate::common::utils::jittered_delay;
use crate::handler::context::HandlerContext;
use crate::handler::health_check::handle_health_check;
use crate::server::loader::load_shared_store;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// The health monitoring daemon. The failure-count state lives here as a
/// plain value handed to each evaluation and replaced by what it returns.
pub async fn health_monitor_start(config_path: &str) -> Result<()> {
    let cluster = Arc::new(load_cluster_config(config_path)?);
    let settings = Arc::new(load_settings()?);
    let shared_store = Arc::new(load_shared_store(&settings).await?);

    let ctx = HandlerContext {
        shared_store,
        cluster,
        settings: Arc::clone(&settings),
        local: LocalLayout::new(&settings.local_root),
        clock: ClockImpl::System,
    };

    log::info!("health monitor starting (interval {}s)", settings.sync_interval_secs);
    tokio::time::sleep(Duration::from_millis(jittered_delay(1_000))).await;

    let mut interval = tokio::time::interval(Duration::from_secs(settings.sync_interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut state = HealthState::default();
    let mut cycle: u64 = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                cycle += 1;
                log::info!("health check #{}", cycle);
                let (_report, next_state) = handle_health_check(&ctx, &state).await;
                state = next_state;
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupt received, health monitor exiting after {} check(s)", cycle);
                return Ok(());
            }
        }
    }
}
