use crate::common::clock::ClockImpl;
use crate::common::config::{load_cluster_config, load_settings};
use crate::common::layout::LocalLayout;
use crate::common::utils::jittered_delay;
use crate::handler::{
    context::HandlerContext,
    inbound_messages::handle_inbound_messages,
    outbound_messages::handle_outbound_messages,
    peer_status::{handle_peer_status, log_network_view},
    publish_status::{handle_publish_status, handle_shutdown_status},
    wake_requests::handle_wake_requests,
};
use crate::server::loader::load_shared_store;
use crate::server::rest_server::{rest_server_start, AppState};
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// The per-node sync daemon. Runs one cycle every `sync_interval_secs`
/// forever; no single cycle's failure stops the schedule. On interrupt it
/// makes one final best-effort offline status write before exiting.
pub async fn agent_start(config_path: &str) -> Result<()> {
    let cluster = Arc::new(load_cluster_config(config_path)?);
    let settings = Arc::new(load_settings()?);
    let shared_store = Arc::new(load_shared_store(&settings).await?);
    let local = LocalLayout::new(&settings.local_root);
    local.ensure_dirs()?;

    let ctx = HandlerContext {
        shared_store: Arc::clone(&shared_store),
        cluster: Arc::clone(&cluster),
        settings: Arc::clone(&settings),
        local,
        clock: ClockImpl::System,
    };

    let last_cycle_ms = Arc::new(AtomicI64::new(0));
    if let Some(port) = settings.rest_port {
        let state = AppState {
            settings: Arc::clone(&settings),
            shared_store: Arc::clone(&shared_store),
            last_cycle_ms: Arc::clone(&last_cycle_ms),
        };
        tokio::spawn(async move {
            if let Err(e) = rest_server_start(port, state).await {
                log::error!("rest server exited: {:?}", e);
            }
        });
    }

    log::info!(
        "sync agent for node {} starting (interval {}s, peers: {:?})",
        cluster.node_id,
        settings.sync_interval_secs,
        cluster.peers().collect::<Vec<_>>()
    );

    // Stagger the first cycle so co-started agents do not stamp the shared
    // folder in lockstep.
    tokio::time::sleep(Duration::from_millis(jittered_delay(1_000))).await;

    let mut interval = tokio::time::interval(Duration::from_secs(settings.sync_interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycle: u64 = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                cycle += 1;
                // Swallowed at the top so one bad cycle never ends
                // coordination for this node.
                if let Err(e) = run_sync_cycle(&ctx, cycle).await {
                    log::error!("sync cycle #{} failed: {:?}", cycle, e);
                }
                last_cycle_ms.store(ctx.clock.now_ms(), Ordering::SeqCst);
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupt received, publishing offline status before exit");
                if let Err(e) = handle_shutdown_status(&ctx).await {
                    log::warn!("final status write failed: {:?}", e);
                }
                return Ok(());
            }
        }
    }
}

/// One cycle, steps in protocol order. Every step catches its own I/O
/// errors so the later steps still run.
pub async fn run_sync_cycle(ctx: &HandlerContext, cycle: u64) -> Result<()> {
    log::info!("sync cycle #{}", cycle);

    match handle_publish_status(ctx).await {
        Ok(status) => log::info!("published status for {} instance(s)", status.instances.len()),
        Err(e) => log::error!("status publish failed: {:?}", e),
    }
    if let Err(e) = handle_wake_requests(ctx).await {
        log::error!("wake request drain failed: {:?}", e);
    }
    if let Err(e) = handle_inbound_messages(ctx).await {
        log::error!("inbound message drain failed: {:?}", e);
    }
    if let Err(e) = handle_outbound_messages(ctx).await {
        log::error!("outbound forward failed: {:?}", e);
    }
    let peers = handle_peer_status(ctx).await;
    log_network_view(&ctx.cluster.node_id, &peers);
    Ok(())
}
