use crate::common::layout::status_path;
use crate::handler::context::HandlerContext;
use crate::traits::shared_store::SharedStore;

#[derive(Debug, Clone)]
pub struct PeerStatus {
    pub node_id: String,
    pub connected: bool,
    pub last_seen: Option<f64>,
    pub error: Option<String>,
}

/// Classifies every peer from the age of its published status file.
/// Infallible by construction: a store error marks that one peer
/// disconnected instead of failing the step.
pub async fn handle_peer_status(ctx: &HandlerContext) -> Vec<PeerStatus> {
    let mut peers = Vec::new();
    for node in ctx.cluster.peers() {
        let peer = match ctx.shared_store.mtime_age(&status_path(node)).await {
            Ok(Some(age)) => PeerStatus {
                node_id: node.clone(),
                connected: age < ctx.settings.node_offline_seconds,
                last_seen: Some(age),
                error: None,
            },
            Ok(None) => PeerStatus {
                node_id: node.clone(),
                connected: false,
                last_seen: None,
                error: None,
            },
            Err(e) => {
                log::warn!("could not stat status file for node {}: {:?}", node, e);
                PeerStatus {
                    node_id: node.clone(),
                    connected: false,
                    last_seen: None,
                    error: Some(e.to_string()),
                }
            }
        };
        peers.push(peer);
    }
    peers
}

pub fn log_network_view(own_node: &str, peers: &[PeerStatus]) {
    log::info!("network status:");
    log::info!("  node {} (this): ACTIVE", own_node);
    for peer in peers {
        if let Some(error) = &peer.error {
            log::info!("  node {}: ERROR ({})", peer.node_id, error);
        } else if peer.connected {
            log::info!(
                "  node {}: ONLINE (last seen {}s ago)",
                peer.node_id,
                peer.last_seen.unwrap_or(0.0).floor()
            );
        } else if let Some(age) = peer.last_seen {
            log::info!("  node {}: OFFLINE (last seen {}s ago)", peer.node_id, age.floor());
        } else {
            log::info!("  node {}: NOT CONNECTED (no status file)", peer.node_id);
        }
    }
}
