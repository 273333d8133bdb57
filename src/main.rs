use anyhow::Result;

use syncmesh::common::clock::ClockImpl;
use syncmesh::common::config::{load_cluster_config, load_settings};
use syncmesh::common::layout::LocalLayout;
use syncmesh::common::message::{Message, MessageType};
use syncmesh::handler::outbound_messages::queue_outbound;
use syncmesh::handler::wake_requests::enqueue_remote_wake;
use syncmesh::server::loader::load_shared_store;
use syncmesh::{agent_start, consolidator_start, health_monitor_start};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "config/cluster.json".to_string());
    let positional = strip_config_flag(&args);

    match positional.first().map(String::as_str) {
        Some("agent") => agent_start(&config_path).await,
        Some("consolidator") => consolidator_start(&config_path).await,
        Some("health-monitor") => health_monitor_start(&config_path).await,
        Some("wake") => wake_command(&config_path, &positional[1..]).await,
        Some("send") => send_command(&config_path, &positional[1..]).await,
        _ => {
            eprintln!("usage: syncmesh <command> [--config <path>]");
            eprintln!();
            eprintln!("commands:");
            eprintln!("  agent                                        run the per-node sync agent");
            eprintln!("  consolidator                                 run the master consolidator");
            eprintln!("  health-monitor                               run the health monitor");
            eprintln!("  wake <node> <instance> [reason]              queue a remote wake request");
            eprintln!("  send <from> <to> <node> <type> <subject> [content]");
            eprintln!("                                               queue an outbound message");
            std::process::exit(2);
        }
    }
}

fn strip_config_flag(args: &[String]) -> Vec<String> {
    let mut positional = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            iter.next();
        } else {
            positional.push(arg.clone());
        }
    }
    positional
}

async fn wake_command(config_path: &str, args: &[String]) -> Result<()> {
    let (Some(node), Some(instance)) = (args.first(), args.get(1)) else {
        eprintln!("usage: syncmesh wake <node> <instance> [reason]");
        std::process::exit(2);
    };
    let reason = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| "Remote wake request".to_string());

    let cluster = load_cluster_config(config_path)?;
    if !cluster.nodes.contains(node) {
        return Err(anyhow::anyhow!("unknown node {} (known: {:?})", node, cluster.nodes));
    }
    if !cluster.instances.contains(instance) {
        return Err(anyhow::anyhow!(
            "unknown instance {} (known: {:?})",
            instance,
            cluster.instances
        ));
    }

    let settings = load_settings()?;
    let store = load_shared_store(&settings).await?;
    let clock = ClockImpl::System;
    enqueue_remote_wake(&store, &cluster.node_id, node, instance, &reason, clock.now_ms()).await?;

    println!("wake request queued for {instance} on node {node}");
    println!("the sync agent on node {node} will pick it up within {}s", settings.sync_interval_secs);
    Ok(())
}

async fn send_command(config_path: &str, args: &[String]) -> Result<()> {
    let (Some(from), Some(to), Some(target_node), Some(kind), Some(subject)) = (
        args.first(),
        args.get(1),
        args.get(2),
        args.get(3),
        args.get(4),
    ) else {
        eprintln!("usage: syncmesh send <from> <to> <target-node> <ASK|SHOW|TELL|BROADCAST> <subject> [content]");
        std::process::exit(2);
    };
    let content = args.get(5).cloned().unwrap_or_default();

    let message_type = MessageType::parse(kind)
        .ok_or_else(|| anyhow::anyhow!("unknown message type {} (ASK|SHOW|TELL|BROADCAST)", kind))?;

    let cluster = load_cluster_config(config_path)?;
    if !cluster.nodes.contains(target_node) {
        return Err(anyhow::anyhow!(
            "unknown target node {} (known: {:?})",
            target_node,
            cluster.nodes
        ));
    }

    let settings = load_settings()?;
    let local = LocalLayout::new(&settings.local_root);
    local.ensure_dirs()?;
    let clock = ClockImpl::System;
    let message = Message::new(
        message_type,
        from,
        to,
        Some(target_node.as_str()),
        subject,
        &content,
        clock.now_ms(),
    );
    queue_outbound(&local, message)?;

    println!("message from {from} to {to} queued for node {target_node}");
    Ok(())
}
