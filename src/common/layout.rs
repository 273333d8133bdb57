use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Shared-folder keys. These are store-relative paths, the same strings for
/// the filesystem, S3 and in-memory backends.
pub fn node_dir(node: &str) -> String {
    format!("NODE_{node}")
}

pub fn status_path(node: &str) -> String {
    format!("NODE_{node}/status.json")
}

pub fn wake_queue_path(node: &str) -> String {
    format!("NODE_{node}/wake_requests.json")
}

pub fn inbound_messages_path(node: &str) -> String {
    format!("NODE_{node}/messages_inbound.json")
}

pub const MASTER_DIR: &str = "MASTER";

pub fn consolidated_status_path() -> String {
    format!("{MASTER_DIR}/consolidated_status.json")
}

pub fn commander_inbox_path() -> String {
    format!("{MASTER_DIR}/commander_inbox.json")
}

pub fn health_report_path() -> String {
    format!("{MASTER_DIR}/health_report.json")
}

pub fn phone_view_path() -> String {
    format!("{MASTER_DIR}/phone_view.json")
}

/// Extracts the node id from a `NODE_<id>` directory name.
pub fn node_id_from_dir(dir: &str) -> Option<&str> {
    dir.trim_end_matches('/').strip_prefix("NODE_")
}

/// Layout of the node-local working directory: instance status artifacts,
/// inboxes, the outbound queue and wake flags.
#[derive(Debug, Clone)]
pub struct LocalLayout {
    root: PathBuf,
}

impl LocalLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_owned(),
        }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in ["STATUS", "MESSAGES", "WAKE_REQUESTS"] {
            create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    pub fn instance_status_file(&self, instance: &str) -> PathBuf {
        self.root.join("STATUS").join(format!("{instance}_status.json"))
    }

    pub fn inbox_file(&self, recipient: &str) -> PathBuf {
        self.root
            .join("MESSAGES")
            .join(format!("{}_inbox.json", recipient.to_lowercase()))
    }

    pub fn outbound_queue_file(&self) -> PathBuf {
        self.root.join("MESSAGES").join("outbound_queue.json")
    }

    pub fn wake_flag_file(&self, instance: &str) -> PathBuf {
        self.root
            .join("WAKE_REQUESTS")
            .join(format!("wake_{instance}.flag"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_paths_follow_node_layout() {
        assert_eq!(status_path("A"), "NODE_A/status.json");
        assert_eq!(wake_queue_path("B"), "NODE_B/wake_requests.json");
        assert_eq!(inbound_messages_path("C"), "NODE_C/messages_inbound.json");
        assert_eq!(consolidated_status_path(), "MASTER/consolidated_status.json");
    }

    #[test]
    fn node_id_round_trips_through_dir_name() {
        assert_eq!(node_id_from_dir(&node_dir("A")), Some("A"));
        assert_eq!(node_id_from_dir("NODE_B/"), Some("B"));
        assert_eq!(node_id_from_dir("MASTER"), None);
    }
}
