use serde::Deserialize;

use std::fs::File;
use std::io::BufReader;
use anyhow::Result;

/// Cluster topology: which nodes exist and who we are.
#[derive(Debug, Deserialize, Clone)]
pub struct ClusterConfig {
    pub cluster_id: String,
    pub node_id: String,
    pub nodes: Vec<String>,
    pub instances: Vec<String>,
}

impl ClusterConfig {
    pub fn peers(&self) -> impl Iterator<Item = &String> {
        self.nodes.iter().filter(|n| **n != self.node_id)
    }
}

pub fn load_cluster_config(path: &str) -> Result<ClusterConfig> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config: ClusterConfig = serde_json::from_reader(reader)?;
    if !config.nodes.contains(&config.node_id) {
        return Err(anyhow::anyhow!(
            "node_id {} is not listed in nodes {:?}",
            config.node_id,
            config.nodes
        ));
    }
    Ok(config)
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    File,
    S3,
    Memory,
}

/// Process settings, loaded from environment variables with a SYNCMESH_ prefix
/// (optionally via a .env file). Thresholds are policy values, not I/O timeouts.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_store_type")]
    pub store_type: StorageType,
    #[serde(default = "default_shared_root")]
    pub shared_root: String,
    #[serde(default = "default_local_root")]
    pub local_root: String,
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    #[serde(default = "default_node_offline_seconds")]
    pub node_offline_seconds: f64,
    #[serde(default = "default_consolidated_stale_seconds")]
    pub consolidated_stale_seconds: f64,
    #[serde(default = "default_instance_stale_minutes")]
    pub instance_stale_minutes: i64,
    #[serde(default = "default_min_active_instances")]
    pub min_active_instances: usize,
    #[serde(default = "default_consecutive_failure_alerts")]
    pub consecutive_failure_alerts: u32,
    #[serde(default)]
    pub rest_port: Option<u16>,
    #[serde(default)]
    pub s3_bucket: Option<String>,
    #[serde(default)]
    pub s3_prefix: Option<String>,
    #[serde(default)]
    pub s3_endpoint: Option<String>,
    #[serde(default)]
    pub s3_access_key: Option<String>,
    #[serde(default)]
    pub s3_secret_key: Option<String>,
    #[serde(default)]
    pub s3_region: Option<String>,
}

fn default_store_type() -> StorageType {
    StorageType::File
}

fn default_shared_root() -> String {
    "./shared".to_string()
}

fn default_local_root() -> String {
    "./local".to_string()
}

fn default_sync_interval_secs() -> u64 {
    30
}

fn default_node_offline_seconds() -> f64 {
    120.0
}

fn default_consolidated_stale_seconds() -> f64 {
    60.0
}

fn default_instance_stale_minutes() -> i64 {
    10
}

fn default_min_active_instances() -> usize {
    3
}

fn default_consecutive_failure_alerts() -> u32 {
    3
}

pub fn load_settings() -> Result<Settings> {
    dotenv::dotenv().ok();
    let loaded = config::Config::builder()
        .add_source(config::Environment::with_prefix("SYNCMESH").try_parsing(true))
        .build()?;
    let settings = loaded.try_deserialize::<Settings>()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cluster_config_rejects_unknown_node_id() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"cluster_id":"mesh","node_id":"Z","nodes":["A","B"],"instances":["c1"]}}"#
        )
        .unwrap();
        let result = load_cluster_config(file.path().to_str().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn cluster_config_loads_and_lists_peers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"cluster_id":"mesh","node_id":"A","nodes":["A","B","C"],"instances":["c1","c2","c3"]}}"#
        )
        .unwrap();
        let config = load_cluster_config(file.path().to_str().unwrap()).unwrap();
        let peers: Vec<_> = config.peers().cloned().collect();
        assert_eq!(peers, vec!["B".to_string(), "C".to_string()]);
    }
}
