//! Daemon fixtures rooted in a temporary directory

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use birokt_daemon::{Daemon, DaemonConfig};
use tempfile::TempDir;

pub struct TestDaemon {
    pub daemon: Arc<Daemon>,
    pub config: DaemonConfig,
    pub dir: TempDir,
}

impl TestDaemon {
    /// Saved inspection directories, oldest first
    pub fn inspections(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.config.inspections_dir) else {
            return Vec::new();
        };
        let mut dirs: Vec<_> = entries.map(|e| e.unwrap().path()).collect();
        dirs.sort();
        dirs
    }
}

/// Config with every path inside `dir` and no external commands
pub fn test_config(dir: &TempDir) -> DaemonConfig {
    let mut config = DaemonConfig {
        config_path: dir.path().join("config.toml"),
        ipc_socket_path: dir.path().join("ipc.sock"),
        ui_socket_path: dir.path().join("ui.sock"),
        alias_file: dir.path().join("aliases.toml"),
        inspections_dir: dir.path().join("inspections"),
        ..DaemonConfig::default()
    };
    config.engine.camera_poll_interval_ms = 5;
    config
}

pub async fn test_daemon() -> TestDaemon {
    test_daemon_with_aliases("").await
}

/// `aliases` is written to the alias file first when non-empty
pub async fn test_daemon_with_aliases(aliases: &str) -> TestDaemon {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    if !aliases.is_empty() {
        std::fs::write(&config.alias_file, aliases).unwrap();
    }
    let daemon = Daemon::from_config(&config).await.unwrap();
    TestDaemon {
        daemon,
        config,
        dir,
    }
}

pub async fn status_json(daemon: &Daemon) -> serde_json::Value {
    serde_json::from_str(&daemon.status().await.unwrap()).unwrap()
}
