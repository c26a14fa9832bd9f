//! Configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use birokt_voice::EngineConfig;
use serde::{Deserialize, Serialize};

/// External still-capture command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Program and arguments; must write one JPEG to stdout.
    /// Empty disables the camera.
    pub command: Vec<String>,

    /// Time after start before the first capture is attempted
    pub warmup_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            warmup_ms: 1500,
        }
    }
}

/// External text-to-speech command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Program and arguments; the sentence is appended as the last argument.
    /// `{locale}` in an argument is replaced by the session locale.
    /// Empty logs sentences instead of speaking them.
    pub command: Vec<String>,

    /// Played once per wake before the first sentence
    pub tone_command: Vec<String>,
}

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Path to configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Unix socket for transcripts and control commands
    pub ipc_socket_path: PathBuf,

    /// Unix socket UI clients connect to
    pub ui_socket_path: PathBuf,

    pub alias_file: PathBuf,

    /// Saved inspections go here, one directory each
    pub inspections_dir: PathBuf,

    /// Speech-to-text command printing one finalized transcript per line.
    /// Empty means transcripts arrive over IPC only.
    pub recognizer_command: Vec<String>,

    /// Start listening as soon as the daemon is up
    pub listen_on_start: bool,

    pub camera: CameraConfig,

    pub speech: SpeechConfig,

    pub engine: EngineConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        let socket_dir = birokt_paths::get_socket_dir().unwrap_or_else(|_| std::env::temp_dir());
        let config_dir = birokt_paths::get_config_dir().unwrap_or_else(|_| PathBuf::from("."));
        let data_dir = birokt_paths::get_data_dir().unwrap_or_else(|_| PathBuf::from("."));

        Self {
            config_path: config_dir.join("config.toml"),
            ipc_socket_path: socket_dir.join("birokt.sock"),
            ui_socket_path: socket_dir.join("birokt_ui.sock"),
            alias_file: config_dir.join("aliases.toml"),
            inspections_dir: data_dir.join("inspections"),
            recognizer_command: Vec::new(),
            listen_on_start: false,
            camera: CameraConfig::default(),
            speech: SpeechConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load from the platform config path, creating it with defaults
    pub fn load() -> Result<Self> {
        let path = birokt_paths::get_config_file_path()
            .context("Failed to determine config file path")?;
        Self::load_from(&path)
    }

    /// Load from `path`, creating it with defaults when missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;

            let mut config: DaemonConfig = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;

            config.config_path = path.to_path_buf();
            config.engine = config.engine.validated();
            Ok(config)
        } else {
            let config = Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            };
            config.save().context("Failed to save default config")?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents).context("Failed to write config file")?;

        Ok(())
    }
}
