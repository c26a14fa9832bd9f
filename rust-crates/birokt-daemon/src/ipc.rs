//! Unix socket IPC server for transcripts and control commands
//!
//! One command per connection, one line per command:
//!
//! ```text
//! utterance <text>        finalized transcript
//! prefill <temp> [weather] temperature/weather from a lookup
//! listen | mute | toggle
//! status                  JSON status report
//! quit | exit | shutdown
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info};

use crate::Daemon;

/// IPC command
#[derive(Debug, Clone, PartialEq)]
pub enum IpcCommand {
    Utterance(String),
    Prefill {
        temperature: Option<f64>,
        weather: Option<String>,
    },
    Listen,
    Mute,
    Toggle,
    Status,
    Quit,
}

impl IpcCommand {
    pub fn parse(s: &str) -> Result<Self> {
        let line = s.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "utterance" | "say" => Ok(Self::Utterance(rest.to_string())),
            "prefill" => Self::parse_prefill(rest),
            "listen" => Ok(Self::Listen),
            "mute" => Ok(Self::Mute),
            "toggle" => Ok(Self::Toggle),
            "status" => Ok(Self::Status),
            "quit" | "exit" | "shutdown" => Ok(Self::Quit),
            _ => anyhow::bail!("Unknown command: {}", line),
        }
    }

    fn parse_prefill(rest: &str) -> Result<Self> {
        let (temp, weather) = match rest.split_once(char::is_whitespace) {
            Some((temp, weather)) => (temp, Some(weather.trim().to_string())),
            None => (rest, None),
        };

        let temperature = match temp {
            "" | "-" => None,
            t => Some(
                t.replace(',', ".")
                    .parse::<f64>()
                    .with_context(|| format!("Invalid temperature: {}", t))?,
            ),
        };

        Ok(Self::Prefill {
            temperature,
            weather: weather.filter(|w| !w.is_empty()),
        })
    }
}

/// Unix socket IPC server
pub struct IpcServer {
    listener: UnixListener,
    daemon: Arc<Daemon>,
}

impl IpcServer {
    pub fn new(socket_path: &Path, daemon: Arc<Daemon>) -> Result<Self> {
        // Remove stale socket from a previous run
        let _ = std::fs::remove_file(socket_path);
        if let Some(parent) = socket_path.parent() {
            birokt_paths::ensure_dir(parent)?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind {}", socket_path.display()))?;
        birokt_paths::secure_socket_permissions(socket_path)?;

        info!("IPC server listening on {}", socket_path.display());

        Ok(Self { listener, daemon })
    }

    /// Accept next IPC connection
    pub async fn accept(&self) -> Result<(UnixStream, Arc<Daemon>)> {
        let (stream, _) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok((stream, Arc::clone(&self.daemon)))
    }

    /// Accept forever, one task per connection
    pub async fn run(&self) -> Result<()> {
        loop {
            let (stream, daemon) = self.accept().await?;
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, daemon).await {
                    error!("IPC connection error: {}", e);
                }
            });
        }
    }
}

/// Handle a single IPC connection
pub async fn handle_connection(stream: UnixStream, daemon: Arc<Daemon>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut line = String::new();
    let n = BufReader::new(reader).read_line(&mut line).await?;

    if n == 0 {
        return Ok(());
    }

    debug!("Received IPC command: {}", line.trim());

    let response = match IpcCommand::parse(&line) {
        Ok(command) => execute(&daemon, command)
            .await
            .unwrap_or_else(|e| format!("Error: {}", e)),
        Err(e) => format!("Error: {}", e),
    };

    writer.write_all(response.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    Ok(())
}

async fn execute(daemon: &Daemon, command: IpcCommand) -> Result<String> {
    match command {
        IpcCommand::Utterance(text) => {
            daemon.utterance(&text);
            Ok("OK".to_string())
        }
        IpcCommand::Prefill {
            temperature,
            weather,
        } => {
            daemon.prefill(temperature, weather)?;
            Ok("OK".to_string())
        }
        IpcCommand::Listen => daemon.listen().await,
        IpcCommand::Mute => daemon.mute().await,
        IpcCommand::Toggle => daemon.toggle().await,
        IpcCommand::Status => daemon.status().await,
        IpcCommand::Quit => {
            info!("Received quit command");
            daemon.request_shutdown();
            Ok("Shutting down".to_string())
        }
    }
}
