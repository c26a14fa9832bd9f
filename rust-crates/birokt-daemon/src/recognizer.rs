//! Speech recognition input
//!
//! With a configured command, its stdout is read line by line and every
//! non-empty line is one finalized transcript. Without one, transcripts
//! only arrive through the IPC `utterance` command.

use std::process::Stdio;

use async_trait::async_trait;
use birokt_voice::{SpeechRecognizer, UtteranceSender, VoiceError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct CommandRecognizer {
    command: Vec<String>,
    running: Mutex<Option<(Child, JoinHandle<()>)>>,
}

impl CommandRecognizer {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            running: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn start(&self, utterances: UtteranceSender) -> birokt_voice::Result<()> {
        let Some((program, args)) = self.command.split_first() else {
            info!("No recognizer command configured, accepting transcripts over IPC");
            return Ok(());
        };

        let mut running = self.running.lock().await;
        if running.is_some() {
            return Ok(());
        }

        let mut child = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VoiceError::Recognizer(format!("failed to start {}: {}", program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VoiceError::Recognizer("recognizer stdout unavailable".to_string()))?;

        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if !line.is_empty() {
                            debug!("Recognized: {}", line);
                            utterances.on_utterance(line);
                        }
                    }
                    Ok(None) => {
                        warn!("Recognizer output closed");
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to read recognizer output: {}", e);
                        break;
                    }
                }
            }
        });

        info!("🎙️ Recognizer started: {}", program);
        *running = Some((child, reader));
        Ok(())
    }

    async fn stop(&self) {
        if let Some((mut child, reader)) = self.running.lock().await.take() {
            reader.abort();
            if let Err(e) = child.kill().await {
                debug!("Recognizer already exited: {}", e);
            }
            info!("Recognizer stopped");
        }
    }
}
