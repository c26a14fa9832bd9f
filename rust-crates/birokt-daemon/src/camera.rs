//! Camera backed by an external still-capture command
//!
//! `start` only arms the camera; the command runs once per capture and must
//! print a single JPEG to stdout. Readiness is a fixed warm-up after start.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use birokt_voice::{Camera, ImageBlob, VoiceError};
use tokio::process::Command;
use tracing::{debug, info};

pub struct CommandCamera {
    command: Vec<String>,
    warmup: Duration,
    started_at: Mutex<Option<Instant>>,
}

impl CommandCamera {
    pub fn new(command: Vec<String>, warmup: Duration) -> Self {
        Self {
            command,
            warmup,
            started_at: Mutex::new(None),
        }
    }

    fn started_at(&self) -> Option<Instant> {
        *self.started_at.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_started_at(&self, value: Option<Instant>) {
        *self.started_at.lock().unwrap_or_else(|e| e.into_inner()) = value;
    }
}

#[async_trait]
impl Camera for CommandCamera {
    async fn start(&self) -> birokt_voice::Result<()> {
        if self.command.is_empty() {
            return Err(VoiceError::CameraUnavailable(
                "no capture command configured".to_string(),
            ));
        }

        self.set_started_at(Some(Instant::now()));
        info!("📷 Camera armed ({}), warm-up {:?}", self.command[0], self.warmup);
        Ok(())
    }

    async fn stop(&self) {
        self.set_started_at(None);
        debug!("Camera disarmed");
    }

    async fn capture(&self) -> birokt_voice::Result<ImageBlob> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| VoiceError::CameraUnavailable("no capture command configured".to_string()))?;

        let output = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| VoiceError::Capture(format!("failed to run {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Capture(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(VoiceError::Capture(format!("{} produced no image", program)));
        }

        debug!("Captured {} bytes", output.stdout.len());
        Ok(ImageBlob::jpeg(output.stdout))
    }

    fn is_ready(&self) -> bool {
        self.started_at()
            .map(|t| t.elapsed() >= self.warmup)
            .unwrap_or(false)
    }
}
