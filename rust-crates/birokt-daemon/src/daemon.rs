//! Daemon wiring: one inspection session behind the IPC surface

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use birokt_broadcaster::UiBroadcaster;
use birokt_voice::{
    AliasStore, AliasTable, ControllerHandle, EngineConfig, EngineEvent, EnginePorts, InspectionDraft,
    InspectionEngine, ListeningController, ListeningState, SpeechRecognizer, TomlAliasStore,
};
use chrono::Utc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::info;

use crate::camera::CommandCamera;
use crate::config::DaemonConfig;
use crate::persistence::JsonPersistence;
use crate::recognizer::CommandRecognizer;
use crate::speech::CommandSpeech;
use crate::ui::BroadcastSink;

pub struct Daemon {
    controller: ControllerHandle,
    broadcaster: Arc<UiBroadcaster>,
    session_id: i64,
    controller_task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    shutdown: Notify,
}

impl Daemon {
    /// Build every adapter from config and open an inspection session
    pub async fn from_config(config: &DaemonConfig) -> Result<Arc<Self>> {
        let aliases = TomlAliasStore::new(&config.alias_file)
            .load_aliases()
            .with_context(|| format!("Failed to load aliases from {}", config.alias_file.display()))?;

        if let Some(parent) = config.ui_socket_path.parent() {
            birokt_paths::ensure_dir(parent)?;
        }
        let broadcaster = Arc::new(
            UiBroadcaster::new(&config.ui_socket_path)
                .await
                .context("Failed to create UI broadcaster")?,
        );
        broadcaster
            .start()
            .await
            .context("Failed to start UI broadcaster")?;
        birokt_paths::secure_socket_permissions(&config.ui_socket_path)?;

        let ports = EnginePorts {
            camera: Arc::new(CommandCamera::new(
                config.camera.command.clone(),
                Duration::from_millis(config.camera.warmup_ms),
            )),
            speech: Arc::new(CommandSpeech::spawn(
                config.speech.command.clone(),
                config.speech.tone_command.clone(),
            )),
            ui: Arc::new(BroadcastSink::spawn(Arc::clone(&broadcaster))),
            persistence: Arc::new(JsonPersistence::new(&config.inspections_dir)),
        };
        let recognizer = Arc::new(CommandRecognizer::new(config.recognizer_command.clone()));

        Ok(Self::new(
            config.engine.clone(),
            &aliases,
            ports,
            recognizer,
            broadcaster,
        )
        .await)
    }

    /// Open a session over the given ports
    pub async fn new(
        engine_config: EngineConfig,
        aliases: &AliasTable,
        ports: EnginePorts,
        recognizer: Arc<dyn SpeechRecognizer>,
        broadcaster: Arc<UiBroadcaster>,
    ) -> Arc<Self> {
        let (engine, events) =
            InspectionEngine::new(engine_config, aliases, InspectionDraft::new(), ports);
        let (controller, task) = ListeningController::spawn(engine, events, recognizer);

        let session_id = Utc::now().timestamp_millis();
        broadcaster.start_session(session_id).await;
        info!("📋 Inspection session {} opened", session_id);

        Arc::new(Self {
            controller,
            broadcaster,
            session_id,
            controller_task: tokio::sync::Mutex::new(Some(task)),
            shutdown: Notify::new(),
        })
    }

    /// Finalized transcript from outside (IPC, tests)
    pub fn utterance(&self, text: &str) {
        self.controller.on_utterance(text);
    }

    /// Temperature/weather from an outside lookup; not undoable
    pub fn prefill(&self, temperature: Option<f64>, weather: Option<String>) -> Result<()> {
        self.controller
            .send_event(EngineEvent::Prefill {
                temperature,
                weather,
            })
            .context("Session closed")
    }

    pub async fn listen(&self) -> Result<String> {
        self.controller.start_listening().await?;
        self.broadcaster
            .broadcast_state_change(ListeningState::Listening)
            .await;
        Ok("Listening".to_string())
    }

    pub async fn mute(&self) -> Result<String> {
        self.controller.stop_listening().await?;
        self.broadcaster
            .broadcast_state_change(ListeningState::Idle)
            .await;
        Ok("Muted".to_string())
    }

    pub async fn toggle(&self) -> Result<String> {
        let state = self.controller.toggle().await?;
        self.broadcaster.broadcast_state_change(state).await;
        info!("Listening state: {}", state);
        Ok(match state {
            ListeningState::Listening => "Listening".to_string(),
            ListeningState::Idle => "Muted".to_string(),
        })
    }

    /// Listening state and session snapshot as JSON
    pub async fn status(&self) -> Result<String> {
        let report = self.controller.status().await?;
        serde_json::to_string(&report).context("Failed to serialize status")
    }

    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }

    pub async fn wait_for_shutdown(&self) {
        self.shutdown.notified().await;
    }

    /// Close the session and the UI socket
    pub async fn shutdown(&self) -> Result<()> {
        // Already closed when the controller is gone
        let _ = self.controller.shutdown().await;
        if let Some(task) = self.controller_task.lock().await.take() {
            let _ = task.await;
        }

        self.broadcaster
            .broadcast_state_change(ListeningState::Idle)
            .await;
        self.broadcaster.end_session(self.session_id).await;
        let _ = self.broadcaster.stop().await;

        info!("Inspection session {} closed", self.session_id);
        Ok(())
    }
}
