use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use birokt_voice::{InspectionDraft, ListeningState, SessionSnapshot};
use chrono::{Local, Utc};
use tokio::net::UnixListener;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::client::{CatchUp, Client, ClientManager};
use crate::error::{BroadcasterError, Result};
use crate::events::{FeedbackEntry, UiEvent};

/// Most confirmations kept for catch-up
const MAX_FEEDBACK: usize = 32;

/// A confirmation and the moment its TTL runs out
#[derive(Debug, Clone)]
struct LoggedFeedback {
    entry: FeedbackEntry,
    expires_at: Instant,
}

/// Last known values, replayed to clients that connect mid-inspection
#[derive(Debug, Clone)]
struct UiState {
    state: String,
    session_id: Option<i64>,
    feedback: Vec<LoggedFeedback>,
    draft: Option<InspectionDraft>,
    photos: u32,
    undo_available: bool,
    undo_depth: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            state: ListeningState::Idle.to_string(),
            session_id: None,
            feedback: Vec::new(),
            draft: None,
            photos: 0,
            undo_available: false,
            undo_depth: 0,
        }
    }
}

impl UiState {
    fn live_feedback(&self, now: Instant) -> impl Iterator<Item = &FeedbackEntry> {
        self.feedback
            .iter()
            .filter(move |f| f.expires_at > now)
            .map(|f| &f.entry)
    }

    /// Only confirmations still on screen are replayed
    fn catch_up(&self) -> CatchUp {
        CatchUp {
            state: self.state.clone(),
            session_id: self.session_id,
            feedback: self.live_feedback(Instant::now()).cloned().collect(),
            draft: self.draft.clone().map(|draft| UiEvent::Draft { draft }),
            photos: self.photos,
            undo: UiEvent::Undo {
                available: self.undo_available,
                depth: self.undo_depth,
            },
        }
    }
}

/// Fans UI events out to every connected client
pub struct UiBroadcaster {
    socket_path: PathBuf,
    client_manager: ClientManager,
    state: Arc<RwLock<UiState>>,
    accept_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    running: Arc<RwLock<bool>>,
}

impl UiBroadcaster {
    pub async fn new(socket_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            client_manager: ClientManager::new(),
            state: Arc::new(RwLock::new(UiState::default())),
            accept_task: Arc::new(Mutex::new(None)),
            running: Arc::new(RwLock::new(false)),
        })
    }

    /// Bind the socket and start accepting clients
    pub async fn start(&self) -> Result<()> {
        if *self.running.read().await {
            return Err(BroadcasterError::AlreadyRunning);
        }

        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if self.socket_path.exists() {
                std::fs::set_permissions(&self.socket_path, std::fs::Permissions::from_mode(0o600))?;
            }
        }

        tracing::info!("UI broadcaster started on {:?} (permissions: 0600)", self.socket_path);

        *self.running.write().await = true;

        let clients = self.client_manager.clone_arc();
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        let task = tokio::spawn(async move {
            loop {
                if !*running.read().await {
                    break;
                }

                match listener.accept().await {
                    Ok((stream, _addr)) => {
                        let mut client = Client::new(stream);
                        let catch_up = state.read().await.catch_up();

                        if let Err(e) = client.send_catch_up(&catch_up, now_seconds()).await {
                            tracing::warn!("Failed to send catch-up data: {}", e);
                            continue;
                        }

                        let mut clients = clients.lock().await;
                        clients.push(client);
                        tracing::info!("UI client added. Total: {}", clients.len());
                    }
                    Err(e) => {
                        tracing::error!("Failed to accept UI client: {}", e);
                    }
                }
            }
            tracing::info!("UI client acceptance task stopped");
        });

        *self.accept_task.lock().await = Some(task);

        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        if !*self.running.read().await {
            return Err(BroadcasterError::NotStarted);
        }

        *self.running.write().await = false;

        if let Some(task) = self.accept_task.lock().await.take() {
            task.abort();
        }

        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        tracing::info!("UI broadcaster stopped");
        Ok(())
    }

    /// New inspection: clears the feedback log and cached session state
    pub async fn start_session(&self, session_id: i64) {
        {
            let mut state = self.state.write().await;
            let listening = std::mem::take(&mut state.state);
            *state = UiState {
                state: listening,
                session_id: Some(session_id),
                ..UiState::default()
            };
        }

        self.send(UiEvent::SessionStart {
            session_id,
            timestamp: now_seconds(),
        })
        .await;
        tracing::info!("Inspection session started: {}", session_id);
    }

    /// Inspection closed; the feedback log stays visible
    pub async fn end_session(&self, session_id: i64) {
        self.state.write().await.session_id = None;

        self.send(UiEvent::SessionEnd {
            session_id,
            timestamp: now_seconds(),
        })
        .await;
        tracing::info!("Inspection session ended: {}", session_id);
    }

    pub async fn broadcast_state_change(&self, state: ListeningState) {
        let state = state.to_string();
        self.state.write().await.state = state.clone();

        self.send(UiEvent::StateChange {
            state,
            timestamp: now_seconds(),
        })
        .await;
    }

    /// Log and broadcast a transient confirmation
    pub async fn add_feedback(&self, message: &str, ttl: Duration) {
        let entry = FeedbackEntry {
            message: message.to_string(),
            ttl_ms: ttl.as_millis() as u64,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        };

        let event = UiEvent::from(&entry);
        {
            let now = Instant::now();
            let mut state = self.state.write().await;
            state.feedback.retain(|f| f.expires_at > now);
            state.feedback.push(LoggedFeedback {
                entry,
                expires_at: now + ttl,
            });
            let excess = state.feedback.len().saturating_sub(MAX_FEEDBACK);
            state.feedback.drain(..excess);
        }
        self.send(event).await;
    }

    pub async fn broadcast_correction(&self, matched: &str, similarity: f64) {
        self.send(UiEvent::Correction {
            matched: matched.to_string(),
            similarity,
        })
        .await;
    }

    pub async fn broadcast_notice(&self, message: &str) {
        self.send(UiEvent::Notice {
            message: message.to_string(),
        })
        .await;
    }

    /// Publish draft, photo count and undo availability
    pub async fn broadcast_snapshot(&self, snapshot: &SessionSnapshot) {
        {
            let mut state = self.state.write().await;
            state.draft = Some(snapshot.draft.clone());
            state.photos = snapshot.photo_count;
            state.undo_available = snapshot.undo_available;
            state.undo_depth = snapshot.undo_depth;
        }

        self.send(UiEvent::Draft {
            draft: snapshot.draft.clone(),
        })
        .await;
        self.send(UiEvent::Photos {
            count: snapshot.photo_count,
        })
        .await;
        self.send(UiEvent::Undo {
            available: snapshot.undo_available,
            depth: snapshot.undo_depth,
        })
        .await;
    }

    pub async fn client_count(&self) -> usize {
        self.client_manager.client_count().await
    }

    /// Confirmations from this session whose TTL has not run out
    pub async fn feedback_count(&self) -> usize {
        self.state.read().await.live_feedback(Instant::now()).count()
    }

    async fn send(&self, event: UiEvent) {
        if let Err(e) = self.client_manager.broadcast(&event).await {
            tracing::error!("Failed to broadcast {:?}: {}", event, e);
        }
    }
}

fn now_seconds() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

impl Drop for UiBroadcaster {
    fn drop(&mut self) {
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}
