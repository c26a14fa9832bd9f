use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::events::{FeedbackEntry, UiEvent};

/// What a client needs to render the current inspection on connect
#[derive(Debug, Clone)]
pub struct CatchUp {
    pub state: String,
    pub session_id: Option<i64>,
    pub feedback: Vec<FeedbackEntry>,
    pub draft: Option<UiEvent>,
    pub photos: u32,
    pub undo: UiEvent,
}

/// Client connection wrapper
pub struct Client {
    stream: UnixStream,
}

impl Client {
    pub fn new(stream: UnixStream) -> Self {
        Self { stream }
    }

    pub async fn send_event(&mut self, event: &UiEvent) -> Result<()> {
        let json_line = event.to_json_line()?;
        self.stream.write_all(json_line.as_bytes()).await?;
        Ok(())
    }

    /// Replay current state to a new client
    pub async fn send_catch_up(&mut self, catch_up: &CatchUp, timestamp: f64) -> Result<()> {
        self.send_event(&UiEvent::StateChange {
            state: catch_up.state.clone(),
            timestamp,
        })
        .await?;

        if let Some(session_id) = catch_up.session_id {
            self.send_event(&UiEvent::SessionStart {
                session_id,
                timestamp,
            })
            .await?;
        }

        for entry in &catch_up.feedback {
            self.send_event(&UiEvent::from(entry)).await?;
        }

        if let Some(draft) = &catch_up.draft {
            self.send_event(draft).await?;
        }
        self.send_event(&UiEvent::Photos {
            count: catch_up.photos,
        })
        .await?;
        self.send_event(&catch_up.undo).await?;

        Ok(())
    }
}

/// Shared client list
pub struct ClientManager {
    clients: Arc<Mutex<Vec<Client>>>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn add_client(&self, client: Client) {
        let mut clients = self.clients.lock().await;
        clients.push(client);
        tracing::info!("UI client connected. Total clients: {}", clients.len());
    }

    /// Send to every client, dropping the ones whose socket is gone
    pub async fn broadcast(&self, event: &UiEvent) -> Result<()> {
        let mut clients = self.clients.lock().await;
        let before = clients.len();

        let mut alive = Vec::with_capacity(before);
        for mut client in clients.drain(..) {
            match client.send_event(event).await {
                Ok(()) => alive.push(client),
                Err(e) => tracing::warn!("Dropping UI client: {}", e),
            }
        }
        *clients = alive;

        if clients.len() < before {
            tracing::info!("Removed {} dead clients. Remaining: {}", before - clients.len(), clients.len());
        }

        Ok(())
    }

    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub fn clone_arc(&self) -> Arc<Mutex<Vec<Client>>> {
        Arc::clone(&self.clients)
    }
}

impl Default for ClientManager {
    fn default() -> Self {
        Self::new()
    }
}
