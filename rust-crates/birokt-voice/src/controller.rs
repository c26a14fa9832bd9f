//! Listening controller
//!
//! Runs the engine on a single task. Requests from the outside world
//! (utterances, start/stop, status queries) and events produced by the
//! engine itself (camera readiness) are consumed by one loop, so no two
//! utterances are ever interpreted concurrently.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::engine::{EngineEvent, InspectionEngine};
use crate::error::{Result, VoiceError};
use crate::ports::SpeechRecognizer;
use crate::session::SessionSnapshot;

/// Microphone state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListeningState {
    Idle,
    Listening,
}

impl fmt::Display for ListeningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListeningState::Idle => write!(f, "idle"),
            ListeningState::Listening => write!(f, "listening"),
        }
    }
}

/// Reply to a status query
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub state: ListeningState,
    pub session: SessionSnapshot,
}

enum Request {
    Utterance(String),
    Event(EngineEvent),
    Start(oneshot::Sender<Result<()>>),
    Stop(oneshot::Sender<()>),
    Toggle(oneshot::Sender<Result<ListeningState>>),
    Status(oneshot::Sender<StatusReport>),
    Shutdown(oneshot::Sender<()>),
}

/// Handed to the speech recognizer; delivers finalized results.
///
/// Does not keep the controller alive: once every [`ControllerHandle`] is
/// dropped the loop shuts down and later utterances are discarded.
#[derive(Clone)]
pub struct UtteranceSender {
    tx: mpsc::WeakUnboundedSender<Request>,
}

impl UtteranceSender {
    pub fn on_utterance(&self, text: impl Into<String>) {
        let sent = self
            .tx
            .upgrade()
            .is_some_and(|tx| tx.send(Request::Utterance(text.into())).is_ok());
        if !sent {
            debug!("Controller gone, utterance dropped");
        }
    }
}

/// Cloneable handle to a running controller
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<Request>,
}

impl ControllerHandle {
    pub fn on_utterance(&self, text: impl Into<String>) {
        let _ = self.tx.send(Request::Utterance(text.into()));
    }

    /// Queue an engine event (e.g. a weather prefill)
    pub fn send_event(&self, event: EngineEvent) -> Result<()> {
        self.tx
            .send(Request::Event(event))
            .map_err(|_| VoiceError::SessionClosed)
    }

    pub async fn start_listening(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Start(reply))?;
        rx.await.map_err(|_| VoiceError::SessionClosed)?
    }

    pub async fn stop_listening(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Stop(reply))?;
        rx.await.map_err(|_| VoiceError::SessionClosed)
    }

    /// Start when idle, stop when listening. Returns the new state.
    pub async fn toggle(&self) -> Result<ListeningState> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Toggle(reply))?;
        rx.await.map_err(|_| VoiceError::SessionClosed)?
    }

    pub async fn status(&self) -> Result<StatusReport> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Status(reply))?;
        rx.await.map_err(|_| VoiceError::SessionClosed)
    }

    /// Stop listening, tear the session down and end the loop
    pub async fn shutdown(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Shutdown(reply))?;
        rx.await.map_err(|_| VoiceError::SessionClosed)
    }

    fn send(&self, request: Request) -> Result<()> {
        self.tx.send(request).map_err(|_| VoiceError::SessionClosed)
    }
}

pub struct ListeningController {
    engine: InspectionEngine,
    events: mpsc::UnboundedReceiver<EngineEvent>,
    recognizer: Arc<dyn SpeechRecognizer>,
    requests: mpsc::UnboundedReceiver<Request>,
    requests_tx: mpsc::WeakUnboundedSender<Request>,
    state: ListeningState,
}

impl ListeningController {
    pub fn new(
        engine: InspectionEngine,
        events: mpsc::UnboundedReceiver<EngineEvent>,
        recognizer: Arc<dyn SpeechRecognizer>,
    ) -> (Self, ControllerHandle) {
        let (requests_tx, requests) = mpsc::unbounded_channel();
        let controller = Self {
            engine,
            events,
            recognizer,
            requests,
            requests_tx: requests_tx.downgrade(),
            state: ListeningState::Idle,
        };

        (controller, ControllerHandle { tx: requests_tx })
    }

    /// Spawn the loop on the current runtime
    pub fn spawn(
        engine: InspectionEngine,
        events: mpsc::UnboundedReceiver<EngineEvent>,
        recognizer: Arc<dyn SpeechRecognizer>,
    ) -> (ControllerHandle, tokio::task::JoinHandle<()>) {
        let (controller, handle) = Self::new(engine, events, recognizer);
        let task = tokio::spawn(controller.run());
        (handle, task)
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    /// Consume requests and engine events until shutdown or until every
    /// handle is dropped
    pub async fn run(mut self) {
        info!("Listening controller running");

        loop {
            tokio::select! {
                request = self.requests.recv() => {
                    match request {
                        Some(Request::Shutdown(reply)) => {
                            self.shutdown().await;
                            let _ = reply.send(());
                            break;
                        }
                        Some(request) => self.handle_request(request).await,
                        None => {
                            info!("All controller handles dropped");
                            self.shutdown().await;
                            break;
                        }
                    }
                }
                Some(event) = self.events.recv() => {
                    self.engine.handle_event(event).await;
                }
            }
        }

        info!("Listening controller stopped");
    }

    async fn handle_request(&mut self, request: Request) {
        match request {
            Request::Utterance(text) => {
                if self.state != ListeningState::Listening {
                    debug!("Not listening, dropping utterance");
                    return;
                }
                self.engine.handle_event(EngineEvent::Utterance(text)).await;
            }
            Request::Event(event) => {
                self.engine.handle_event(event).await;
            }
            Request::Start(reply) => {
                let _ = reply.send(self.start().await);
            }
            Request::Stop(reply) => {
                self.stop().await;
                let _ = reply.send(());
            }
            Request::Toggle(reply) => {
                let result = match self.state {
                    ListeningState::Idle => self.start().await.map(|_| self.state),
                    ListeningState::Listening => {
                        self.stop().await;
                        Ok(self.state)
                    }
                };
                let _ = reply.send(result);
            }
            Request::Status(reply) => {
                let _ = reply.send(StatusReport {
                    state: self.state,
                    session: self.engine.snapshot(),
                });
            }
            Request::Shutdown(reply) => {
                self.shutdown().await;
                let _ = reply.send(());
            }
        }
    }

    async fn start(&mut self) -> Result<()> {
        if self.engine.is_closed() {
            return Err(VoiceError::SessionClosed);
        }
        if self.state == ListeningState::Listening {
            return Ok(());
        }

        let utterances = UtteranceSender {
            tx: self.requests_tx.clone(),
        };
        if let Err(e) = self.recognizer.start(utterances).await {
            error!("Failed to start speech recognition: {}", e);
            return Err(e);
        }

        self.engine.wake();
        self.state = ListeningState::Listening;
        info!("Listening");
        Ok(())
    }

    async fn stop(&mut self) {
        if self.state == ListeningState::Idle {
            return;
        }

        self.recognizer.stop().await;
        self.state = ListeningState::Idle;
        info!("Stopped listening");
    }

    async fn shutdown(&mut self) {
        self.stop().await;
        self.engine.teardown().await;

        // Anything still queued belongs to the closed session
        let mut dropped = 0;
        while self.events.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            warn!("Dropped {} engine events after teardown", dropped);
        }
    }
}
