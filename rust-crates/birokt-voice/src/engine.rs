//! Inspection engine
//!
//! Owns the session and every port. One utterance is interpreted to
//! completion before the next is looked at:
//!
//! ```text
//! raw → normalize → classify ─┬─ control command → execute → confirm
//!                             └─ parse → correct → apply → dispatch action
//!                                      → confirm → notes
//! ```
//!
//! Camera readiness runs as a spawned poll that reports back through the
//! engine's event channel, so the capture itself always happens inside the
//! engine against the current session state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::alias::AliasTable;
use crate::camera::{wait_until_ready, Activation, Camera, Readiness};
use crate::classifier::{classify, ControlCommand};
use crate::config::EngineConfig;
use crate::draft::InspectionDraft;
use crate::feedback::{AudioFeedback, SpeechSynthesizer};
use crate::fuzzy::{CorrectionResult, FuzzyCorrector};
use crate::normalizer::normalize;
use crate::parser::{parse, Action};
use crate::ports::{Persistence, UiSink};
use crate::session::{InspectionSession, SessionSnapshot};

/// Everything that reaches the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Finalized recognition result
    Utterance(String),
    /// Readiness poll for `generation` succeeded
    CameraReady { generation: u64 },
    /// Readiness poll for `generation` ran out of attempts
    CameraTimedOut { generation: u64 },
    /// Weather lookup result
    Prefill {
        temperature: Option<f64>,
        weather: Option<String>,
    },
}

/// What an utterance was understood as
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    Control(ControlCommand),
    /// Field deltas and/or an action, possibly after correction
    Command(CorrectionResult),
    /// Nothing recognized; dropped silently
    Unrecognized,
}

impl Interpretation {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Interpretation::Unrecognized)
    }
}

/// Injected platform services
#[derive(Clone)]
pub struct EnginePorts {
    pub camera: Arc<dyn Camera>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub ui: Arc<dyn UiSink>,
    pub persistence: Arc<dyn Persistence>,
}

pub struct InspectionEngine {
    config: EngineConfig,
    session: InspectionSession,
    corrector: FuzzyCorrector,
    feedback: AudioFeedback,
    camera: Arc<dyn Camera>,
    ui: Arc<dyn UiSink>,
    persistence: Arc<dyn Persistence>,
    activation: watch::Sender<Activation>,
    generation: u64,
    events: mpsc::UnboundedSender<EngineEvent>,
    closed: bool,
}

impl InspectionEngine {
    /// Create an engine for one inspection.
    ///
    /// Returns the engine and the receiving end of its event channel; the
    /// caller drives the engine by feeding received events back into
    /// [`InspectionEngine::handle_event`].
    pub fn new(
        config: EngineConfig,
        aliases: &AliasTable,
        draft: InspectionDraft,
        ports: EnginePorts,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let config = config.validated();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (activation, _) = watch::channel(None);

        info!(
            "Inspection engine ready ({} aliases, threshold {})",
            aliases.len(),
            config.fuzzy_threshold
        );

        let engine = Self {
            corrector: FuzzyCorrector::new(aliases, config.fuzzy_threshold, config.similarity_metric),
            feedback: AudioFeedback::new(ports.speech, config.locale.clone()),
            session: InspectionSession::new(draft, config.notes_trace_prefix.clone()),
            camera: ports.camera,
            ui: ports.ui,
            persistence: ports.persistence,
            activation,
            generation: 0,
            events: events_tx,
            closed: false,
            config,
        };

        (engine, events_rx)
    }

    /// Sender for events produced outside the engine (utterances, lookups)
    pub fn events(&self) -> mpsc::UnboundedSender<EngineEvent> {
        self.events.clone()
    }

    pub fn session(&self) -> &InspectionSession {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Listening (re)started
    pub fn wake(&mut self) {
        self.feedback.wake();
    }

    /// Process one event to completion
    pub async fn handle_event(&mut self, event: EngineEvent) -> Option<Interpretation> {
        if self.closed {
            debug!("Engine closed, dropping {:?}", event);
            return None;
        }

        match event {
            EngineEvent::Utterance(text) => Some(self.handle_utterance(&text).await),
            EngineEvent::CameraReady { generation } => {
                self.on_camera_ready(generation).await;
                None
            }
            EngineEvent::CameraTimedOut { generation } => {
                self.on_camera_timeout(generation).await;
                None
            }
            EngineEvent::Prefill {
                temperature,
                weather,
            } => {
                debug!("Prefill: temperature={:?} weather={:?}", temperature, weather);
                self.session.prefill(temperature, weather);
                self.publish();
                None
            }
        }
    }

    /// Interpret one finalized utterance
    pub async fn handle_utterance(&mut self, raw: &str) -> Interpretation {
        if self.closed {
            debug!("Engine closed, dropping utterance");
            return Interpretation::Unrecognized;
        }

        debug!("Utterance: {:?}", raw);
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Interpretation::Unrecognized;
        }

        if let Some(command) = classify(&normalized) {
            info!("Control command: {}", command);
            self.execute_control(command).await;
            self.publish();
            return Interpretation::Control(command);
        }

        let correction = self.corrector.correct(&normalized, parse(&normalized));
        let parsed = correction.parsed.clone();

        if let (Some(matched), Some(similarity)) = (&correction.matched, correction.similarity) {
            info!(
                "Corrected {:?} → {:?} (similarity {:.3})",
                normalized, matched, similarity
            );
            self.ui.correction(matched, similarity);
        }

        let mut fragments = self.session.apply_parsed(&parsed);
        self.session.append_note(raw);

        match parsed.action {
            Action::None => {}
            Action::TakePhoto => {
                if let Some(fragment) = self.take_photo().await {
                    fragments.push(fragment);
                }
            }
            Action::SaveInspection => {
                if let Some(fragment) = self.save().await {
                    fragments.push(fragment);
                }
            }
        }

        if !fragments.is_empty() {
            let sentence = fragments.join(". ");
            info!("Accepted: {}", sentence);
            self.confirm(&sentence, self.config.feedback_ttl());
        }

        self.publish();

        if parsed.is_empty() {
            debug!("Unrecognized: {:?}", normalized);
            Interpretation::Unrecognized
        } else {
            Interpretation::Command(correction)
        }
    }

    async fn execute_control(&mut self, command: ControlCommand) {
        let ttl = self.config.control_ttl();

        match command {
            ControlCommand::CameraOn => {
                if self.session.capture().camera_active {
                    self.confirm("Kamera er allerede på", ttl);
                } else if self.activate_camera().await {
                    self.confirm("Kamera på", ttl);
                }
            }
            ControlCommand::CameraOff => {
                self.deactivate_camera().await;
                self.confirm("Kamera av", ttl);
            }
            ControlCommand::NotesOn => {
                self.session.set_notes_mode(true);
                self.confirm("Notatmodus på", ttl);
            }
            ControlCommand::NotesOff => {
                self.session.set_notes_mode(false);
                self.confirm("Notatmodus av", ttl);
            }
            ControlCommand::Undo => match self.session.undo_last() {
                Some(entry) => {
                    let message = format!("Angret: {}", entry.label());
                    self.confirm(&message, ttl);
                }
                None => self.confirm("Ingenting å angre", ttl),
            },
        }
    }

    /// Capture now, or mark a capture pending and wait for the stream.
    async fn take_photo(&mut self) -> Option<String> {
        let active = self.session.capture().camera_active;
        if self.session.capture().pending_capture {
            debug!("Capture already pending");
            return Some("Venter på kamera".to_string());
        }

        if active && self.camera.is_ready() {
            return self.capture_now().await;
        }

        if !active && !self.activate_camera().await {
            return None;
        }

        self.session.capture_mut().pending_capture = true;
        self.spawn_readiness_poll(self.generation);
        Some("Venter på kamera".to_string())
    }

    async fn capture_now(&mut self) -> Option<String> {
        match self.camera.capture().await {
            Ok(image) => {
                let count = self.session.commit_photo(image);
                info!("Photo {} captured", count);
                Some(format!("Bilde {} tatt", count))
            }
            Err(e) => {
                warn!("Capture failed: {}", e);
                self.session.capture_mut().pending_capture = false;
                self.alert(&format!("Kunne ikke ta bilde: {}", e));
                None
            }
        }
    }

    /// Returns false (after raising a notice) when the camera refused to start
    async fn activate_camera(&mut self) -> bool {
        match self.camera.start().await {
            Ok(()) => {
                self.generation += 1;
                self.activation.send_replace(Some(self.generation));
                self.session.capture_mut().camera_active = true;
                info!("Camera activated (generation {})", self.generation);
                true
            }
            Err(e) => {
                error!("Camera activation failed: {}", e);
                let capture = self.session.capture_mut();
                capture.camera_active = false;
                capture.pending_capture = false;
                self.alert(&format!("Kamera kunne ikke startes: {}", e));
                false
            }
        }
    }

    /// Stop the camera and cancel any readiness poll in flight
    async fn deactivate_camera(&mut self) {
        self.activation.send_replace(None);

        let capture = self.session.capture_mut();
        let was_active = capture.camera_active;
        capture.camera_active = false;
        capture.pending_capture = false;

        if was_active {
            self.camera.stop().await;
            info!("Camera deactivated");
        }
    }

    fn spawn_readiness_poll(&self, generation: u64) {
        let camera = Arc::clone(&self.camera);
        let activation = self.activation.subscribe();
        let events = self.events.clone();
        let interval = self.config.camera_poll_interval();
        let max_attempts = self.config.camera_max_poll_attempts;

        tokio::spawn(async move {
            let event = match wait_until_ready(camera, activation, generation, interval, max_attempts)
                .await
            {
                Readiness::Ready => EngineEvent::CameraReady { generation },
                Readiness::TimedOut => EngineEvent::CameraTimedOut { generation },
                Readiness::Cancelled => return,
            };
            // Receiver gone means the engine was dropped
            let _ = events.send(event);
        });
    }

    fn is_current(&self, generation: u64) -> bool {
        *self.activation.borrow() == Some(generation) && self.session.capture().pending_capture
    }

    async fn on_camera_ready(&mut self, generation: u64) {
        if !self.is_current(generation) {
            debug!("Stale readiness signal for generation {}", generation);
            return;
        }

        if let Some(message) = self.capture_now().await {
            self.confirm(&message, self.config.feedback_ttl());
        }
        self.publish();
    }

    async fn on_camera_timeout(&mut self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }

        warn!(
            "Camera not ready after {} attempts, abandoning capture",
            self.config.camera_max_poll_attempts
        );
        self.deactivate_camera().await;
        self.alert("Kameraet ble ikke klart, prøv igjen");
        self.publish();
    }

    /// Submit the draft once; later saves only confirm it is already stored
    async fn save(&mut self) -> Option<String> {
        if self.session.is_submitted() {
            info!("Inspection already saved, not submitting again");
            return Some("Allerede lagret".to_string());
        }

        let draft = self.session.draft().clone();
        let photos = self.session.capture().images.clone();

        match self.persistence.submit(&draft, &photos).await {
            Ok(()) => {
                self.session.mark_submitted();
                info!("Inspection saved ({} photos)", photos.len());
                Some("Inspeksjon lagret".to_string())
            }
            Err(e) => {
                error!("Failed to save inspection: {}", e);
                self.alert(&format!("Lagring feilet: {}", e));
                None
            }
        }
    }

    /// Navigation away: camera off, history dropped, later events ignored
    pub async fn teardown(&mut self) {
        if self.closed {
            return;
        }

        self.deactivate_camera().await;
        self.session.clear_history();
        self.closed = true;
        info!("Inspection session closed");
    }

    fn confirm(&mut self, message: &str, ttl: Duration) {
        self.ui.transient(message, ttl);
        self.feedback.announce(message);
    }

    fn alert(&mut self, message: &str) {
        self.ui.blocking_notice(message);
        self.feedback.announce(message);
    }

    fn publish(&self) {
        self.ui.state_changed(&self.session.snapshot());
    }
}
