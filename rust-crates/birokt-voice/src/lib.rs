//! Voice command interpretation for hands-free hive inspections
//!
//! Turns finalized speech transcripts into structured updates of an
//! inspection draft, plus side-effecting actions (photo capture, save).
//!
//! # Pipeline
//!
//! 1. [`normalizer`] - trim and lowercase
//! 2. [`classifier`] - camera on/off, notes on/off, undo
//! 3. [`parser`] - field deltas and an optional action
//! 4. [`fuzzy`] - whole-utterance correction against known phrases and aliases
//! 5. [`session`] - apply deltas, push undo entries, log notes
//! 6. [`engine`] - dispatch actions, camera lifecycle, feedback
//! 7. [`controller`] - one utterance at a time, in arrival order
//!
//! Platform services (camera, speech recognition and synthesis, UI,
//! persistence) are traits in [`ports`], [`camera`] and [`feedback`].
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use birokt_voice::{
//!     AliasStore, EngineConfig, EnginePorts, InspectionDraft, InspectionEngine,
//!     ListeningController, TomlAliasStore,
//! };
//!
//! # async fn run(ports: EnginePorts, recognizer: Arc<dyn birokt_voice::SpeechRecognizer>)
//! #     -> birokt_voice::Result<()> {
//! let aliases = TomlAliasStore::new("aliases.toml").load_aliases()?;
//! let (engine, events) =
//!     InspectionEngine::new(EngineConfig::default(), &aliases, InspectionDraft::new(), ports);
//!
//! let (handle, task) = ListeningController::spawn(engine, events, recognizer);
//! handle.start_listening().await?;
//! handle.on_utterance("Dronning sett, honning mye");
//!
//! handle.shutdown().await?;
//! let _ = task.await;
//! # Ok(())
//! # }
//! ```

pub mod alias;
pub mod camera;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod draft;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod fuzzy;
pub mod normalizer;
pub mod parser;
pub mod ports;
pub mod session;
pub mod undo;

pub use alias::{Alias, AliasStore, AliasTable, TomlAliasStore};
pub use camera::{Camera, ImageBlob};
pub use classifier::ControlCommand;
pub use config::EngineConfig;
pub use controller::{
    ControllerHandle, ListeningController, ListeningState, StatusReport, UtteranceSender,
};
pub use draft::{
    BroodCondition, DraftField, FieldValue, HiveStatus, HoneyStores, InspectionDraft, Temperament,
};
pub use engine::{EngineEvent, EnginePorts, InspectionEngine, Interpretation};
pub use error::{Result, VoiceError};
pub use feedback::SpeechSynthesizer;
pub use fuzzy::{CorrectionResult, SimilarityMetric};
pub use parser::{Action, ParsedCommand};
pub use ports::{Persistence, SpeechRecognizer, UiSink};
pub use session::SessionSnapshot;
