//! Capability ports the engine is wired to
//!
//! The interpretation core never talks to a platform service directly; the
//! daemon (or a test) injects implementations of these traits.

use std::time::Duration;

use async_trait::async_trait;

use crate::camera::ImageBlob;
use crate::controller::UtteranceSender;
use crate::draft::InspectionDraft;
use crate::error::Result;
use crate::session::SessionSnapshot;

/// UI outputs
pub trait UiSink: Send + Sync {
    /// Short-lived confirmation message
    fn transient(&self, message: &str, ttl: Duration);

    /// Correction banner
    fn correction(&self, matched: &str, similarity: f64);

    /// Message the operator has to dismiss
    fn blocking_notice(&self, message: &str);

    /// Draft, photo count and undo availability after a change
    fn state_changed(&self, snapshot: &SessionSnapshot);
}

/// Where a finished inspection goes
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn submit(&self, draft: &InspectionDraft, photos: &[ImageBlob]) -> Result<()>;
}

/// Platform speech recognition session
///
/// While started, every finalized recognition result is handed to
/// `utterances`.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn start(&self, utterances: UtteranceSender) -> Result<()>;

    async fn stop(&self);
}
