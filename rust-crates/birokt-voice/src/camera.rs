//! Camera capability port and readiness polling
//!
//! Activation is asynchronous: after `start()` the stream needs a moment
//! before a frame can be captured. The readiness future polls `is_ready()`
//! on an interval and watches the activation channel, so turning the camera
//! off (or re-activating it) cancels a poll that is still waiting.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::error::Result;

/// One captured still image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "image/jpeg")
    }
}

/// Platform camera
#[async_trait]
pub trait Camera: Send + Sync {
    /// Request the stream. Fails on permission or device errors.
    async fn start(&self) -> Result<()>;

    async fn stop(&self);

    async fn capture(&self) -> Result<ImageBlob>;

    /// Whether the stream can deliver a frame yet
    fn is_ready(&self) -> bool;
}

/// Current activation: `Some(generation)` while on, `None` while off.
///
/// Every activation gets a fresh generation so a poll started for an
/// earlier activation can tell it has been superseded.
pub type Activation = Option<u64>;

/// How a readiness poll ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Camera deactivated or re-activated while waiting
    Cancelled,
    /// Attempts exhausted
    TimedOut,
}

/// Wait until the camera reports ready for `generation`.
pub async fn wait_until_ready(
    camera: Arc<dyn Camera>,
    mut activation: watch::Receiver<Activation>,
    generation: u64,
    interval: Duration,
    max_attempts: u32,
) -> Readiness {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attempts = 0u32;

    loop {
        tokio::select! {
            biased;

            changed = activation.changed() => {
                if changed.is_err() {
                    debug!("Activation channel closed, abandoning poll {}", generation);
                    return Readiness::Cancelled;
                }
            }
            _ = ticker.tick() => {
                attempts += 1;
            }
        }

        if *activation.borrow() != Some(generation) {
            debug!("Camera activation {} superseded, poll cancelled", generation);
            return Readiness::Cancelled;
        }

        if camera.is_ready() {
            debug!("Camera ready after {} polls", attempts);
            return Readiness::Ready;
        }

        if attempts >= max_attempts {
            return Readiness::TimedOut;
        }
    }
}
