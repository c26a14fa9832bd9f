//! UI sink that forwards engine output to the broadcaster
//!
//! The engine calls the sink synchronously; updates are queued and a single
//! task hands them to the broadcaster in the order they were produced.

use std::sync::Arc;
use std::time::Duration;

use birokt_broadcaster::UiBroadcaster;
use birokt_voice::{SessionSnapshot, UiSink};
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug)]
enum UiUpdate {
    Feedback(String, Duration),
    Correction(String, f64),
    Notice(String),
    Snapshot(Box<SessionSnapshot>),
}

pub struct BroadcastSink {
    tx: mpsc::UnboundedSender<UiUpdate>,
}

impl BroadcastSink {
    pub fn spawn(broadcaster: Arc<UiBroadcaster>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<UiUpdate>();

        tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                match update {
                    UiUpdate::Feedback(message, ttl) => broadcaster.add_feedback(&message, ttl).await,
                    UiUpdate::Correction(matched, similarity) => {
                        broadcaster.broadcast_correction(&matched, similarity).await
                    }
                    UiUpdate::Notice(message) => broadcaster.broadcast_notice(&message).await,
                    UiUpdate::Snapshot(snapshot) => broadcaster.broadcast_snapshot(&snapshot).await,
                }
            }
            debug!("UI forwarder stopped");
        });

        Self { tx }
    }

    fn send(&self, update: UiUpdate) {
        if self.tx.send(update).is_err() {
            debug!("UI forwarder gone, update dropped");
        }
    }
}

impl UiSink for BroadcastSink {
    fn transient(&self, message: &str, ttl: Duration) {
        self.send(UiUpdate::Feedback(message.to_string(), ttl));
    }

    fn correction(&self, matched: &str, similarity: f64) {
        self.send(UiUpdate::Correction(matched.to_string(), similarity));
    }

    fn blocking_notice(&self, message: &str) {
        warn!("⚠️ {}", message);
        self.send(UiUpdate::Notice(message.to_string()));
    }

    fn state_changed(&self, snapshot: &SessionSnapshot) {
        self.send(UiUpdate::Snapshot(Box::new(snapshot.clone())));
    }
}
