//! UI event broadcaster for birokt
//!
//! Unix socket server that pushes inspection state to connected UI clients
//! as newline-delimited JSON.
//!
//! # Event Types
//!
//! - `session_start` / `session_end` - inspection opened / closed
//! - `state_change` - listening state
//! - `feedback` - transient confirmation (`message`, `ttl_ms`)
//! - `correction` - fuzzy correction banner (`matched`, `similarity`)
//! - `notice` - blocking notice
//! - `draft`, `photos`, `undo` - current draft, photo count, undo availability
//!
//! Clients connecting mid-inspection receive a catch-up: listening state,
//! session, the session's feedback log, and the latest draft/photos/undo.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use birokt_broadcaster::UiBroadcaster;
//! use birokt_voice::ListeningState;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broadcaster = UiBroadcaster::new("/tmp/birokt_ui.sock").await?;
//!     broadcaster.start().await?;
//!
//!     broadcaster.start_session(1).await;
//!     broadcaster.broadcast_state_change(ListeningState::Listening).await;
//!     broadcaster.add_feedback("Dronning sett", Duration::from_secs(4)).await;
//!     broadcaster.end_session(1).await;
//!
//!     broadcaster.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod broadcaster;
pub mod client;
pub mod error;
pub mod events;

pub use broadcaster::UiBroadcaster;
pub use error::{BroadcasterError, Result};
pub use events::{FeedbackEntry, UiEvent};
