//! birokt daemon
//!
//! Hosts one inspection session: transcripts come in from a recognizer
//! command or over the IPC socket, UI clients follow along on the UI
//! socket, and saved inspections land as JSON plus photos on disk.

pub mod camera;
pub mod config;
pub mod daemon;
pub mod ipc;
pub mod persistence;
pub mod recognizer;
pub mod speech;
pub mod ui;

pub use config::DaemonConfig;
pub use daemon::Daemon;
pub use ipc::{handle_connection, IpcCommand, IpcServer};
