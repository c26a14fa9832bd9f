use birokt_voice::InspectionDraft;
use serde::{Deserialize, Serialize};

/// Event types broadcast to UI clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Inspection opened - clears the feedback log
    SessionStart { session_id: i64, timestamp: f64 },

    /// Inspection closed - log stays visible
    SessionEnd { session_id: i64, timestamp: f64 },

    /// Listening state changed ("idle" / "listening")
    StateChange { state: String, timestamp: f64 },

    /// Transient confirmation
    Feedback {
        message: String,
        ttl_ms: u64,
        timestamp: String, // HH:MM:SS
    },

    /// Utterance was fuzzy-corrected
    Correction { matched: String, similarity: f64 },

    /// Message the operator has to dismiss
    Notice { message: String },

    /// Current draft
    Draft { draft: InspectionDraft },

    Photos { count: u32 },

    Undo { available: bool, depth: usize },
}

/// Confirmation kept in the session log for late-joining clients
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackEntry {
    pub message: String,
    pub ttl_ms: u64,
    pub timestamp: String,
}

impl From<&FeedbackEntry> for UiEvent {
    fn from(entry: &FeedbackEntry) -> Self {
        UiEvent::Feedback {
            message: entry.message.clone(),
            ttl_ms: entry.ttl_ms,
            timestamp: entry.timestamp.clone(),
        }
    }
}

impl UiEvent {
    /// Convert event to JSON string with newline
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}
