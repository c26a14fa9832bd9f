//! Inspection session state
//!
//! Owns everything that voice commands mutate: the draft, the undo stack,
//! the capture state and the notes flag. Every mutation pushes its undo
//! entry before the value changes.

use serde::Serialize;
use tracing::debug;

use crate::camera::ImageBlob;
use crate::draft::InspectionDraft;
use crate::parser::ParsedCommand;
use crate::undo::{UndoEntry, UndoManager};

/// Camera side-channel state
#[derive(Debug, Clone, Default)]
pub struct CaptureState {
    pub camera_active: bool,
    pub pending_capture: bool,
    pub photo_count: u32,
    pub images: Vec<ImageBlob>,
}

/// Serializable view of the session for UI clients and status queries
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub draft: InspectionDraft,
    pub camera_active: bool,
    pub pending_capture: bool,
    pub photo_count: u32,
    pub notes_mode: bool,
    pub undo_available: bool,
    pub undo_depth: usize,
    pub submitted: bool,
}

pub struct InspectionSession {
    draft: InspectionDraft,
    undo: UndoManager,
    capture: CaptureState,
    notes_mode: bool,
    trace_prefix: String,
    submitted: bool,
}

impl InspectionSession {
    pub fn new(draft: InspectionDraft, trace_prefix: impl Into<String>) -> Self {
        Self {
            draft,
            undo: UndoManager::new(),
            capture: CaptureState::default(),
            notes_mode: false,
            trace_prefix: trace_prefix.into(),
            submitted: false,
        }
    }

    pub fn draft(&self) -> &InspectionDraft {
        &self.draft
    }

    pub fn capture(&self) -> &CaptureState {
        &self.capture
    }

    pub fn capture_mut(&mut self) -> &mut CaptureState {
        &mut self.capture
    }

    pub fn notes_mode(&self) -> bool {
        self.notes_mode
    }

    pub fn set_notes_mode(&mut self, on: bool) {
        self.notes_mode = on;
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn undo_available(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Commit every populated field of a parse, in declaration order.
    ///
    /// Returns one confirmation fragment per touched field.
    pub fn apply_parsed(&mut self, parsed: &ParsedCommand) -> Vec<String> {
        let mut fragments = Vec::new();

        for delta in parsed.deltas() {
            let field = delta.field();
            let previous = self.draft.get(field);
            self.undo.push(UndoEntry::Field(previous));

            fragments.push(delta.describe());
            debug!("Set {:?} = {:?}", field, delta);
            self.draft.set(delta);
        }

        fragments
    }

    /// Pop one entry and restore it. None when there was nothing to undo.
    pub fn undo_last(&mut self) -> Option<UndoEntry> {
        let entry = self.undo.pop()?;

        match &entry {
            UndoEntry::Field(previous) => {
                self.draft.set(previous.clone());
            }
            UndoEntry::Photo => {
                self.capture.images.pop();
                self.capture.photo_count = self.capture.photo_count.saturating_sub(1);
            }
        }

        debug!("Undid {:?}, {} entries left", entry, self.undo.len());
        Some(entry)
    }

    /// Store a captured image. Returns the new photo count.
    pub fn commit_photo(&mut self, image: ImageBlob) -> u32 {
        self.undo.push(UndoEntry::Photo);
        self.capture.images.push(image);
        self.capture.photo_count += 1;
        self.capture.pending_capture = false;
        self.capture.photo_count
    }

    /// Append the raw utterance to the notes.
    ///
    /// Dictation mode appends verbatim; otherwise the line carries the
    /// trace prefix so raw voice history stays inspectable.
    pub fn append_note(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }

        let line = if self.notes_mode {
            raw.to_string()
        } else {
            format!("{}{}", self.trace_prefix, raw)
        };

        if !self.draft.notes.is_empty() {
            self.draft.notes.push('\n');
        }
        self.draft.notes.push_str(&line);
    }

    /// Overwrite weather/temperature from an external lookup. Not undoable.
    pub fn prefill(&mut self, temperature: Option<f64>, weather: Option<String>) {
        if let Some(t) = temperature {
            self.draft.temperature = Some(t);
        }
        if let Some(w) = weather {
            self.draft.weather = w;
        }
    }

    /// The draft went to persistence; it is never submitted again
    pub fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Drop history on navigation away
    pub fn clear_history(&mut self) {
        self.undo.clear();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            draft: self.draft.clone(),
            camera_active: self.capture.camera_active,
            pending_capture: self.capture.pending_capture,
            photo_count: self.capture.photo_count,
            notes_mode: self.notes_mode,
            undo_available: self.undo_available(),
            undo_depth: self.undo.len(),
            submitted: self.submitted,
        }
    }
}
