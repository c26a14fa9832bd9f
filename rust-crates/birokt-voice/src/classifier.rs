//! Control command classification
//!
//! Control commands (camera on/off, notes on/off, undo) are checked before
//! any field parsing, in fixed priority order. The first match wins and the
//! utterance is not parsed further.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCommand {
    CameraOn,
    CameraOff,
    NotesOn,
    NotesOff,
    Undo,
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::CameraOn => write!(f, "camera_on"),
            ControlCommand::CameraOff => write!(f, "camera_off"),
            ControlCommand::NotesOn => write!(f, "notes_on"),
            ControlCommand::NotesOff => write!(f, "notes_off"),
            ControlCommand::Undo => write!(f, "undo"),
        }
    }
}

static CAMERA_ON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(start|starte|aktiver|aktivere|slå på|skru på|åpne)\s+kamera(et)?\b|\bkamera(et)?\s+på\b",
    )
    .expect("camera-on pattern")
});

static CAMERA_OFF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(stopp|stoppe|deaktiver|deaktivere|slå av|skru av|lukk)\s+kamera(et)?\b|\bkamera(et)?\s+av\b",
    )
    .expect("camera-off pattern")
});

static NOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bnotat(er|et)?\b").expect("note pattern"));

static NOTE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bnotat(er|et)?\s+(slutt|ferdig|stopp|av)\b|\b(avslutt|stopp|slutt)\s+notat(er|et)?\b",
    )
    .expect("note-end pattern")
});

static UNDO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(angre(\s+siste)?|avbryt\s+siste|fjern\s+siste|slett\s+siste)\b")
        .expect("undo pattern")
});

/// Classify a normalized utterance as a control command
pub fn classify(normalized: &str) -> Option<ControlCommand> {
    if CAMERA_ON.is_match(normalized) {
        return Some(ControlCommand::CameraOn);
    }
    if CAMERA_OFF.is_match(normalized) {
        return Some(ControlCommand::CameraOff);
    }

    let note_end = NOTE_END.is_match(normalized);
    if NOTE.is_match(normalized) && !note_end {
        return Some(ControlCommand::NotesOn);
    }
    if note_end {
        return Some(ControlCommand::NotesOff);
    }

    if UNDO.is_match(normalized) {
        return Some(ControlCommand::Undo);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_commands() {
        assert_eq!(classify("start kamera"), Some(ControlCommand::CameraOn));
        assert_eq!(classify("aktiver kameraet"), Some(ControlCommand::CameraOn));
        assert_eq!(classify("kamera på"), Some(ControlCommand::CameraOn));
        assert_eq!(classify("stopp kamera"), Some(ControlCommand::CameraOff));
        assert_eq!(classify("slå av kameraet"), Some(ControlCommand::CameraOff));
    }

    #[test]
    fn test_notes_commands() {
        assert_eq!(classify("notat"), Some(ControlCommand::NotesOn));
        assert_eq!(classify("nytt notat"), Some(ControlCommand::NotesOn));
        assert_eq!(classify("notat slutt"), Some(ControlCommand::NotesOff));
        assert_eq!(classify("notat ferdig"), Some(ControlCommand::NotesOff));
        assert_eq!(classify("avslutt notat"), Some(ControlCommand::NotesOff));
    }

    #[test]
    fn test_undo_commands() {
        assert_eq!(classify("avbryt siste"), Some(ControlCommand::Undo));
        assert_eq!(classify("angre"), Some(ControlCommand::Undo));
        assert_eq!(classify("angre siste"), Some(ControlCommand::Undo));
    }

    #[test]
    fn test_field_utterances_are_not_control() {
        assert_eq!(classify("dronning sett, honning mye"), None);
        assert_eq!(classify("ta bilde"), None);
        assert_eq!(classify("avbryt"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_camera_priority_over_notes() {
        // Both patterns present: camera wins by priority
        assert_eq!(classify("start kamera notat"), Some(ControlCommand::CameraOn));
    }
}
