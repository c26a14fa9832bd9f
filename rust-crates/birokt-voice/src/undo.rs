//! Undo history
//!
//! Strict LIFO of reversible operations. One entry per touched field, one
//! entry per committed photo; an undo command consumes exactly one entry.

use serde::{Deserialize, Serialize};

use crate::draft::FieldValue;

/// One reversible operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "previous", rename_all = "snake_case")]
pub enum UndoEntry {
    /// Field and the value it held before the mutation
    Field(FieldValue),
    /// Remove the last captured image and decrement the photo count
    Photo,
}

impl UndoEntry {
    /// Spoken label of what the entry reverts
    pub fn label(&self) -> &'static str {
        match self {
            UndoEntry::Field(value) => value.field().label(),
            UndoEntry::Photo => "bilde",
        }
    }
}

/// Unbounded for the session lifetime, cleared on teardown
#[derive(Debug, Default)]
pub struct UndoManager {
    entries: Vec<UndoEntry>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    /// Most recent entry, or None on an empty stack
    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut undo = UndoManager::new();
        undo.push(UndoEntry::Field(FieldValue::QueenSeen(false)));
        undo.push(UndoEntry::Photo);

        assert_eq!(undo.len(), 2);
        assert_eq!(undo.pop(), Some(UndoEntry::Photo));
        assert_eq!(undo.pop(), Some(UndoEntry::Field(FieldValue::QueenSeen(false))));
        assert_eq!(undo.pop(), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(UndoEntry::Photo.label(), "bilde");
        assert_eq!(UndoEntry::Field(FieldValue::HoneyStores(None)).label(), "Honning");
    }

    #[test]
    fn test_clear() {
        let mut undo = UndoManager::new();
        undo.push(UndoEntry::Photo);
        undo.clear();
        assert!(undo.is_empty());
        assert!(undo.peek().is_none());
    }
}
