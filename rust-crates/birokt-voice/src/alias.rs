//! User-defined phrase aliases
//!
//! Maps phrases a particular beekeeper tends to say (or the recognizer tends
//! to hear) onto canonical command phrases: "kongen sett" → "dronning sett".
//! Loaded once per session and read-only during interpretation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::normalizer::normalize;
use crate::parser::parse;

/// One alias entry as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub phrase: String,
    pub canonical: String,
}

/// TOML file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AliasFile {
    #[serde(default)]
    aliases: Vec<Alias>,
}

/// Phrase → canonical phrase, keyed by normalized phrase.
///
/// Ordered so that iteration (and therefore fuzzy scoring) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (phrase, canonical) pairs.
    ///
    /// Aliases whose canonical phrase does not parse into anything are
    /// dropped; they could never produce a correction.
    pub fn from_pairs<I, P, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for (phrase, canonical) in pairs {
            let phrase = normalize(phrase.as_ref());
            let canonical = normalize(canonical.as_ref());
            if phrase.is_empty() {
                continue;
            }
            if parse(&canonical).is_empty() {
                warn!(
                    "Ignoring alias '{}': canonical phrase '{}' is not a known command",
                    phrase, canonical
                );
                continue;
            }
            entries.insert(phrase, canonical);
        }
        Self { entries }
    }

    /// Parse the alias file format
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: AliasFile = toml::from_str(content)?;
        Ok(Self::from_pairs(
            file.aliases.into_iter().map(|a| (a.phrase, a.canonical)),
        ))
    }

    /// Canonical phrase for an exact (normalized) alias phrase
    pub fn canonical(&self, phrase: &str) -> Option<&str> {
        self.entries.get(phrase).map(String::as_str)
    }

    /// (phrase, canonical) in phrase order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Source of the session's alias table
pub trait AliasStore: Send + Sync {
    fn load_aliases(&self) -> Result<AliasTable>;
}

/// Alias table kept in a TOML file (`aliases.toml`)
pub struct TomlAliasStore {
    path: PathBuf,
}

impl TomlAliasStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AliasStore for TomlAliasStore {
    fn load_aliases(&self) -> Result<AliasTable> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No alias file found at {:?}, starting with built-ins only", self.path);
                return Ok(AliasTable::new());
            }
            Err(e) => return Err(e.into()),
        };

        let table = AliasTable::from_toml_str(&content)?;
        info!("Loaded {} aliases from {:?}", table.len(), self.path);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_pairs_normalizes() {
        let table = AliasTable::from_pairs([("  Kongen Sett ", "Dronning sett")]);
        assert_eq!(table.canonical("kongen sett"), Some("dronning sett"));
    }

    #[test]
    fn test_unparseable_canonical_dropped() {
        let table = AliasTable::from_pairs([("noe rart", "helt ukjent"), ("kongen sett", "dronning sett")]);
        assert_eq!(table.len(), 1);
        assert!(table.canonical("noe rart").is_none());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
[[aliases]]
phrase = "kongen sett"
canonical = "dronning sett"

[[aliases]]
phrase = "fullt av honning"
canonical = "honning mye"
"#;
        let table = AliasTable::from_toml_str(toml).unwrap();
        assert_eq!(table.len(), 2);
        let phrases: Vec<_> = table.iter().map(|(p, _)| p).collect();
        assert_eq!(phrases, vec!["fullt av honning", "kongen sett"]);
    }

    #[test]
    fn test_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = TomlAliasStore::new(dir.path().join("aliases.toml"));
        let table = store.load_aliases().unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_store_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aliases.toml");
        std::fs::write(
            &path,
            "[[aliases]]\nphrase = \"kongen sett\"\ncanonical = \"dronning sett\"\n",
        )
        .unwrap();

        let table = TomlAliasStore::new(&path).load_aliases().unwrap();
        assert_eq!(table.canonical("kongen sett"), Some("dronning sett"));
    }

    #[test]
    fn test_store_invalid_toml_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aliases.toml");
        std::fs::write(&path, "[[aliases]\nphrase =").unwrap();

        assert!(TomlAliasStore::new(&path).load_aliases().is_err());
    }
}
