//! In-progress inspection record
//!
//! The draft is created when an inspection opens, mutated by voice deltas,
//! submitted once and then dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Honey stores observed in the hive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoneyStores {
    Lite,
    Middels,
    Mye,
}

/// Colony temperament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperament {
    Rolig,
    Urolig,
    Aggressiv,
}

/// Brood pattern quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroodCondition {
    Darlig,
    Normal,
    Bra,
}

/// Overall hive status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HiveStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "SVAK")]
    Svak,
    #[serde(rename = "DØD")]
    Dod,
    #[serde(rename = "SYKDOM")]
    Sykdom,
    #[serde(rename = "DRONNINGLØS")]
    Dronninglos,
}

impl fmt::Display for HoneyStores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoneyStores::Lite => write!(f, "lite"),
            HoneyStores::Middels => write!(f, "middels"),
            HoneyStores::Mye => write!(f, "mye"),
        }
    }
}

impl fmt::Display for Temperament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperament::Rolig => write!(f, "rolig"),
            Temperament::Urolig => write!(f, "urolig"),
            Temperament::Aggressiv => write!(f, "aggressiv"),
        }
    }
}

impl fmt::Display for BroodCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroodCondition::Darlig => write!(f, "dårlig"),
            BroodCondition::Normal => write!(f, "normal"),
            BroodCondition::Bra => write!(f, "bra"),
        }
    }
}

impl fmt::Display for HiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HiveStatus::Ok => write!(f, "OK"),
            HiveStatus::Svak => write!(f, "SVAK"),
            HiveStatus::Dod => write!(f, "DØD"),
            HiveStatus::Sykdom => write!(f, "SYKDOM"),
            HiveStatus::Dronninglos => write!(f, "DRONNINGLØS"),
        }
    }
}

/// Voice-addressable draft fields, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    QueenSeen,
    EggsSeen,
    HoneyStores,
    Temperament,
    BroodCondition,
    Status,
    Temperature,
    Weather,
}

impl DraftField {
    /// Spoken label used in confirmations
    pub fn label(&self) -> &'static str {
        match self {
            DraftField::QueenSeen => "Dronning",
            DraftField::EggsSeen => "Egg",
            DraftField::HoneyStores => "Honning",
            DraftField::Temperament => "Gemytt",
            DraftField::BroodCondition => "Yngel",
            DraftField::Status => "Status",
            DraftField::Temperature => "Temperatur",
            DraftField::Weather => "Vær",
        }
    }
}

/// A value for one draft field.
///
/// Used both as a delta (new value) and as the saved previous value of an
/// undo entry, so the variant always names the field it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    QueenSeen(bool),
    EggsSeen(bool),
    HoneyStores(Option<HoneyStores>),
    Temperament(Option<Temperament>),
    BroodCondition(Option<BroodCondition>),
    Status(Option<HiveStatus>),
    Temperature(Option<f64>),
    Weather(String),
}

impl FieldValue {
    pub fn field(&self) -> DraftField {
        match self {
            FieldValue::QueenSeen(_) => DraftField::QueenSeen,
            FieldValue::EggsSeen(_) => DraftField::EggsSeen,
            FieldValue::HoneyStores(_) => DraftField::HoneyStores,
            FieldValue::Temperament(_) => DraftField::Temperament,
            FieldValue::BroodCondition(_) => DraftField::BroodCondition,
            FieldValue::Status(_) => DraftField::Status,
            FieldValue::Temperature(_) => DraftField::Temperature,
            FieldValue::Weather(_) => DraftField::Weather,
        }
    }

    /// Human-readable confirmation fragment, e.g. "Honning: mye"
    pub fn describe(&self) -> String {
        fn or_blank<T: fmt::Display>(value: &Option<T>) -> String {
            value.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "ikke satt".to_string())
        }

        match self {
            FieldValue::QueenSeen(true) => "Dronning sett".to_string(),
            FieldValue::QueenSeen(false) => "Ingen dronning".to_string(),
            FieldValue::EggsSeen(true) => "Egg sett".to_string(),
            FieldValue::EggsSeen(false) => "Ingen egg".to_string(),
            FieldValue::HoneyStores(v) => format!("Honning: {}", or_blank(v)),
            FieldValue::Temperament(v) => format!("Gemytt: {}", or_blank(v)),
            FieldValue::BroodCondition(v) => format!("Yngel: {}", or_blank(v)),
            FieldValue::Status(v) => format!("Status: {}", or_blank(v)),
            FieldValue::Temperature(Some(t)) => {
                format!("Temperatur: {} grader", t.to_string().replace('.', ","))
            }
            FieldValue::Temperature(None) => "Temperatur: ikke satt".to_string(),
            FieldValue::Weather(w) if w.is_empty() => "Vær: ikke satt".to_string(),
            FieldValue::Weather(w) => format!("Vær: {}", w),
        }
    }
}

/// The in-memory, not-yet-persisted inspection record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionDraft {
    pub queen_seen: bool,
    pub eggs_seen: bool,
    pub honey_stores: Option<HoneyStores>,
    pub temperament: Option<Temperament>,
    pub brood_condition: Option<BroodCondition>,
    pub status: Option<HiveStatus>,
    pub temperature: Option<f64>,
    pub weather: String,
    pub notes: String,
}

impl InspectionDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a field
    pub fn get(&self, field: DraftField) -> FieldValue {
        match field {
            DraftField::QueenSeen => FieldValue::QueenSeen(self.queen_seen),
            DraftField::EggsSeen => FieldValue::EggsSeen(self.eggs_seen),
            DraftField::HoneyStores => FieldValue::HoneyStores(self.honey_stores),
            DraftField::Temperament => FieldValue::Temperament(self.temperament),
            DraftField::BroodCondition => FieldValue::BroodCondition(self.brood_condition),
            DraftField::Status => FieldValue::Status(self.status),
            DraftField::Temperature => FieldValue::Temperature(self.temperature),
            DraftField::Weather => FieldValue::Weather(self.weather.clone()),
        }
    }

    /// Overwrite the field named by `value`
    pub fn set(&mut self, value: FieldValue) {
        match value {
            FieldValue::QueenSeen(v) => self.queen_seen = v,
            FieldValue::EggsSeen(v) => self.eggs_seen = v,
            FieldValue::HoneyStores(v) => self.honey_stores = v,
            FieldValue::Temperament(v) => self.temperament = v,
            FieldValue::BroodCondition(v) => self.brood_condition = v,
            FieldValue::Status(v) => self.status = v,
            FieldValue::Temperature(v) => self.temperature = v,
            FieldValue::Weather(v) => self.weather = v,
        }
    }
}
