//! Field parser
//!
//! Extracts zero or more field deltas plus an optional action from one
//! normalized, non-control utterance. Fields are independent: a single
//! utterance may set any subset of them.
//!
//! Matching works per clause so that "mye honning, lite yngel" does not
//! attach "lite" to honey.

use serde::{Deserialize, Serialize};

use crate::draft::{BroodCondition, FieldValue, HiveStatus, HoneyStores, Temperament};
use crate::normalizer::clauses;

/// Side-effecting action requested by an utterance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    #[default]
    None,
    TakePhoto,
    SaveInspection,
}

/// Result of parsing one utterance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCommand {
    pub queen_seen: Option<bool>,
    pub eggs_seen: Option<bool>,
    pub honey_stores: Option<HoneyStores>,
    pub temperament: Option<Temperament>,
    pub brood_condition: Option<BroodCondition>,
    pub status: Option<HiveStatus>,
    pub temperature: Option<f64>,
    pub weather: Option<String>,
    pub action: Action,
}

impl ParsedCommand {
    /// Populated fields as deltas, in field declaration order
    pub fn deltas(&self) -> Vec<FieldValue> {
        let mut deltas = Vec::new();
        if let Some(v) = self.queen_seen {
            deltas.push(FieldValue::QueenSeen(v));
        }
        if let Some(v) = self.eggs_seen {
            deltas.push(FieldValue::EggsSeen(v));
        }
        if let Some(v) = self.honey_stores {
            deltas.push(FieldValue::HoneyStores(Some(v)));
        }
        if let Some(v) = self.temperament {
            deltas.push(FieldValue::Temperament(Some(v)));
        }
        if let Some(v) = self.brood_condition {
            deltas.push(FieldValue::BroodCondition(Some(v)));
        }
        if let Some(v) = self.status {
            deltas.push(FieldValue::Status(Some(v)));
        }
        if let Some(v) = self.temperature {
            deltas.push(FieldValue::Temperature(Some(v)));
        }
        if let Some(v) = &self.weather {
            deltas.push(FieldValue::Weather(v.clone()));
        }
        deltas
    }

    pub fn field_count(&self) -> usize {
        self.deltas().len()
    }

    /// True when nothing at all was recognized
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0 && self.action == Action::None
    }

    /// Fill fields (and the action) still unset from `other`.
    ///
    /// Returns true when anything was taken over.
    pub fn merge_missing(&mut self, other: &ParsedCommand) -> bool {
        fn fill<T: Clone>(slot: &mut Option<T>, value: &Option<T>) -> bool {
            if slot.is_none() && value.is_some() {
                *slot = value.clone();
                true
            } else {
                false
            }
        }

        let mut changed = false;
        changed |= fill(&mut self.queen_seen, &other.queen_seen);
        changed |= fill(&mut self.eggs_seen, &other.eggs_seen);
        changed |= fill(&mut self.honey_stores, &other.honey_stores);
        changed |= fill(&mut self.temperament, &other.temperament);
        changed |= fill(&mut self.brood_condition, &other.brood_condition);
        changed |= fill(&mut self.status, &other.status);
        changed |= fill(&mut self.temperature, &other.temperature);
        changed |= fill(&mut self.weather, &other.weather);
        if self.action == Action::None && other.action != Action::None {
            self.action = other.action;
            changed = true;
        }
        changed
    }
}

/// Enum values that must appear near an anchor word ("honning mye")
struct AnchoredTable<T: 'static> {
    anchors: &'static [&'static str],
    values: &'static [(&'static str, T)],
}

// Negative phrases are checked first: "ingen dronning sett" means absent.
const QUEEN_ABSENT: &[&str] = &[
    "ingen dronning",
    "ikke sett dronning",
    "ikke sett dronningen",
    "dronning ikke sett",
    "dronningen ikke sett",
];
const QUEEN_PRESENT: &[&str] = &[
    "dronning sett",
    "dronningen sett",
    "så dronning",
    "så dronningen",
    "sett dronning",
    "sett dronningen",
];
const EGGS_ABSENT: &[&str] = &["ingen egg", "ikke sett egg", "egg ikke sett"];
const EGGS_PRESENT: &[&str] = &["egg sett", "egg funnet", "så egg", "sett egg"];

const HONEY: AnchoredTable<HoneyStores> = AnchoredTable {
    anchors: &["honning", "honningen", "fôr", "fôret"],
    values: &[
        ("lite", HoneyStores::Lite),
        ("litt", HoneyStores::Lite),
        ("middels", HoneyStores::Middels),
        ("middel", HoneyStores::Middels),
        ("mye", HoneyStores::Mye),
        ("masse", HoneyStores::Mye),
    ],
};

const BROOD: AnchoredTable<BroodCondition> = AnchoredTable {
    anchors: &["yngel", "yngelen", "yngelleie"],
    values: &[
        ("dårlig", BroodCondition::Darlig),
        ("darlig", BroodCondition::Darlig),
        ("normal", BroodCondition::Normal),
        ("normalt", BroodCondition::Normal),
        ("bra", BroodCondition::Bra),
        ("god", BroodCondition::Bra),
        ("godt", BroodCondition::Bra),
        ("fin", BroodCondition::Bra),
        ("fint", BroodCondition::Bra),
    ],
};

const STATUS: AnchoredTable<HiveStatus> = AnchoredTable {
    anchors: &["status"],
    values: &[
        ("ok", HiveStatus::Ok),
        ("okei", HiveStatus::Ok),
        ("greit", HiveStatus::Ok),
        ("svak", HiveStatus::Svak),
        ("død", HiveStatus::Dod),
        ("dod", HiveStatus::Dod),
        ("sykdom", HiveStatus::Sykdom),
        ("syk", HiveStatus::Sykdom),
        ("dronningløs", HiveStatus::Dronninglos),
    ],
};

// Temperament words are unambiguous on their own.
const TEMPERAMENT: &[(&str, Temperament)] = &[
    ("urolig", Temperament::Urolig),
    ("rolig", Temperament::Rolig),
    ("aggressiv", Temperament::Aggressiv),
    ("aggressive", Temperament::Aggressiv),
    ("sint", Temperament::Aggressiv),
    ("sinte", Temperament::Aggressiv),
];

const WEATHER: &[(&str, &str)] = &[
    ("solskinn", "Sol"),
    ("sol", "Sol"),
    ("sola", "Sol"),
    ("overskyet", "Overskyet"),
    ("skyet", "Overskyet"),
    ("regn", "Regn"),
    ("regner", "Regn"),
    ("yr", "Regn"),
    ("vind", "Vind"),
    ("vindfullt", "Vind"),
    ("blåser", "Vind"),
    ("tåke", "Tåke"),
];

const TAKE_PHOTO: &[&str] = &["ta bilde", "ta et bilde", "ta nytt bilde", "ta foto"];
const SAVE_INSPECTION: &[&str] = &["lagre inspeksjon", "lagre inspeksjonen"];

/// Offsets from an anchor searched for a value, nearest first
const ANCHOR_OFFSETS: [isize; 4] = [1, -1, 2, -2];

/// Plausible hive-side temperatures in degrees
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = -40.0..=60.0;

/// Known-good command phrases used as correction targets
pub const CANONICAL_PHRASES: &[&str] = &[
    "dronning sett",
    "ingen dronning",
    "egg sett",
    "ingen egg",
    "honning lite",
    "honning middels",
    "honning mye",
    "rolig",
    "urolig",
    "aggressiv",
    "yngel dårlig",
    "yngel normal",
    "yngel bra",
    "status ok",
    "status svak",
    "status død",
    "status sykdom",
    "status dronningløs",
    "ta bilde",
    "lagre inspeksjon",
];

/// Parse one normalized utterance
pub fn parse(normalized: &str) -> ParsedCommand {
    let clauses = clauses(normalized);
    let mut parsed = ParsedCommand::default();

    for tokens in &clauses {
        let joined = format!(" {} ", tokens.join(" "));

        if parsed.queen_seen.is_none() {
            parsed.queen_seen = match_flag(&joined, QUEEN_ABSENT, QUEEN_PRESENT);
        }
        if parsed.eggs_seen.is_none() {
            parsed.eggs_seen = match_flag(&joined, EGGS_ABSENT, EGGS_PRESENT);
        }
        if parsed.honey_stores.is_none() {
            parsed.honey_stores = match_anchored(tokens, &HONEY);
        }
        if parsed.temperament.is_none() {
            parsed.temperament = match_standalone(tokens, TEMPERAMENT);
        }
        if parsed.brood_condition.is_none() {
            parsed.brood_condition = match_anchored(tokens, &BROOD);
        }
        if parsed.status.is_none() {
            parsed.status = match_anchored(tokens, &STATUS);
        }
        if parsed.temperature.is_none() {
            parsed.temperature = match_temperature(tokens);
        }
        if parsed.weather.is_none() {
            parsed.weather = match_standalone(tokens, WEATHER).map(str::to_string);
        }
        if parsed.action == Action::None {
            parsed.action = match_action(&joined);
        }
    }

    parsed
}

fn contains_phrase(joined: &str, phrase: &str) -> bool {
    joined.contains(&format!(" {} ", phrase))
}

fn match_flag(joined: &str, absent: &[&str], present: &[&str]) -> Option<bool> {
    if absent.iter().any(|p| contains_phrase(joined, p)) {
        Some(false)
    } else if present.iter().any(|p| contains_phrase(joined, p)) {
        Some(true)
    } else {
        None
    }
}

fn match_anchored<T: Copy>(tokens: &[String], table: &AnchoredTable<T>) -> Option<T> {
    for (idx, token) in tokens.iter().enumerate() {
        if !table.anchors.contains(&token.as_str()) {
            continue;
        }

        for offset in ANCHOR_OFFSETS {
            let Some(pos) = idx.checked_add_signed(offset) else {
                continue;
            };
            let Some(candidate) = tokens.get(pos) else {
                continue;
            };
            if let Some((_, value)) = table.values.iter().find(|(kw, _)| *kw == candidate.as_str()) {
                return Some(*value);
            }
        }
    }
    None
}

/// First table entry (table order) whose keyword occurs as a token
fn match_standalone<T: Copy>(tokens: &[String], table: &[(&str, T)]) -> Option<T> {
    table
        .iter()
        .find(|(kw, _)| tokens.iter().any(|t| t.as_str() == *kw))
        .map(|(_, value)| *value)
}

fn match_temperature(tokens: &[String]) -> Option<f64> {
    for (idx, token) in tokens.iter().enumerate() {
        let cleaned = token.trim_end_matches(['°', 'c']).replace(',', ".");
        let Ok(mut value) = cleaned.parse::<f64>() else {
            continue;
        };
        if idx > 0 && tokens[idx - 1] == "minus" {
            value = -value;
        }
        if TEMPERATURE_RANGE.contains(&value) {
            return Some(value);
        }
    }
    None
}

fn match_action(joined: &str) -> Action {
    if TAKE_PHOTO.iter().any(|p| contains_phrase(joined, p)) {
        Action::TakePhoto
    } else if SAVE_INSPECTION.iter().any(|p| contains_phrase(joined, p)) {
        Action::SaveInspection
    } else {
        Action::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftField;

    #[test]
    fn test_queen_and_honey_in_one_utterance() {
        let parsed = parse("dronning sett, honning mye");
        assert_eq!(parsed.queen_seen, Some(true));
        assert_eq!(parsed.honey_stores, Some(HoneyStores::Mye));
        assert_eq!(parsed.field_count(), 2);
        assert_eq!(parsed.action, Action::None);
    }

    #[test]
    fn test_negative_phrase_wins() {
        assert_eq!(parse("ingen dronning sett").queen_seen, Some(false));
        assert_eq!(parse("ingen egg").eggs_seen, Some(false));
        assert_eq!(parse("egg funnet").eggs_seen, Some(true));
    }

    #[test]
    fn test_anchor_window_stays_in_clause() {
        let parsed = parse("mye honning, lite yngel, yngel bra");
        assert_eq!(parsed.honey_stores, Some(HoneyStores::Mye));
        assert_eq!(parsed.brood_condition, Some(BroodCondition::Bra));
    }

    #[test]
    fn test_value_without_anchor_is_ignored() {
        let parsed = parse("mye");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_temperament_urolig_not_rolig() {
        assert_eq!(parse("biene er urolige i dag urolig").temperament, Some(Temperament::Urolig));
        assert_eq!(parse("rolig").temperament, Some(Temperament::Rolig));
    }

    #[test]
    fn test_status() {
        assert_eq!(parse("status død").status, Some(HiveStatus::Dod));
        assert_eq!(parse("status er svak").status, Some(HiveStatus::Svak));
    }

    #[test]
    fn test_temperature() {
        assert_eq!(parse("18 grader").temperature, Some(18.0));
        assert_eq!(parse("temperatur 18,5").temperature, Some(18.5));
        assert_eq!(parse("minus 3 grader").temperature, Some(-3.0));
        assert_eq!(parse("kube 300").temperature, None);
    }

    #[test]
    fn test_weather_and_actions() {
        let parsed = parse("overskyet, ta bilde");
        assert_eq!(parsed.weather.as_deref(), Some("Overskyet"));
        assert_eq!(parsed.action, Action::TakePhoto);
        assert_eq!(parse("lagre inspeksjon").action, Action::SaveInspection);
    }

    #[test]
    fn test_action_only_is_not_empty() {
        let parsed = parse("ta bilde");
        assert_eq!(parsed.field_count(), 0);
        assert!(!parsed.is_empty());
    }

    #[test]
    fn test_every_canonical_phrase_parses() {
        for phrase in CANONICAL_PHRASES {
            assert!(!parse(phrase).is_empty(), "canonical phrase '{}' must parse", phrase);
        }
    }

    #[test]
    fn test_deltas_in_declaration_order() {
        let parsed = parse("status ok, 20 grader, dronning sett, rolig");
        let fields: Vec<_> = parsed.deltas().iter().map(|d| d.field()).collect();
        assert_eq!(
            fields,
            vec![
                DraftField::QueenSeen,
                DraftField::Temperament,
                DraftField::Status,
                DraftField::Temperature,
            ]
        );
    }

    #[test]
    fn test_merge_missing_keeps_existing_fields() {
        let mut parsed = parse("honning mye");
        assert!(parsed.merge_missing(&parse("dronning sett, honning lite")));
        assert_eq!(parsed.queen_seen, Some(true));
        assert_eq!(parsed.honey_stores, Some(HoneyStores::Mye));

        assert!(!parsed.merge_missing(&parse("honning middels")));
    }
}
