//! Fuzzy command correction
//!
//! Every clause the field parser got nothing out of is scored against each
//! canonical phrase (built-in vocabulary plus alias phrases). The best
//! candidate fills the fields still missing from the parse if it clears the
//! acceptance threshold and no other candidate with a different meaning
//! ties it. Fields the parser did recognize are never replaced.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alias::AliasTable;
use crate::normalizer::clauses;
use crate::parser::{parse, ParsedCommand, CANONICAL_PHRASES};

/// String similarity used for scoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// 1 - edit distance / longer length
    #[default]
    Levenshtein,
    JaroWinkler,
}

impl SimilarityMetric {
    /// Similarity in [0, 1]; 1 means identical
    pub fn score(&self, a: &str, b: &str) -> f64 {
        match self {
            SimilarityMetric::Levenshtein => levenshtein_similarity(a, b),
            SimilarityMetric::JaroWinkler => jaro_winkler(a, b),
        }
    }
}

/// Outcome of a correction attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    pub parsed: ParsedCommand,
    pub corrected: bool,
    pub matched: Option<String>,
    pub similarity: Option<f64>,
}

impl CorrectionResult {
    fn unchanged(parsed: ParsedCommand) -> Self {
        Self {
            parsed,
            corrected: false,
            matched: None,
            similarity: None,
        }
    }
}

/// A phrase the utterance can be corrected towards
#[derive(Debug, Clone)]
struct Candidate {
    /// Phrase scored against the utterance
    phrase: String,
    /// Canonical phrase reported as `matched`
    canonical: String,
    parsed: ParsedCommand,
}

pub struct FuzzyCorrector {
    candidates: Vec<Candidate>,
    threshold: f64,
    metric: SimilarityMetric,
}

impl FuzzyCorrector {
    /// Build the candidate list once per session
    pub fn new(aliases: &AliasTable, threshold: f64, metric: SimilarityMetric) -> Self {
        let mut candidates: Vec<Candidate> = CANONICAL_PHRASES
            .iter()
            .map(|phrase| Candidate {
                phrase: phrase.to_string(),
                canonical: phrase.to_string(),
                parsed: parse(phrase),
            })
            .collect();

        for (phrase, canonical) in aliases.iter() {
            candidates.push(Candidate {
                phrase: phrase.to_string(),
                canonical: canonical.to_string(),
                parsed: parse(canonical),
            });
        }

        debug!(
            "Fuzzy corrector ready: {} candidates, threshold {}, {:?}",
            candidates.len(),
            threshold,
            metric
        );

        Self {
            candidates,
            threshold,
            metric,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Recover clauses the field parser did not understand.
    ///
    /// `parsed` is the (possibly partial) parse of the whole utterance.
    /// `matched`/`similarity` describe the first clause that was corrected.
    pub fn correct(&self, normalized: &str, parsed: ParsedCommand) -> CorrectionResult {
        let mut result = CorrectionResult::unchanged(parsed);

        for tokens in clauses(normalized) {
            let clause = tokens.join(" ");
            if !parse(&clause).is_empty() {
                continue;
            }

            let Some((winner, score)) = self.best_match(&clause) else {
                continue;
            };

            if !result.parsed.merge_missing(&winner.parsed) {
                debug!("Correction '{}' → '{}' adds nothing new", clause, winner.canonical);
                continue;
            }

            debug!(
                "Clause '{}' corrected to '{}' at {:.3}",
                clause, winner.canonical, score
            );
            if !result.corrected {
                result.corrected = true;
                result.matched = Some(winner.canonical.clone());
                result.similarity = Some(score);
            }
        }

        result
    }

    /// Best candidate for one clause, if it clears the threshold unambiguously
    fn best_match(&self, clause: &str) -> Option<(&Candidate, f64)> {
        let mut best: Option<(&Candidate, f64)> = None;
        for candidate in &self.candidates {
            let score = self.metric.score(clause, &candidate.phrase);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        let (winner, score) = best?;

        if score < self.threshold {
            debug!(
                "No correction for '{}': best '{}' at {:.3} below {:.3}",
                clause, winner.phrase, score, self.threshold
            );
            return None;
        }

        // Equal-score candidates meaning the same thing are not ambiguous
        let tied = self.candidates.iter().any(|c| {
            c.parsed != winner.parsed && self.metric.score(clause, &c.phrase) == score
        });
        if tied {
            debug!("Ambiguous correction for '{}' at {:.3}, skipping", clause, score);
            return None;
        }

        Some((winner, score))
    }
}

/// Levenshtein edit distance over chars
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let n = a_chars.len();
    let m = b_chars.len();

    if n == 0 {
        return m;
    }
    if m == 0 {
        return n;
    }

    // Single-row optimization
    let mut prev_row: Vec<usize> = (0..=m).collect();
    let mut curr_row: Vec<usize> = vec![0; m + 1];

    for i in 1..=n {
        curr_row[0] = i;

        for j in 1..=m {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr_row[j] = (prev_row[j] + 1)
                .min(curr_row[j - 1] + 1)
                .min(prev_row[j - 1] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[m]
}

/// Levenshtein ratio in [0, 1]
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    // (longest - d) / longest keeps exact ratios like 7/10 == 0.7
    (longest - levenshtein(a, b)) as f64 / longest as f64
}

/// Jaro-Winkler similarity (prefix scale 0.1, prefix up to 4 chars)
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() && b_chars.is_empty() {
        return 1.0;
    }
    if a_chars.is_empty() || b_chars.is_empty() {
        return 0.0;
    }

    let window = (a_chars.len().max(b_chars.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a_chars.len()];
    let mut b_matched = vec![false; b_chars.len()];
    let mut matches = 0usize;

    for (i, ca) in a_chars.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b_chars.len());
        for j in start..end {
            if !b_matched[j] && b_chars[j] == *ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let a_seq = a_chars.iter().zip(&a_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let b_seq = b_chars.iter().zip(&b_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let transpositions = a_seq.zip(b_seq).filter(|(x, y)| x != y).count() / 2;

    let m = matches as f64;
    let jaro = (m / a_chars.len() as f64
        + m / b_chars.len() as f64
        + (m - transpositions as f64) / m)
        / 3.0;

    let prefix = a_chars
        .iter()
        .zip(&b_chars)
        .take(4)
        .take_while(|(x, y)| x == y)
        .count();

    jaro + prefix as f64 * 0.1 * (1.0 - jaro)
}
