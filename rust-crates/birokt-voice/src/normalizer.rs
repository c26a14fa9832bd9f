//! Transcript normalization
//!
//! Recognizers deliver mixed case and stray whitespace ("Dronning sett. ").
//! Everything downstream works on the normalized form.

/// Lowercase and trim one utterance.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Split a normalized utterance into clauses of parser tokens.
///
/// `, . ; ! ?` end a clause, except a `,` or `.` between two digits, which
/// is kept as a decimal separator ("18,5"). `:` and quotes are plain word
/// boundaries so "honning: mye" stays one clause.
pub fn clauses(normalized: &str) -> Vec<Vec<String>> {
    let chars: Vec<char> = normalized.chars().collect();
    let mut cleaned = String::with_capacity(normalized.len());

    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            ',' | '.' => {
                let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
                let next_digit = chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());
                if prev_digit && next_digit {
                    cleaned.push(ch);
                } else {
                    cleaned.push('\n');
                }
            }
            ';' | '!' | '?' => cleaned.push('\n'),
            ':' | '"' | '(' | ')' => cleaned.push(' '),
            _ => cleaned.push(ch),
        }
    }

    cleaned
        .split('\n')
        .map(|clause| clause.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .filter(|tokens| !tokens.is_empty())
        .collect()
}

/// All tokens of an utterance, clause boundaries dropped.
pub fn tokenize(normalized: &str) -> Vec<String> {
    clauses(normalized).into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Dronning Sett "), "dronning sett");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("ØKT URO"), "økt uro");
    }

    #[test]
    fn test_clauses_split_on_sentence_punctuation() {
        assert_eq!(
            clauses("dronning sett, honning mye."),
            vec![vec!["dronning", "sett"], vec!["honning", "mye"]]
        );
        assert_eq!(clauses("honning: mye"), vec![vec!["honning", "mye"]]);
    }

    #[test]
    fn test_tokenize_keeps_decimal_comma() {
        assert_eq!(tokenize("18,5 grader"), vec!["18,5", "grader"]);
        assert_eq!(tokenize("12.0, sol"), vec!["12.0", "sol"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(clauses("").is_empty());
        assert!(tokenize(" , . ").is_empty());
    }
}
