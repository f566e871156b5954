//! Deterministic tag relevance scoring.
//!
//! Candidate tags come from a fixed [`TagVocabulary`]. Each tag that appears in
//! the text (exactly, or as a simple singular/plural variant) receives a score
//! that favours exact hits, longer tags, early position, and repetition. The
//! number of tags returned grows with the length of the text.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::coherence::is_word_char;

// ---------------------------------------------------------------------------
// Scoring weights
// ---------------------------------------------------------------------------

const EXACT_MATCH_POINTS: f64 = 3.0;
const VARIANT_MATCH_POINTS: f64 = 2.0;
const LENGTH_WEIGHT: f64 = 0.1;
const POSITION_HORIZON: usize = 5;
const FREQUENCY_WEIGHT: f64 = 0.5;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Ordered set of lowercase tags.
///
/// Loaded once at process start and immutable afterwards. Iteration order is
/// the load order and breaks score ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagVocabulary {
    tags: Vec<String>,
}

impl TagVocabulary {
    /// Builds a vocabulary from candidate lines.
    ///
    /// Each line is trimmed and lowercased; blank lines and repeats are dropped.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let tags = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .filter(|tag| seen.insert(tag.clone()))
            .collect();
        Self { tags }
    }

    /// Parses newline-delimited vocabulary text.
    pub fn parse(source: &str) -> Self {
        Self::from_lines(source.lines())
    }

    /// The empty vocabulary; scoring against it yields no tags.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tags in load order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if the vocabulary holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// A scored vocabulary tag. Scores are never persisted; only the ranked tags are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagScore {
    /// The vocabulary tag.
    pub tag: String,
    /// Total relevance score; always positive.
    pub score: f64,
}

/// Maximum number of tags for a text of `token_count` words.
pub fn tag_cap(token_count: usize) -> usize {
    match token_count {
        0..=4 => 1,
        5..=8 => 2,
        _ => 3,
    }
}

/// Splits lowercased text into runs of word characters.
fn word_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_variant(tag: &str, token: &str, suffix: &str) -> bool {
    token.strip_suffix(suffix) == Some(tag) || tag.strip_suffix(suffix) == Some(token)
}

/// Scores one tag against the tokens, or `None` if it does not occur.
fn score_tag(tag: &str, tokens: &[String]) -> Option<f64> {
    let exact: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.as_str() == tag)
        .map(|(i, _)| i)
        .collect();

    let (mut score, positions) = if !exact.is_empty() {
        (EXACT_MATCH_POINTS * exact.len() as f64, exact)
    } else {
        // First token that is a plural/singular variant wins; "s" is checked
        // before "es" on each token.
        let pos = tokens
            .iter()
            .position(|token| is_variant(tag, token, "s") || is_variant(tag, token, "es"))?;
        (VARIANT_MATCH_POINTS, vec![pos])
    };

    let earliest = positions.iter().copied().min().unwrap_or(0);
    score += LENGTH_WEIGHT * tag.chars().count() as f64;
    score += POSITION_HORIZON.saturating_sub(earliest) as f64;
    score += FREQUENCY_WEIGHT * positions.len() as f64;
    Some(score)
}

/// Scores every vocabulary tag that occurs in `text`, best first.
///
/// Ties keep vocabulary order. Tags that do not occur are omitted. The result is
/// not truncated; see [`extract_tags`].
pub fn score_tags(text: &str, vocabulary: &TagVocabulary) -> Vec<TagScore> {
    let tokens = word_tokens(text);
    let mut scored: Vec<TagScore> = vocabulary
        .iter()
        .filter_map(|tag| {
            score_tag(tag, &tokens).map(|score| TagScore {
                tag: tag.to_string(),
                score,
            })
        })
        .collect();
    // sort_by is stable, which preserves vocabulary order among equal scores.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Returns the most relevant tags for `text`, at most [`tag_cap`] of them.
pub fn extract_tags(text: &str, vocabulary: &TagVocabulary) -> Vec<String> {
    let cap = tag_cap(word_tokens(text).len());
    score_tags(text, vocabulary)
        .into_iter()
        .take(cap)
        .map(|s| s.tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(tags: &[&str]) -> TagVocabulary {
        TagVocabulary::from_lines(tags.iter().copied())
    }

    #[test]
    fn test_maestro_example() {
        let v = vocab(&["maestro", "clase"]);
        assert_eq!(extract_tags("el maestro es malo", &v), vec!["maestro"]);
    }

    #[test]
    fn test_exact_match_score_components() {
        let v = vocab(&["maestro"]);
        let scores = score_tags("el maestro es malo", &v);
        // 3 (exact) + 0.7 (length) + 4 (position 1) + 0.5 (one occurrence)
        assert!((scores[0].score - 8.2).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_exact_matches_accumulate() {
        let v = vocab(&["clase"]);
        let scores = score_tags("clase tras clase", &v);
        // 6 (two exact) + 0.5 (length) + 5 (position 0) + 1.0 (two occurrences)
        assert!((scores[0].score - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_plural_variants_match_both_directions() {
        let v = vocab(&["examen", "profesores", "clase"]);
        let scores = score_tags("los examenes del profesor y las clases", &v);
        let tags: Vec<&str> = scores.iter().map(|s| s.tag.as_str()).collect();
        assert!(tags.contains(&"examen"), "tag + es == token");
        assert!(tags.contains(&"profesores"), "token + es == tag");
        assert!(tags.contains(&"clase"), "tag + s == token");
    }

    #[test]
    fn test_variant_match_counts_once() {
        let v = vocab(&["clase"]);
        let scores = score_tags("clases y clases", &v);
        // 2 (variant) + 0.5 (length) + 5 (position 0) + 0.5 (one recorded match)
        assert!((scores[0].score - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_match_suppresses_variant_scan() {
        let v = vocab(&["clase"]);
        let scores = score_tags("las clases y la clase", &v);
        // Only the exact hit at position 4 is counted: 3 + 0.5 + 1 + 0.5.
        assert!((scores[0].score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_unmatched_tags_are_excluded() {
        let v = vocab(&["cafetería", "biblioteca"]);
        assert!(extract_tags("me gusta estudiar mucho aquí en el campus", &v).is_empty());
    }

    #[test]
    fn test_cap_grows_with_length() {
        assert_eq!(tag_cap(0), 1);
        assert_eq!(tag_cap(4), 1);
        assert_eq!(tag_cap(5), 2);
        assert_eq!(tag_cap(8), 2);
        assert_eq!(tag_cap(9), 3);
    }

    #[test]
    fn test_result_never_exceeds_cap() {
        let v = vocab(&["la", "biblioteca", "cierra", "temprano", "muy"]);
        assert_eq!(extract_tags("la biblioteca cierra muy temprano", &v).len(), 2);
        let long = "la biblioteca cierra muy temprano todos los días de la semana";
        assert_eq!(extract_tags(long, &v).len(), 3);
    }

    #[test]
    fn test_ties_keep_vocabulary_order() {
        // Same length, same position horizon (both beyond position 5), one hit each.
        let v = vocab(&["beta", "alfa"]);
        let text = "uno dos tres cuatro cinco seis alfa beta";
        let scores = score_tags(text, &v);
        assert_eq!(scores[0].score, scores[1].score);
        assert_eq!(scores[0].tag, "beta");
        assert_eq!(scores[1].tag, "alfa");
    }

    #[test]
    fn test_earlier_tags_rank_higher() {
        let v = vocab(&["comida", "horario"]);
        let tags = extract_tags("el horario de la cafetería y la comida es malo", &v);
        assert_eq!(tags[0], "horario");
    }

    #[test]
    fn test_tokenizer_ignores_punctuation_and_case() {
        let v = vocab(&["wifi"]);
        assert_eq!(extract_tags("¡El WiFi, otra vez!", &v), vec!["wifi"]);
    }

    #[test]
    fn test_empty_vocabulary_yields_no_tags() {
        assert!(extract_tags("el maestro es malo", &TagVocabulary::empty()).is_empty());
    }

    #[test]
    fn test_vocabulary_parse_normalises_and_dedupes() {
        let v = TagVocabulary::parse("Maestro\n\n  clase \nmaestro\r\n");
        assert_eq!(v.iter().collect::<Vec<_>>(), vec!["maestro", "clase"]);
        assert_eq!(v.len(), 2);
    }
}
