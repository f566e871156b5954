//! Interpretation of raw port responses.
//!
//! Ports return whatever text the upstream model produced. These functions turn
//! that text into domain values and report when a safe default had to be used,
//! so that every port outcome maps to something the pipeline can finish with.

use crate::{Category, Comment};

/// Substituted when a formalized rewrite is implausibly short.
pub const FORMALIZATION_TOO_SHORT_PLACEHOLDER: &str =
    "Comentario convertido a lenguaje apropiado por contener contenido ofensivo.";

/// Substituted when the formalization port fails outright.
pub const FORMALIZATION_FAILED_PLACEHOLDER: &str =
    "Comentario modificado por contener contenido inapropiado.";

/// Rewrites shorter than this (in characters) are replaced by
/// [`FORMALIZATION_TOO_SHORT_PLACEHOLDER`].
pub const MIN_FORMALIZED_CHARS: usize = 10;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// How a classification response was understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch {
    /// The trimmed response is exactly a valid label.
    Exact(Category),
    /// A valid label occurs somewhere in the response, ignoring case.
    Lenient(Category),
    /// No label could be recognised.
    Unrecognized,
}

impl LabelMatch {
    /// The category to use, falling back to [`Category::DEFAULT`].
    pub fn category(self) -> Category {
        match self {
            LabelMatch::Exact(c) | LabelMatch::Lenient(c) => c,
            LabelMatch::Unrecognized => Category::DEFAULT,
        }
    }
}

/// Matches a raw classification response against the valid labels.
///
/// Labels are tried in [`Category::ALL`] order for the lenient pass, followed
/// by the legacy alias.
pub fn match_category_label(response: &str) -> LabelMatch {
    let trimmed = response.trim();
    if let Some(category) = Category::from_label(trimmed) {
        return LabelMatch::Exact(category);
    }

    let lowered = trimmed.to_lowercase();
    Category::accepted_labels()
        .into_iter()
        .find(|label| lowered.contains(&label.to_lowercase()))
        .and_then(Category::from_label)
        .map(LabelMatch::Lenient)
        .unwrap_or(LabelMatch::Unrecognized)
}

// ---------------------------------------------------------------------------
// Formalization
// ---------------------------------------------------------------------------

/// Result of cleaning a formalization response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormalizedText {
    /// The cleaned rewrite is long enough to use.
    Accepted(String),
    /// The cleaned rewrite was too short; holds the placeholder.
    Placeholder(String),
}

impl FormalizedText {
    /// The text to use as the final comment.
    pub fn text(&self) -> &str {
        match self {
            FormalizedText::Accepted(s) | FormalizedText::Placeholder(s) => s,
        }
    }

    /// Returns `true` if a placeholder replaced the model's rewrite.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, FormalizedText::Placeholder(_))
    }

    /// The placeholder used when the formalization port fails.
    pub fn failed() -> Self {
        FormalizedText::Placeholder(FORMALIZATION_FAILED_PLACEHOLDER.to_string())
    }

    /// Converts the text into the final [`Comment`].
    ///
    /// Both variants are trimmed and non-empty by construction.
    pub fn into_comment(self) -> Comment {
        match self {
            FormalizedText::Accepted(s) | FormalizedText::Placeholder(s) => {
                Comment::from_trimmed(s)
            }
        }
    }
}

/// Removes one layer of matching surrounding quotes, if present.
fn strip_outer_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.chars().count() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[quote.len_utf8()..text.len() - quote.len_utf8()];
        }
    }
    text
}

/// Cleans a raw formalization response.
///
/// Trims it, strips one layer of matching quotes, drops doubled quote pairs left
/// by the model, and substitutes the placeholder when fewer than
/// [`MIN_FORMALIZED_CHARS`] characters remain.
pub fn clean_formalized(response: &str) -> FormalizedText {
    let cleaned = strip_outer_quotes(response.trim())
        .replace("\"\"", "")
        .replace("''", "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() < MIN_FORMALIZED_CHARS {
        FormalizedText::Placeholder(FORMALIZATION_TOO_SHORT_PLACEHOLDER.to_string())
    } else {
        FormalizedText::Accepted(cleaned.to_string())
    }
}
