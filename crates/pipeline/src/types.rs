//! Shared value types for the comment analysis domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (a [`Comment`] is never empty or padded,
//! a [`Category`] is one of exactly four labels) and participate in domain
//! computations.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::RecordId;

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment submitted for analysis.
///
/// Always stored trimmed of surrounding whitespace and never empty; the only way
/// to obtain one is through [`Comment::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Comment(String);

impl Comment {
    /// Creates a [`Comment`] from raw input, trimming surrounding whitespace.
    ///
    /// Returns `None` if nothing remains after trimming.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Wraps text the caller has already trimmed and checked to be non-empty.
    pub(crate) fn from_trimmed(text: String) -> Self {
        debug_assert!(!text.is_empty() && text.trim() == text);
        Self(text)
    }

    /// Returns the comment text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl std::fmt::Display for Comment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Comment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Comment::new(raw).ok_or_else(|| serde::de::Error::custom("comment must not be empty"))
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The four fixed categories a comment can be classified into.
///
/// Serialised with the product's Spanish labels. `Queja`, the label used by
/// older submissions for abusive content, is accepted as an alias of
/// [`Category::HateSpeech`] but never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Proposes improvements, ideas, or constructive changes.
    #[serde(rename = "Sugerencia")]
    Suggestion,
    /// Neutral or positive personal opinion. Also the fallback category.
    #[serde(rename = "Opinion")]
    Opinion,
    /// Offensive, discriminatory, or abusive content. Triggers formalization.
    #[serde(rename = "HateSpeech", alias = "Queja")]
    HateSpeech,
    /// Experiences and situations specific to university life.
    #[serde(rename = "Vida universitaria")]
    UniversityLife,
}

/// Legacy label accepted as [`Category::HateSpeech`].
const HATE_SPEECH_ALIAS: &str = "Queja";

impl Category {
    /// All categories, in the order used for lenient label matching and for
    /// statistics output.
    pub const ALL: [Category; 4] = [
        Category::Suggestion,
        Category::Opinion,
        Category::HateSpeech,
        Category::UniversityLife,
    ];

    /// Category used whenever classification cannot produce a valid label.
    pub const DEFAULT: Category = Category::Opinion;

    /// Returns the canonical label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Suggestion => "Sugerencia",
            Category::Opinion => "Opinion",
            Category::HateSpeech => "HateSpeech",
            Category::UniversityLife => "Vida universitaria",
        }
    }

    /// Parses an exact label (canonical or the legacy alias).
    pub fn from_label(label: &str) -> Option<Self> {
        if label == HATE_SPEECH_ALIAS {
            return Some(Category::HateSpeech);
        }
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Returns `true` for the abusive variant that requires formalization.
    pub fn is_abusive(self) -> bool {
        matches!(self, Category::HateSpeech)
    }

    /// Labels accepted by [`Category::from_label`], canonical first.
    pub fn accepted_labels() -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = Self::ALL.iter().map(|c| c.label()).collect();
        labels.push(HATE_SPEECH_ALIAS);
        labels
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp, serialised as an ISO-8601 string.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly. Timestamps without an offset (as written by older history files)
/// are read as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parses an RFC 3339 timestamp, or a naive ISO-8601 one interpreted as UTC.
    pub fn parse(value: &str) -> Option<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Self(naive.and_utc()))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A fully analysed comment that has not yet been persisted.
///
/// Produced by the analysis pipeline or by a validated submission; the history
/// store turns it into an [`AnalysisRecord`] by assigning an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Final comment text (formalized if formalization occurred).
    pub comment: Comment,
    /// Final category.
    pub category: Category,
    /// Extracted tags, most relevant first.
    pub tags: Vec<String>,
}

/// The immutable, persisted outcome of processing one comment.
///
/// Field names on the wire follow the established history file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Sequential id assigned by the history store.
    pub id: RecordId,
    /// When the record was created.
    pub timestamp: Timestamp,
    /// Final comment text.
    #[serde(rename = "comentario")]
    pub comment: Comment,
    /// Final category.
    #[serde(rename = "categoria")]
    pub category: Category,
    /// Extracted tags, most relevant first.
    pub tags: Vec<String>,
}

impl AnalysisRecord {
    /// Stamps a [`NewRecord`] with its id and creation time.
    pub fn from_new(id: RecordId, timestamp: Timestamp, record: NewRecord) -> Self {
        Self {
            id,
            timestamp,
            comment: record.comment,
            category: record.category,
            tags: record.tags,
        }
    }
}
