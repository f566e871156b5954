//! Core domain for the comment analyzer.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, pure analysis rule, and port trait used throughout the system.
//! Infrastructure crates implement the traits defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RecordId`, `RunId`) |
//! | [`types`] | Value types (`Comment`, `Category`, `Timestamp`, records) |
//! | [`errors`] | Port, store and submission errors; degradations; retry policy |
//! | [`coherence`] | Coherence gate and its rule tables |
//! | [`tags`] | Tag vocabulary and relevance scoring |
//! | [`responses`] | Interpretation of raw classification/formalization output |
//! | [`ports`] | `ClassificationPort`, `FormalizationPort`, `HistoryStore` |
//! | [`submission`] | Validation of externally submitted records |
//! | [`slot`] | Current-comment handoff slot |
//! | [`stats`] | History statistics and previews |

pub mod coherence;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod responses;
pub mod slot;
pub mod stats;
pub mod submission;
pub mod tags;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use coherence::{check_coherence, is_coherent, IncoherenceReason};
pub use errors::{Degradation, PortError, RetryPolicy, StoreError, SubmissionError};
pub use identifiers::{RecordId, RunId};
pub use ports::{ClassificationPort, FormalizationPort, HistoryStore};
pub use responses::{
    clean_formalized, match_category_label, FormalizedText, LabelMatch,
    FORMALIZATION_FAILED_PLACEHOLDER, FORMALIZATION_TOO_SHORT_PLACEHOLDER,
};
pub use slot::CommentSlot;
pub use stats::{preview, recent, CategoryCount, HistoryStatistics, TagCount};
pub use submission::SubmissionRequest;
pub use tags::{extract_tags, score_tags, tag_cap, TagScore, TagVocabulary};
pub use types::{AnalysisRecord, Category, Comment, NewRecord, Timestamp};
