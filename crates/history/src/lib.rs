//! File-backed infrastructure for the comment analyzer.
//!
//! - [`JsonHistoryStore`] implements [`pipeline::HistoryStore`] over a single
//!   JSON file with whole-file rewrite semantics.
//! - [`load_vocabulary`] reads the newline-delimited tag vocabulary once at
//!   startup.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File formats, atomic replacement, and writer
//! serialisation live here. The [`pipeline`] crate sees only
//! [`pipeline::HistoryStore`] and [`pipeline::TagVocabulary`].

pub mod json_store;
pub mod vocabulary;

pub use json_store::{JsonHistoryStore, DEFAULT_HISTORY_FILE};
pub use vocabulary::{load_vocabulary, DEFAULT_TAGS_FILE};
