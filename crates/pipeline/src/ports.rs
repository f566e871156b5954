//! Port traits implemented by infrastructure crates.
//!
//! The domain states *what* it needs; the `llm` and `history` crates supply
//! *how*. Ports return raw text; interpretation lives in [`crate::responses`].
//!
//! All traits are dyn-compatible via [`async_trait`] so the composition root can
//! hold them as `Arc<dyn …>`.

use async_trait::async_trait;

use crate::{AnalysisRecord, Comment, NewRecord, PortError, StoreError};

/// External capability that labels a comment with one of the four categories.
///
/// Implementations return the upstream's raw answer; they do not validate it.
#[async_trait]
pub trait ClassificationPort: Send + Sync {
    /// Asks the upstream to classify `comment`.
    async fn classify(&self, comment: &Comment) -> Result<String, PortError>;
}

/// External capability that rewrites offensive text into a neutral equivalent.
#[async_trait]
pub trait FormalizationPort: Send + Sync {
    /// Asks the upstream for a formal, non-offensive rewrite of `comment`.
    async fn formalize(&self, comment: &Comment) -> Result<String, PortError>;
}

/// Append-only store of analysis records.
///
/// The store owns id assignment ("number of existing records + 1") and
/// timestamps.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends a record, returning it as persisted.
    async fn append(&self, record: NewRecord) -> Result<AnalysisRecord, StoreError>;

    /// Reads every record in insertion order.
    async fn read_all(&self) -> Result<Vec<AnalysisRecord>, StoreError>;

    /// Removes every record. Clearing an empty history succeeds.
    async fn clear(&self) -> Result<(), StoreError>;
}
