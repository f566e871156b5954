//! Error, degradation, and retry-policy types for the comment analysis domain.
//!
//! The analysis pipeline only fails outward before classification (incoherent
//! input) or at persistence. Port failures are absorbed and recorded as a
//! [`Degradation`] instead of an error.
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions must be able to produce a [`RetryPolicy`].

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by port error types to let the adapter decide whether to re-issue a
/// call before giving up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Port errors
// ---------------------------------------------------------------------------

/// Failure of an external text-in/text-out capability (classification or
/// formalization).
#[derive(Debug, Error)]
pub enum PortError {
    /// The call did not complete within the configured timeout.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be delivered or the response could not be read.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The upstream service answered with a non-success status.
    #[error("upstream returned status {status}: {message}")]
    Upstream {
        /// HTTP status code (or equivalent) reported by the upstream.
        status: u16,
        /// Upstream error body or reason phrase.
        message: String,
        /// Delay requested by the upstream before retrying, if any.
        retry_after: Option<Duration>,
    },

    /// The upstream answered successfully but with no text.
    #[error("upstream returned an empty response")]
    EmptyResponse,

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl PortError {
    /// Classifies this error for the adapter's retry loop.
    ///
    /// Timeouts, transport failures, rate limiting (429) and server errors (5xx)
    /// are retryable; everything else is not.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            PortError::Timeout(_) | PortError::Transport(_) => {
                RetryPolicy::Retryable { after: None }
            }
            PortError::Upstream {
                status,
                retry_after,
                ..
            } if *status == 429 || *status >= 500 => RetryPolicy::Retryable {
                after: *retry_after,
            },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Degradations
// ---------------------------------------------------------------------------

/// A port outcome the pipeline absorbed by substituting a safe default.
///
/// Degradations are logged and reported alongside the result; they never turn
/// an analysis into a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// Classification failed or returned no recognisable label; the default
    /// category was used.
    ClassificationDegraded {
        /// Why the default was substituted.
        reason: String,
    },
    /// Formalization failed or returned implausibly short text; a placeholder
    /// sentence was used.
    FormalizationDegraded {
        /// Why the placeholder was substituted.
        reason: String,
    },
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::ClassificationDegraded { reason } => {
                write!(f, "classification degraded: {reason}")
            }
            Degradation::FormalizationDegraded { reason } => {
                write!(f, "formalization degraded: {reason}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

/// Failure of the append-only history store.
///
/// Surfaced to the caller as a failed operation; the comment is not cleared
/// from the current-comment slot so the caller can retry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("history I/O failed for {path}: {source}", path = path.display())]
    Io {
        /// Backing file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not contain a valid history.
    #[error("history file {path} is corrupt: {source}", path = path.display())]
    Corrupt {
        /// Backing file path.
        path: PathBuf,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// The history could not be encoded for writing.
    #[error("failed to serialise history: {0}")]
    Serialization(#[source] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Submission errors
// ---------------------------------------------------------------------------

/// Client error in an inbound record submission.
///
/// Messages are user-facing and returned verbatim by the HTTP front end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// One or more required fields are absent.
    #[error("Faltan los siguientes campos requeridos: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The comment is empty after trimming.
    #[error("El comentario no puede estar vacío")]
    EmptyComment,

    /// The category is not one of the valid labels.
    #[error("Categoría inválida. Categorías válidas: {}", valid.join(", "))]
    InvalidCategory {
        /// The rejected value.
        given: String,
        /// Labels that would have been accepted.
        valid: Vec<&'static str>,
    },

    /// The tags field is not a list of strings.
    #[error("Los tags deben ser una lista")]
    InvalidTags,

    /// A field has the wrong JSON type.
    #[error("El campo '{0}' debe ser texto")]
    NotText(&'static str),
}
