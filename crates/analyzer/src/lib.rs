//! Comment analysis orchestration.
//!
//! This crate provides [`AnalysisPipeline`], which drives one comment through
//! the coherence gate, classification, conditional formalization, and tag
//! extraction, and [`PipelineState`], which enforces that a comment is
//! formalized at most once.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The pipeline sequences calls between business logic
//! in the [`pipeline`] crate and the port traits (classification,
//! formalization). It contains no domain rules of its own beyond the state
//! machine.
//!
//! ## States
//!
//! ```text
//! Received ──gate──▶ Gated ──classify──▶ Classified ──(abusive, first pass)──▶ Formalized
//!    │                 │                      │                                   │
//!    ▼                 └──(already formalized)┴───────────────────────────────────┴──▶ Finalized
//! Rejected
//! ```
//!
//! Port failures never leave the pipeline: they are absorbed as a
//! [`pipeline::Degradation`] and a safe default is used.

use std::sync::Arc;

use pipeline::{
    check_coherence, clean_formalized, extract_tags, match_category_label, Category,
    ClassificationPort, Comment, Degradation, FormalizationPort, FormalizedText,
    IncoherenceReason, LabelMatch, NewRecord, RunId, TagVocabulary,
};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Position of a comment instance in the analysis state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Nothing has run yet.
    #[default]
    Received,
    /// The coherence gate accepted the text.
    Gated,
    /// The classification port produced (or defaulted) a category.
    Classified,
    /// The abusive comment was rewritten.
    Formalized,
    /// Tags were extracted and the draft assembled.
    Finalized,
    /// The coherence gate rejected the text.
    Rejected,
}

/// Per-comment-instance state carried across pipeline passes.
///
/// Owned by whoever is driving one comment (a CLI prompt loop, a request
/// handler) and discarded once that comment is finalized or rejected. The
/// formalized flag is never global: a new comment starts from
/// [`PipelineState::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineState {
    formalized: bool,
    stage: Stage,
}

impl PipelineState {
    /// State for a comment that has not been formalized.
    pub fn new() -> Self {
        Self::default()
    }

    /// State for re-entering the pipeline with text that is already the
    /// formalized rewrite of an abusive comment.
    pub fn already_formalized() -> Self {
        Self {
            formalized: true,
            stage: Stage::Received,
        }
    }

    /// Returns `true` once formalization has been applied to this instance.
    pub fn is_formalized(&self) -> bool {
        self.formalized
    }

    /// The stage reached by the most recent pass.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, "pipeline stage transition");
        self.stage = stage;
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A finalized analysis that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisDraft {
    /// Correlates this draft with the run's log events.
    pub run_id: RunId,
    /// The text as submitted (trimmed).
    pub original: Comment,
    /// The final text: the formalized rewrite if formalization occurred.
    pub comment: Comment,
    /// The final category.
    pub category: Category,
    /// Extracted tags, most relevant first.
    pub tags: Vec<String>,
    /// `true` if the final text is a formalized rewrite (this pass or an
    /// earlier one).
    pub formalized: bool,
    /// Safe defaults that replaced failed or unusable port output.
    pub degradations: Vec<Degradation>,
}

impl AnalysisDraft {
    /// Converts the draft into what the history store persists.
    pub fn into_new_record(self) -> NewRecord {
        NewRecord {
            comment: self.comment,
            category: self.category,
            tags: self.tags,
        }
    }
}

/// Result of one pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The coherence gate rejected the input; nothing else ran.
    Rejected(IncoherenceReason),
    /// Every stage completed.
    Completed(AnalysisDraft),
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Drives comments through gate → classify → formalize → tags.
///
/// Cheap to clone; ports and vocabulary are shared.
#[derive(Clone)]
pub struct AnalysisPipeline {
    classifier: Arc<dyn ClassificationPort>,
    formalizer: Arc<dyn FormalizationPort>,
    vocabulary: Arc<TagVocabulary>,
}

impl AnalysisPipeline {
    /// Creates a pipeline over the given ports and tag vocabulary.
    pub fn new(
        classifier: Arc<dyn ClassificationPort>,
        formalizer: Arc<dyn FormalizationPort>,
        vocabulary: Arc<TagVocabulary>,
    ) -> Self {
        Self {
            classifier,
            formalizer,
            vocabulary,
        }
    }

    /// Runs one pass over `text`.
    ///
    /// With a fresh `state`, an abusive comment is formalized and `state` is
    /// marked. With a marked `state` (re-entry on the formalized text), the
    /// classifier and formalizer are not called again and the category is the
    /// abusive one.
    #[tracing::instrument(
        name = "analysis",
        skip_all,
        fields(run_id = tracing::field::Empty, chars = text.chars().count())
    )]
    pub async fn analyze(&self, text: &str, state: &mut PipelineState) -> AnalysisOutcome {
        let run_id = RunId::new_random();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        state.advance(Stage::Received);

        if let Err(reason) = check_coherence(text) {
            info!(%reason, "comment rejected as incoherent");
            state.advance(Stage::Rejected);
            return AnalysisOutcome::Rejected(reason);
        }
        let Some(original) = Comment::new(text) else {
            state.advance(Stage::Rejected);
            return AnalysisOutcome::Rejected(IncoherenceReason::Empty);
        };
        state.advance(Stage::Gated);

        let mut degradations = Vec::new();
        let (comment, category) = if state.is_formalized() {
            debug!("re-entry with formalized text; skipping classification");
            (original.clone(), Category::HateSpeech)
        } else {
            let category = self.classify(&original, &mut degradations).await;
            state.advance(Stage::Classified);
            if category.is_abusive() {
                let rewritten = self.formalize(&original, &mut degradations).await;
                state.formalized = true;
                state.advance(Stage::Formalized);
                (rewritten, category)
            } else {
                (original.clone(), category)
            }
        };

        let tags = extract_tags(comment.as_str(), &self.vocabulary);
        state.advance(Stage::Finalized);
        info!(
            category = %category,
            tags = tags.len(),
            formalized = state.is_formalized(),
            degraded = !degradations.is_empty(),
            "comment analysed"
        );

        AnalysisOutcome::Completed(AnalysisDraft {
            run_id,
            original,
            comment,
            category,
            tags,
            formalized: state.is_formalized(),
            degradations,
        })
    }

    async fn classify(&self, comment: &Comment, degradations: &mut Vec<Degradation>) -> Category {
        let reason = match self.classifier.classify(comment).await {
            Ok(response) => {
                let matched = match_category_label(&response);
                if let LabelMatch::Lenient(category) = matched {
                    debug!(%category, "classification label matched leniently");
                }
                if matched != LabelMatch::Unrecognized {
                    return matched.category();
                }
                format!("unrecognised label ({} chars)", response.chars().count())
            }
            Err(err) => err.to_string(),
        };

        let degradation = Degradation::ClassificationDegraded { reason };
        warn!(%degradation, default = %Category::DEFAULT, "analysis degraded");
        degradations.push(degradation);
        Category::DEFAULT
    }

    async fn formalize(&self, comment: &Comment, degradations: &mut Vec<Degradation>) -> Comment {
        let (text, reason) = match self.formalizer.formalize(comment).await {
            Ok(response) => {
                let cleaned = clean_formalized(&response);
                let reason = cleaned
                    .is_placeholder()
                    .then(|| "rewrite too short".to_string());
                (cleaned, reason)
            }
            Err(err) => (FormalizedText::failed(), Some(err.to_string())),
        };

        match reason {
            Some(reason) => {
                let degradation = Degradation::FormalizationDegraded { reason };
                warn!(%degradation, "analysis degraded");
                degradations.push(degradation);
            }
            None => debug!(chars = text.text().chars().count(), "formalized rewrite accepted"),
        }
        text.into_comment()
    }
}
