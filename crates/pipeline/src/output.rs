//! What a pipeline run hands to the presentation layer

use chrono::{DateTime, Utc};
use doc_model::StructuredDocument;
use edit_engine::{ChangeOutcome, ValidationReport};
use revisions::{render_html, DiffOutcome, DiffRendering};
use serde::Serialize;
use uuid::Uuid;

/// Complete result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Unique id of this run, also recorded on its tracing span
    pub request_id: Uuid,
    pub completed_at: DateTime<Utc>,
    /// The patched document
    pub document: StructuredDocument,
    pub original_text: String,
    pub optimized_text: String,
    /// Proposals dropped or trimmed before patching
    pub validation: ValidationReport,
    /// One outcome per validated change, in application order
    pub outcomes: Vec<ChangeOutcome>,
    pub suggestions: Vec<String>,
    pub diff: DiffOutcome,
}

impl PipelineOutput {
    /// Number of changes applied at least once
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.applied).count()
    }

    /// Changes that landed in more than one paragraph
    pub fn multi_occurrence(&self) -> impl Iterator<Item = &ChangeOutcome> {
        self.outcomes.iter().filter(|o| o.is_multi_occurrence())
    }

    /// Grouped diff, if it could be computed
    pub fn rendering(&self) -> Option<&DiffRendering> {
        match &self.diff {
            DiffOutcome::Rendered { rendering } => Some(rendering),
            DiffOutcome::Unavailable { .. } => None,
        }
    }

    /// HTML fragment for the before/after view. Falls back to both texts,
    /// escaped, when no diff is available.
    pub fn diff_html(&self) -> String {
        match &self.diff {
            DiffOutcome::Rendered { rendering } => render_html(rendering),
            DiffOutcome::Unavailable { reason, original, optimized } => format!(
                "<p class=\"diff-unavailable\">{}</p>\
                 <div class=\"diff-original\">{}</div>\
                 <div class=\"diff-optimized\">{}</div>",
                revisions::escape_html(reason),
                revisions::escape_html(original),
                revisions::escape_html(optimized)
            ),
        }
    }
}
