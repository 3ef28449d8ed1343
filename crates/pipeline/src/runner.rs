//! Pipeline orchestration

use crate::{PipelineOutput, PipelineSettings, Result};
use chrono::Utc;
use doc_model::StructuredDocument;
use edit_engine::{ChangeProposal, PatchEngine, ProposalValidator, ProviderResponse};
use revisions::diff_outcome;
use std::time::Instant;
use uuid::Uuid;

/// Runs validation, patching and diffing for one document at a time
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run the pipeline over already-decoded proposals.
    ///
    /// Suggestions are the reasons of the changes that survived validation.
    pub fn run(&self, document: StructuredDocument, proposals: &[ChangeProposal]) -> PipelineOutput {
        let response = ProviderResponse {
            proposals: proposals.to_vec(),
            ..ProviderResponse::default()
        };
        self.execute(document, &response)
    }

    /// Run the pipeline over a raw provider answer.
    ///
    /// An undecodable answer is not an error: the document comes back
    /// unchanged with a single suggestion saying so.
    pub fn run_response(&self, document: StructuredDocument, raw: &str) -> PipelineOutput {
        let response = ProviderResponse::parse(raw);
        if let Some(error) = &response.parse_error {
            tracing::warn!("Provider response could not be decoded: {}", error);
        }
        self.execute(document, &response)
    }

    /// Decode an extraction JSON document, then run over a raw provider answer
    pub fn run_extraction(&self, extraction_json: &str, raw: &str) -> Result<PipelineOutput> {
        let document = StructuredDocument::from_extraction_json(extraction_json)?;
        Ok(self.run_response(document, raw))
    }

    fn execute(&self, mut document: StructuredDocument, response: &ProviderResponse) -> PipelineOutput {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", request_id = %request_id);
        let _guard = span.enter();

        let deadline = self.settings.budget().map(|budget| Instant::now() + budget);
        let original_text = document.flatten();

        let validation = ProposalValidator::new(self.settings.validation.clone())
            .validate(&response.proposals, &original_text);
        tracing::info!(
            "Validated {} of {} proposal(s), {} truncated",
            validation.changes.len(),
            response.proposals.len(),
            validation.truncations.len()
        );

        let report = PatchEngine::new(self.settings.patch.clone()).apply_until(
            &mut document,
            &validation.changes,
            deadline,
        );
        tracing::info!(
            "Applied {} of {} change(s) across {} paragraph(s)",
            report.applied_count(),
            validation.changes.len(),
            report.total_occurrences()
        );
        for outcome in report.multi_occurrence() {
            tracing::info!(
                "Change applied in {} paragraphs: '{}'",
                outcome.occurrences_applied,
                outcome.change.find
            );
        }

        let optimized_text = document.flatten();
        let diff = diff_outcome(
            original_text.as_bytes(),
            optimized_text.as_bytes(),
            &self.settings.diff,
        );

        PipelineOutput {
            request_id,
            completed_at: Utc::now(),
            document,
            original_text,
            optimized_text,
            suggestions: response.suggestions(&validation.changes),
            validation,
            outcomes: report.outcomes,
            diff,
        }
    }
}
