//! Patch application engine
//!
//! Validated changes are applied one at a time, in list order. Each change
//! re-reads the current document, so a later change sees the text left by
//! earlier ones. Every change produces a [`ChangeOutcome`]; none aborts the
//! batch.

use crate::proposal::preview;
use crate::{preserve_bullet, rewrite_span, FindEngine, MatchKind, TextMatch, ValidatedChange};
use doc_model::{Paragraph, StructuredDocument};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

/// Gates evaluated immediately before mutating the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchSettings {
    /// Shortest `find` text accepted, in characters
    pub min_find_chars: usize,
    /// Largest allowed `len(replace) - len(find)`, in characters
    pub max_growth_chars: usize,
}

impl Default for PatchSettings {
    fn default() -> Self {
        Self {
            min_find_chars: 15,
            max_growth_chars: 50,
        }
    }
}

/// Why a validated change was not applied
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeNotApplied {
    #[error("find text too short ({find_chars} < {min_chars} chars)")]
    TooShortFind { find_chars: usize, min_chars: usize },

    #[error("replacement too long (+{growth} > +{max_growth} chars)")]
    ReplacementTooLong { growth: usize, max_growth: usize },

    #[error("replacement text is empty")]
    EmptyReplacement,

    #[error("find text not found in document structure")]
    NotFoundInStructure,

    #[error("rewrite of paragraph {paragraph} broke the run structure")]
    StructuralInvariantViolation { paragraph: usize },

    #[error("time budget exhausted before this change was attempted")]
    DeadlineExceeded,
}

/// Audit record for one validated change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeOutcome {
    pub change: ValidatedChange,
    pub applied: bool,
    /// Number of paragraphs the change was applied to
    pub occurrences_applied: usize,
    /// Which matching pass located the target
    pub match_kind: Option<MatchKind>,
    pub rejection_reason: Option<ChangeNotApplied>,
}

impl ChangeOutcome {
    fn applied(change: &ValidatedChange, occurrences: usize, kind: MatchKind) -> Self {
        Self {
            change: change.clone(),
            applied: true,
            occurrences_applied: occurrences,
            match_kind: Some(kind),
            rejection_reason: None,
        }
    }

    fn rejected(change: &ValidatedChange, reason: ChangeNotApplied) -> Self {
        Self {
            change: change.clone(),
            applied: false,
            occurrences_applied: 0,
            match_kind: None,
            rejection_reason: Some(reason),
        }
    }

    /// Applied in more than one paragraph
    pub fn is_multi_occurrence(&self) -> bool {
        self.occurrences_applied > 1
    }
}

/// Outcomes of a patch run, in change order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchReport {
    pub outcomes: Vec<ChangeOutcome>,
}

impl PatchReport {
    /// Number of changes applied at least once
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.applied).count()
    }

    /// Total paragraph rewrites across all changes
    pub fn total_occurrences(&self) -> usize {
        self.outcomes.iter().map(|o| o.occurrences_applied).sum()
    }

    /// Changes that landed in more than one paragraph
    pub fn multi_occurrence(&self) -> impl Iterator<Item = &ChangeOutcome> {
        self.outcomes.iter().filter(|o| o.is_multi_occurrence())
    }
}

/// Applies validated changes to a structured document
#[derive(Debug, Clone, Default)]
pub struct PatchEngine {
    settings: PatchSettings,
}

impl PatchEngine {
    /// Create an engine with the given gates
    pub fn new(settings: PatchSettings) -> Self {
        Self { settings }
    }

    /// Apply every change in order
    pub fn apply(&self, doc: &mut StructuredDocument, changes: &[ValidatedChange]) -> PatchReport {
        self.apply_until(doc, changes, None)
    }

    /// Apply changes in order, stopping at `deadline`.
    ///
    /// The deadline is checked between changes only; changes not started in
    /// time are reported as [`ChangeNotApplied::DeadlineExceeded`].
    pub fn apply_until(
        &self,
        doc: &mut StructuredDocument,
        changes: &[ValidatedChange],
        deadline: Option<Instant>,
    ) -> PatchReport {
        let mut report = PatchReport::default();

        for (i, change) in changes.iter().enumerate() {
            let expired = deadline.is_some_and(|d| Instant::now() >= d);
            let outcome = if expired {
                tracing::debug!("Change {}: skipped, deadline reached", i + 1);
                ChangeOutcome::rejected(change, ChangeNotApplied::DeadlineExceeded)
            } else {
                self.apply_change(doc, change)
            };

            match &outcome.rejection_reason {
                None => tracing::debug!(
                    "Change {}: applied {}x - '{}'",
                    i + 1,
                    outcome.occurrences_applied,
                    preview(&change.find, 50)
                ),
                Some(reason) => tracing::debug!(
                    "Change {}: not applied ({}) - '{}'",
                    i + 1,
                    reason,
                    preview(&change.find, 50)
                ),
            }
            report.outcomes.push(outcome);
        }

        tracing::debug!(
            "Total changes applied: {} ({} occurrences)",
            report.applied_count(),
            report.total_occurrences()
        );
        report
    }

    /// Apply one change against the current document state
    pub fn apply_change(&self, doc: &mut StructuredDocument, change: &ValidatedChange) -> ChangeOutcome {
        if let Some(reason) = self.gate(change) {
            return ChangeOutcome::rejected(change, reason);
        }

        let engine = FindEngine::new(doc);
        let exact = engine.find_exact(&change.find);
        let (matches, kind) = if !exact.is_empty() {
            (exact, MatchKind::Exact)
        } else {
            match engine.find_normalized(&change.find) {
                Ok(normalized) => (normalized, MatchKind::Normalized),
                Err(e) => {
                    tracing::warn!("Cannot build flexible pattern: {}", e);
                    (Vec::new(), MatchKind::Normalized)
                }
            }
        };

        if matches.is_empty() {
            log_similar_paragraphs(doc, &change.find);
            return ChangeOutcome::rejected(change, ChangeNotApplied::NotFoundInStructure);
        }

        match apply_matches(doc, &matches, &change.replace) {
            Ok(count) => ChangeOutcome::applied(change, count, kind),
            Err(reason) => ChangeOutcome::rejected(change, reason),
        }
    }

    fn gate(&self, change: &ValidatedChange) -> Option<ChangeNotApplied> {
        let find_chars = change.find_chars();
        if find_chars < self.settings.min_find_chars {
            return Some(ChangeNotApplied::TooShortFind {
                find_chars,
                min_chars: self.settings.min_find_chars,
            });
        }

        let growth = change.growth();
        if growth > self.settings.max_growth_chars as isize {
            return Some(ChangeNotApplied::ReplacementTooLong {
                growth: growth as usize,
                max_growth: self.settings.max_growth_chars,
            });
        }

        if change.replace.is_empty() {
            return Some(ChangeNotApplied::EmptyReplacement);
        }

        None
    }
}

/// Rewrite every match. If any paragraph fails, every paragraph already
/// rewritten for this change is restored.
fn apply_matches(
    doc: &mut StructuredDocument,
    matches: &[TextMatch],
    replace: &str,
) -> Result<usize, ChangeNotApplied> {
    let mut touched: Vec<(usize, Paragraph)> = Vec::with_capacity(matches.len());

    for m in matches {
        let replacement = preserve_bullet(&m.matched_text, replace);
        let result = doc.paragraph_mut(m.paragraph).map_err(Into::into).and_then(|para| {
            touched.push((m.paragraph, para.clone()));
            rewrite_span(para, m.paragraph, m.start, m.end, &replacement)
        });

        if let Err(e) = result {
            tracing::warn!("Rolling back change: {}", e);
            for (index, original) in touched.into_iter().rev() {
                if let Ok(para) = doc.paragraph_mut(index) {
                    *para = original;
                }
            }
            return Err(ChangeNotApplied::StructuralInvariantViolation {
                paragraph: m.paragraph,
            });
        }
    }

    Ok(matches.len())
}

fn log_similar_paragraphs(doc: &StructuredDocument, find: &str) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    let probe: String = find.chars().take(10).collect::<String>().to_lowercase();
    for para in doc.paragraphs().iter().take(10) {
        let text = para.flatten();
        if text.chars().count() > 20 && text.to_lowercase().contains(&probe) {
            tracing::debug!("  Similar paragraph: '{}'", preview(&text, 80));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Run, RunFormatting};

    fn doc(lines: &[&str]) -> StructuredDocument {
        StructuredDocument::from_paragraphs(lines.iter().map(|l| Paragraph::from_text(*l)).collect())
    }

    #[test]
    fn test_single_run_replace() {
        let mut doc = doc(&["• Built data workflows for reporting."]);
        let change = ValidatedChange::new("Built data workflows", "Built data pipelines");

        let outcome = PatchEngine::default().apply_change(&mut doc, &change);

        assert!(outcome.applied);
        assert_eq!(outcome.occurrences_applied, 1);
        assert_eq!(outcome.match_kind, Some(MatchKind::Exact));
        assert_eq!(
            doc.paragraphs()[0].runs()[0].text(),
            "• Built data pipelines for reporting."
        );
    }

    #[test]
    fn test_missing_text_leaves_document_unchanged() {
        let mut doc = doc(&["• Built data workflows for reporting."]);
        let before = doc.clone();
        let change = ValidatedChange::new("Led internship at NASA", "Led internship at ESA");

        let outcome = PatchEngine::default().apply_change(&mut doc, &change);

        assert!(!outcome.applied);
        assert_eq!(outcome.rejection_reason, Some(ChangeNotApplied::NotFoundInStructure));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_too_short_find() {
        let mut doc = doc(&["Python, Java"]);
        let outcome = PatchEngine::default()
            .apply_change(&mut doc, &ValidatedChange::new("Python, Java", "Python, Rust"));

        assert_eq!(
            outcome.rejection_reason,
            Some(ChangeNotApplied::TooShortFind { find_chars: 12, min_chars: 15 })
        );
        assert_eq!(doc.flatten(), "Python, Java");
    }

    #[test]
    fn test_absolute_growth_gate() {
        let find = "a".repeat(110);
        let replace = "b".repeat(161);
        let mut doc = doc(&[find.as_str()]);

        let outcome = PatchEngine::default()
            .apply_change(&mut doc, &ValidatedChange::new(find.clone(), replace));

        assert_eq!(
            outcome.rejection_reason,
            Some(ChangeNotApplied::ReplacementTooLong { growth: 51, max_growth: 50 })
        );
        assert_eq!(doc.flatten(), find);
    }

    #[test]
    fn test_growth_of_exactly_fifty_is_allowed() {
        let find = "a".repeat(110);
        let mut doc = doc(&[find.as_str()]);

        let outcome = PatchEngine::default()
            .apply_change(&mut doc, &ValidatedChange::new(find, "b".repeat(160)));

        assert!(outcome.applied);
    }

    #[test]
    fn test_empty_replacement_is_skipped() {
        let mut doc = doc(&["Worked with cross-functional teams"]);
        let outcome = PatchEngine::default()
            .apply_change(&mut doc, &ValidatedChange::new("Worked with cross-functional", ""));

        assert_eq!(outcome.rejection_reason, Some(ChangeNotApplied::EmptyReplacement));
    }

    #[test]
    fn test_bullet_is_reinstated() {
        let mut doc = doc(&["• Led cross-functional initiatives"]);
        let change = ValidatedChange::new("• Led cross-functional initiatives", "Led initiatives");

        let outcome = PatchEngine::default().apply_change(&mut doc, &change);

        assert!(outcome.applied);
        assert_eq!(doc.flatten(), "• Led initiatives");
    }

    #[test]
    fn test_normalized_fallback_replaces_actual_span() {
        let mut doc = doc(&["Skills:  Python,   Java", "Other"]);
        let change = ValidatedChange::new("Skills: Python, Java", "Skills: Python, Rust");

        let outcome = PatchEngine::default().apply_change(&mut doc, &change);

        assert!(outcome.applied);
        assert_eq!(outcome.match_kind, Some(MatchKind::Normalized));
        assert_eq!(doc.flatten(), "Skills: Python, Rust\nOther");
    }

    #[test]
    fn test_applies_to_every_paragraph_containing_find() {
        let mut doc = doc(&[
            "Developed ML systems for search",
            "Unrelated line",
            "Developed ML systems for ads; Developed ML systems again",
        ]);
        let change = ValidatedChange::new("Developed ML systems", "Developed ML models");

        let report = PatchEngine::default().apply(&mut doc, &[change]);

        let outcome = &report.outcomes[0];
        assert_eq!(outcome.occurrences_applied, 2);
        assert!(outcome.is_multi_occurrence());
        assert_eq!(report.multi_occurrence().count(), 1);
        // first occurrence per paragraph only
        assert_eq!(
            doc.paragraphs()[2].flatten(),
            "Developed ML models for ads; Developed ML systems again"
        );
    }

    #[test]
    fn test_later_changes_see_earlier_edits() {
        let mut doc = doc(&["Built data workflows for reporting."]);
        let changes = vec![
            ValidatedChange::new("Built data workflows", "Built data pipelines"),
            ValidatedChange::new("data pipelines for reporting", "data pipelines for analytics"),
            ValidatedChange::new("Built data workflows", "Built something else"),
        ];

        let report = PatchEngine::default().apply(&mut doc, &changes);

        assert!(report.outcomes[0].applied);
        assert!(report.outcomes[1].applied);
        assert_eq!(
            report.outcomes[2].rejection_reason,
            Some(ChangeNotApplied::NotFoundInStructure)
        );
        assert_eq!(doc.flatten(), "Built data pipelines for analytics.");
    }

    #[test]
    fn test_multi_run_match_keeps_outer_formatting() {
        let bold = RunFormatting::default().bold(true);
        let italic = RunFormatting::default().italic(true);
        let mut doc = StructuredDocument::from_paragraphs(vec![Paragraph::with_runs(vec![
            Run::with_formatting("Senior Engineer | ", bold.clone()),
            Run::new("Worked with cross-"),
            Run::with_formatting("functional teams", italic.clone()),
            Run::with_formatting(" at Acme", bold.clone()),
        ])]);
        let change = ValidatedChange::new(
            "Worked with cross-functional teams",
            "Collaborated with cross-functional teams",
        );

        let outcome = PatchEngine::default().apply_change(&mut doc, &change);

        assert!(outcome.applied);
        let para = &doc.paragraphs()[0];
        assert_eq!(para.flatten(), "Senior Engineer | Collaborated with cross-functional teams at Acme");
        assert_eq!(para.runs()[0].formatting(), &bold);
        assert_eq!(para.runs()[2].text(), "");
        assert_eq!(para.runs()[3].text(), " at Acme");
        assert_eq!(para.runs()[3].formatting(), &bold);
    }

    #[test]
    fn test_empty_change_list_is_identity() {
        let mut doc = StructuredDocument::from_paragraphs(vec![Paragraph::with_runs(vec![
            Run::with_formatting("Name", RunFormatting::default().font("Georgia", 18.0)),
        ])
        .with_style("Title")]);
        let before = doc.clone();

        let report = PatchEngine::default().apply(&mut doc, &[]);

        assert!(report.outcomes.is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_expired_deadline_skips_remaining_changes() {
        let mut doc = doc(&["Built data workflows for reporting."]);
        let before = doc.clone();
        let changes = vec![ValidatedChange::new("Built data workflows", "Built data pipelines")];

        let report = PatchEngine::default().apply_until(&mut doc, &changes, Some(Instant::now()));

        assert_eq!(
            report.outcomes[0].rejection_reason,
            Some(ChangeNotApplied::DeadlineExceeded)
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn test_custom_gates() {
        let engine = PatchEngine::new(PatchSettings {
            min_find_chars: 4,
            max_growth_chars: 2,
        });
        let mut doc = doc(&["Java and Go"]);

        let short = engine.apply_change(&mut doc, &ValidatedChange::new("Java", "Rust"));
        assert!(short.applied);

        let long = engine.apply_change(&mut doc, &ValidatedChange::new("and Go", "and TypeScript"));
        assert!(matches!(
            long.rejection_reason,
            Some(ChangeNotApplied::ReplacementTooLong { growth: 8, max_growth: 2 })
        ));
        assert_eq!(doc.flatten(), "Rust and Go");
    }
}
