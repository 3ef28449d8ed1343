//! Change proposal validation
//!
//! Proposals are checked one by one, in the order received, against a
//! snapshot of the document's flattened text:
//!
//! 1. `find` must occur verbatim in the snapshot, otherwise the proposal is
//!    dropped as [`ProposalRejected::NotFound`].
//! 2. `replace` may be at most `max_growth_ratio` times as long as `find`;
//!    longer replacements are truncated, never dropped.

use crate::proposal::preview;
use crate::{ChangeProposal, ValidatedChange};
use serde::{Deserialize, Serialize};

/// Validator policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Maximum replace/find length ratio before truncation
    pub max_growth_ratio: f64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            max_growth_ratio: 1.5,
        }
    }
}

/// Why a proposal was dropped or altered by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposalRejected {
    /// `find` does not occur in the document text
    NotFound,
    /// `replace` was cut down to the allowed length
    TruncatedTooLong {
        original_chars: usize,
        truncated_chars: usize,
    },
}

/// One validator decision about one proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalNote {
    /// Position of the proposal in the input list
    pub index: usize,
    pub issue: ProposalRejected,
    /// Human-readable description
    pub message: String,
}

/// Validator output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Accepted changes, in proposal order
    pub changes: Vec<ValidatedChange>,
    /// Proposals dropped because their text was not found
    pub rejections: Vec<ProposalNote>,
    /// Proposals accepted with a truncated replacement
    pub truncations: Vec<ProposalNote>,
}

impl ValidationReport {
    /// Human-readable notes for every dropped proposal
    pub fn rejection_notes(&self) -> Vec<String> {
        self.rejections.iter().map(|n| n.message.clone()).collect()
    }
}

/// Checks untrusted proposals against the document text
#[derive(Debug, Clone, Default)]
pub struct ProposalValidator {
    settings: ValidationSettings,
}

impl ProposalValidator {
    /// Create a validator with the given policy
    pub fn new(settings: ValidationSettings) -> Self {
        Self { settings }
    }

    /// Validate proposals against a flattened-text snapshot
    pub fn validate(&self, proposals: &[ChangeProposal], flattened: &str) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (index, proposal) in proposals.iter().enumerate() {
            if !flattened.contains(proposal.find.as_str()) {
                tracing::debug!(
                    "Proposal {}: text not found - '{}'",
                    index + 1,
                    preview(&proposal.find, 50)
                );
                report.rejections.push(ProposalNote {
                    index,
                    issue: ProposalRejected::NotFound,
                    message: format!(
                        "Proposal {} skipped: text not found in document: '{}'",
                        index + 1,
                        preview(&proposal.find, 50)
                    ),
                });
                continue;
            }

            let mut change = ValidatedChange {
                find: proposal.find.clone(),
                replace: proposal.replace.clone(),
                reason: proposal.reason.clone(),
                truncated: false,
            };

            let find_chars = change.find_chars();
            let replace_chars = change.replace_chars();
            if replace_chars as f64 > find_chars as f64 * self.settings.max_growth_ratio {
                let limit = (find_chars as f64 * self.settings.max_growth_ratio).floor() as usize;
                change.replace = change.replace.chars().take(limit).collect();
                change.truncated = true;

                tracing::debug!(
                    "Proposal {}: trimming replacement from {} to {} chars",
                    index + 1,
                    replace_chars,
                    limit
                );
                report.truncations.push(ProposalNote {
                    index,
                    issue: ProposalRejected::TruncatedTooLong {
                        original_chars: replace_chars,
                        truncated_chars: limit,
                    },
                    message: format!(
                        "Proposal {} replacement trimmed from {} to {} characters",
                        index + 1,
                        replace_chars,
                        limit
                    ),
                });
            }

            report.changes.push(change);
        }

        tracing::debug!(
            "Validated {} of {} proposals",
            report.changes.len(),
            proposals.len()
        );
        report
    }
}
