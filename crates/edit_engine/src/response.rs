//! Provider response parsing
//!
//! The text-generation provider answers with free text that should hold a JSON
//! object `{"changes": [{"find", "replace", "reason"}], "key_insights": "..."}`,
//! often wrapped in a Markdown code fence. Nothing in it is trusted.

use crate::{ChangeProposal, ValidatedChange};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Suggestion reported when the provider's answer cannot be decoded
pub const UNPARSEABLE_RESPONSE_NOTE: &str =
    "Could not parse provider response - using original document";

const FENCE_PATTERN: &str = r"```(?:json)?\s*([\s\S]*?)\s*```";

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    changes: Vec<Value>,
    #[serde(default)]
    key_insights: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChange {
    find: Option<String>,
    replace: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Decoded provider answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Proposals in the order the provider listed them
    pub proposals: Vec<ChangeProposal>,
    /// Summary of the provider's reasoning
    pub insights: Option<String>,
    /// Decode failure, if the answer was not usable JSON
    pub parse_error: Option<String>,
}

impl ProviderResponse {
    /// Parse a raw provider answer. Never fails: an undecodable answer yields
    /// no proposals and records the decode error.
    pub fn parse(raw: &str) -> Self {
        let body = fenced_body(raw).unwrap_or_else(|| raw.trim());

        let decoded: RawResponse = match serde_json::from_str(body) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!("Provider response is not valid JSON: {}", e);
                return Self {
                    parse_error: Some(e.to_string()),
                    ..Self::default()
                };
            }
        };

        let mut proposals = Vec::with_capacity(decoded.changes.len());
        for (i, entry) in decoded.changes.into_iter().enumerate() {
            match serde_json::from_value::<RawChange>(entry) {
                Ok(RawChange {
                    find: Some(find),
                    replace: Some(replace),
                    reason,
                }) => proposals.push(ChangeProposal {
                    find,
                    replace,
                    reason: reason.unwrap_or_default(),
                }),
                Ok(_) => tracing::debug!("Skipping change {}: missing find or replace", i + 1),
                Err(e) => tracing::debug!("Skipping change {}: {}", i + 1, e),
            }
        }

        Self {
            proposals,
            insights: decoded.key_insights,
            parse_error: None,
        }
    }

    /// Human-readable suggestions: insights first, then the reason of every
    /// accepted change
    pub fn suggestions(&self, accepted: &[ValidatedChange]) -> Vec<String> {
        if self.parse_error.is_some() {
            return vec![UNPARSEABLE_RESPONSE_NOTE.to_string()];
        }

        let mut suggestions = Vec::new();
        if let Some(insights) = &self.insights {
            suggestions.push(insights.clone());
        }
        suggestions.extend(
            accepted
                .iter()
                .filter(|c| !c.reason.is_empty())
                .map(|c| c.reason.clone()),
        );
        suggestions
    }
}

/// Body of the first Markdown code fence, if any
fn fenced_body(raw: &str) -> Option<&str> {
    let fence = Regex::new(FENCE_PATTERN).ok()?;
    let captures = fence.captures(raw)?;
    captures.get(1).map(|m| m.as_str())
}
