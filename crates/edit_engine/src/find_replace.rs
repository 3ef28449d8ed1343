//! Locating change targets inside a structured document
//!
//! Two strategies, tried in order by the patch engine:
//! - exact: the first verbatim occurrence of `find` in each paragraph
//! - normalized: whitespace-collapsed, case-insensitive comparison, followed
//!   by a flexible-whitespace pattern search to recover the real span in the
//!   paragraph's original text

use crate::Result;
use doc_model::StructuredDocument;
use regex_lite::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Whitespace accepted between words of a flexible pattern. `\s` only covers
/// ASCII in regex-lite, so the common Unicode spaces are listed explicitly.
const FLEXIBLE_WHITESPACE: &str =
    r"[\s\x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}]+";

/// How a match was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Normalized,
}

/// A located span within one paragraph's flattened text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    /// Traversal index of the paragraph
    pub paragraph: usize,
    /// Start offset (UTF-8 bytes)
    pub start: usize,
    /// End offset (UTF-8 bytes, exclusive)
    pub end: usize,
    /// The text actually matched in the document
    pub matched_text: String,
    pub kind: MatchKind,
}

/// Collapse every whitespace run to a single space, trim, and lower-case
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Build a case-insensitive pattern matching the words of `text` separated by
/// any non-empty whitespace. Every word is escaped literally.
///
/// Returns `None` when `text` has no words.
pub fn flexible_pattern(text: &str) -> Result<Option<Regex>> {
    let words: Vec<String> = text.split_whitespace().map(regex_lite::escape).collect();
    if words.is_empty() {
        return Ok(None);
    }

    let pattern = words.join(FLEXIBLE_WHITESPACE);
    let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
    Ok(Some(regex))
}

/// Find engine for locating change targets
pub struct FindEngine<'a> {
    doc: &'a StructuredDocument,
}

impl<'a> FindEngine<'a> {
    /// Create a new find engine for a document
    pub fn new(doc: &'a StructuredDocument) -> Self {
        Self { doc }
    }

    /// First exact occurrence of `find` in every paragraph that contains it
    pub fn find_exact(&self, find: &str) -> Vec<TextMatch> {
        if find.is_empty() {
            return Vec::new();
        }

        self.doc
            .paragraphs()
            .iter()
            .enumerate()
            .filter_map(|(paragraph, para)| {
                let text = para.flatten();
                text.find(find).map(|start| TextMatch {
                    paragraph,
                    start,
                    end: start + find.len(),
                    matched_text: find.to_string(),
                    kind: MatchKind::Exact,
                })
            })
            .collect()
    }

    /// Whitespace- and case-insensitive occurrences of `find`, one per
    /// paragraph, reported as spans of the paragraph's original text
    pub fn find_normalized(&self, find: &str) -> Result<Vec<TextMatch>> {
        let find_norm = normalize_whitespace(find);
        let Some(pattern) = flexible_pattern(find)? else {
            return Ok(Vec::new());
        };

        let mut matches = Vec::new();
        for (paragraph, para) in self.doc.paragraphs().iter().enumerate() {
            let text = para.flatten();
            if !normalize_whitespace(&text).contains(&find_norm) {
                continue;
            }

            match pattern.find(&text) {
                Some(m) => matches.push(TextMatch {
                    paragraph,
                    start: m.start(),
                    end: m.end(),
                    matched_text: m.as_str().to_string(),
                    kind: MatchKind::Normalized,
                }),
                None => tracing::debug!(
                    "Paragraph {} matches after normalization but not by pattern",
                    paragraph
                ),
            }
        }
        Ok(matches)
    }
}
