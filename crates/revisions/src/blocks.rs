//! Grouping a diff into context-bounded change blocks

use crate::{compute_diff, DiffError, DiffSettings, Result, Segment};
use serde::{Deserialize, Serialize};

/// Marker added where context was cut short
pub const ELLIPSIS: &str = "...";

/// Consecutive edits plus the unchanged text around them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBlock {
    /// Tail of the preceding unchanged text, `...`-prefixed when cut
    pub before: String,
    /// The edits, in diff order
    pub changes: Vec<Segment>,
    /// Head of the following unchanged text, `...`-suffixed when cut
    pub after: String,
}

impl ChangeBlock {
    /// Concatenated deleted text
    pub fn deleted_text(&self) -> String {
        self.edit_text(crate::DiffOp::Delete)
    }

    /// Concatenated inserted text
    pub fn inserted_text(&self) -> String {
        self.edit_text(crate::DiffOp::Insert)
    }

    fn edit_text(&self, op: crate::DiffOp) -> String {
        self.changes
            .iter()
            .filter(|s| s.op == op)
            .map(|s| s.text.as_str())
            .collect()
    }
}

/// Result of grouping a diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "blocks", rename_all = "snake_case")]
pub enum DiffRendering {
    /// Both texts are identical
    NoChanges,
    /// At least one edit, grouped in document order
    Changes(Vec<ChangeBlock>),
}

impl DiffRendering {
    /// The change blocks, empty when nothing changed
    pub fn blocks(&self) -> &[ChangeBlock] {
        match self {
            DiffRendering::NoChanges => &[],
            DiffRendering::Changes(blocks) => blocks,
        }
    }

    pub fn has_changes(&self) -> bool {
        matches!(self, DiffRendering::Changes(_))
    }
}

/// Diff stage output as handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffOutcome {
    Rendered { rendering: DiffRendering },
    /// The diff could not be computed; both texts are returned unrendered
    Unavailable {
        reason: String,
        original: String,
        optimized: String,
    },
}

/// Group consecutive edits into blocks with up to `context_chars` characters
/// of unchanged text on each side
pub fn group_changes(segments: &[Segment], context_chars: usize) -> DiffRendering {
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < segments.len() {
        if !segments[i].is_edit() {
            i += 1;
            continue;
        }

        let before = match i.checked_sub(1).map(|p| &segments[p]) {
            Some(prev) if !prev.is_edit() => tail_context(&prev.text, context_chars),
            _ => String::new(),
        };

        let mut changes = Vec::new();
        while i < segments.len() && segments[i].is_edit() {
            changes.push(segments[i].clone());
            i += 1;
        }

        let after = match segments.get(i) {
            Some(next) => head_context(&next.text, context_chars),
            None => String::new(),
        };

        blocks.push(ChangeBlock { before, changes, after });
    }

    if blocks.is_empty() {
        DiffRendering::NoChanges
    } else {
        DiffRendering::Changes(blocks)
    }
}

/// Diff two texts and group the result
pub fn render_diff(original: &str, optimized: &str, settings: &DiffSettings) -> DiffRendering {
    let segments = compute_diff(original, optimized, settings);
    let rendering = group_changes(&segments, settings.context_chars);
    tracing::debug!("Diff produced {} change block(s)", rendering.blocks().len());
    rendering
}

/// Diff two byte buffers that should hold UTF-8 text
pub fn render_bytes(original: &[u8], optimized: &[u8], settings: &DiffSettings) -> Result<DiffRendering> {
    let original = std::str::from_utf8(original)
        .map_err(|source| DiffError::NonText { side: "original", source })?;
    let optimized = std::str::from_utf8(optimized)
        .map_err(|source| DiffError::NonText { side: "optimized", source })?;
    Ok(render_diff(original, optimized, settings))
}

/// Diff two byte buffers, falling back to the unrendered texts on failure
pub fn diff_outcome(original: &[u8], optimized: &[u8], settings: &DiffSettings) -> DiffOutcome {
    match render_bytes(original, optimized, settings) {
        Ok(rendering) => DiffOutcome::Rendered { rendering },
        Err(e) => {
            tracing::warn!("{}", e);
            DiffOutcome::Unavailable {
                reason: e.to_string(),
                original: String::from_utf8_lossy(original).into_owned(),
                optimized: String::from_utf8_lossy(optimized).into_owned(),
            }
        }
    }
}

fn tail_context(text: &str, limit: usize) -> String {
    let count = text.chars().count();
    if count <= limit {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - limit).collect();
    format!("{}{}", ELLIPSIS, tail)
}

fn head_context(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let head: String = text.chars().take(limit).collect();
    format!("{}{}", head, ELLIPSIS)
}
