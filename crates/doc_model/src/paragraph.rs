//! Paragraph - an ordered sequence of runs plus a style label

use crate::{DocModelError, Result, Run};
use serde::{Deserialize, Serialize};

/// Where a paragraph came from in the source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParagraphOrigin {
    /// A body paragraph, indexed in source order
    Body { index: usize },
    /// A table cell, addressed row-major within its table
    TableCell {
        table: usize,
        row: usize,
        column: usize,
    },
    /// A line of a text-only page
    PageLine { page: usize, line: usize },
}

impl Default for ParagraphOrigin {
    fn default() -> Self {
        ParagraphOrigin::Body { index: 0 }
    }
}

/// Byte range a run occupies within its paragraph's flattened text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSpan {
    /// Index of the run within the paragraph
    pub index: usize,
    /// Start offset (inclusive, UTF-8 bytes)
    pub start: usize,
    /// End offset (exclusive, UTF-8 bytes)
    pub end: usize,
}

impl RunSpan {
    /// Check if this run overlaps the half-open range `[start, end)`
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end > start
    }
}

/// A paragraph containing text runs
///
/// The flattened text of a paragraph is always the in-order concatenation of
/// its run texts; it is derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    runs: Vec<Run>,
    /// Style label (e.g. "Heading 1", "List Bullet")
    #[serde(default)]
    pub style: Option<String>,
    /// Source location of this paragraph
    #[serde(default)]
    pub origin: ParagraphOrigin,
}

impl Paragraph {
    /// Create a new empty paragraph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph from runs
    pub fn with_runs(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }

    /// Create a paragraph holding a single unformatted run
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::with_runs(vec![Run::new(text)])
    }

    /// Builder method to set the style label
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Builder method to set the origin
    pub fn with_origin(mut self, origin: ParagraphOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Append a run
    pub fn push_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// The runs of this paragraph, in order
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Get a mutable reference to a run
    pub fn run_mut(&mut self, index: usize) -> Option<&mut Run> {
        self.runs.get_mut(index)
    }

    /// Get a mutable reference to a run, or an error naming the paragraph
    pub fn try_run_mut(&mut self, paragraph: usize, index: usize) -> Result<&mut Run> {
        self.runs
            .get_mut(index)
            .ok_or(DocModelError::RunNotFound { paragraph, run: index })
    }

    /// Number of runs
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Concatenate run texts in order
    pub fn flatten(&self) -> String {
        let mut text = String::with_capacity(self.runs.iter().map(Run::len).sum());
        for run in &self.runs {
            text.push_str(run.text());
        }
        text
    }

    /// Cumulative byte offsets of every run within the flattened text
    pub fn run_spans(&self) -> Vec<RunSpan> {
        let mut spans = Vec::with_capacity(self.runs.len());
        let mut pos = 0;
        for (index, run) in self.runs.iter().enumerate() {
            spans.push(RunSpan {
                index,
                start: pos,
                end: pos + run.len(),
            });
            pos += run.len();
        }
        spans
    }

    /// Runs overlapping the half-open byte range `[start, end)`
    pub fn spans_overlapping(&self, start: usize, end: usize) -> Vec<RunSpan> {
        self.run_spans()
            .into_iter()
            .filter(|span| span.overlaps(start, end))
            .collect()
    }

    /// Check if the paragraph has no text
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(Run::is_empty)
    }
}
