//! Structured document - the patchable representation of a file's content

use crate::{DocModelError, Paragraph, ParagraphOrigin, Result};
use serde::{Deserialize, Serialize};

/// Separator placed between paragraphs when flattening a document
pub const PARAGRAPH_SEPARATOR: char = '\n';

/// An ordered sequence of paragraphs.
///
/// Traversal order is fixed: body paragraphs in source order first, then every
/// table in source order with its cells row-major (rows top to bottom, cells
/// left to right). Flattening, validation, matching and diffing all walk the
/// paragraphs in this order, so "first occurrence" always means first in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    paragraphs: Vec<Paragraph>,
}

impl StructuredDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from paragraphs already in traversal order
    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Create a document with one unformatted paragraph per line
    pub fn from_plain_text(text: &str) -> Self {
        let paragraphs = text
            .split(PARAGRAPH_SEPARATOR)
            .enumerate()
            .map(|(index, line)| {
                Paragraph::from_text(line).with_origin(ParagraphOrigin::Body { index })
            })
            .collect();
        Self { paragraphs }
    }

    /// Append a paragraph at the end of the traversal order
    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// The paragraphs, in traversal order
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Get a paragraph by traversal index
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    /// Get a mutable paragraph by traversal index
    pub fn paragraph_mut(&mut self, index: usize) -> Result<&mut Paragraph> {
        self.paragraphs
            .get_mut(index)
            .ok_or(DocModelError::ParagraphNotFound(index))
    }

    /// Number of paragraphs
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    /// Check if the document has no paragraphs
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Newline-joined flattened text of every paragraph, in traversal order
    pub fn flatten(&self) -> String {
        let mut text = String::new();
        for (i, para) in self.paragraphs.iter().enumerate() {
            if i > 0 {
                text.push(PARAGRAPH_SEPARATOR);
            }
            text.push_str(&para.flatten());
        }
        text
    }

    /// Total number of runs across all paragraphs
    pub fn run_count(&self) -> usize {
        self.paragraphs.iter().map(Paragraph::run_count).sum()
    }
}
