//! Error types for editing operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    #[error("Structural invariant violated in paragraph {paragraph}: expected {expected:?}, found {found:?}")]
    StructuralInvariantViolation {
        paragraph: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid match span {start}..{end} in paragraph {paragraph}")]
    InvalidSpan {
        paragraph: usize,
        start: usize,
        end: usize,
    },

    #[error("Invalid match pattern: {0}")]
    Pattern(#[from] regex_lite::Error),
}

pub type Result<T> = std::result::Result<T, EditError>;
