//! Error types for document model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Paragraph not found: {0}")]
    ParagraphNotFound(usize),

    #[error("Run not found: paragraph {paragraph}, run {run}")]
    RunNotFound { paragraph: usize, run: usize },

    #[error("Malformed extraction input: {0}")]
    MalformedInput(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
