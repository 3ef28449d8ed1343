//! Error types for pipeline operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
