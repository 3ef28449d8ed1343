//! Error types for diff computation

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("Unable to compute diff: {side} text is not valid UTF-8")]
    NonText {
        side: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },
}

pub type Result<T> = std::result::Result<T, DiffError>;
