//! Document Model - Paragraphs of formatted runs
//!
//! This crate provides the structured representation every other stage of the
//! patch pipeline reads and mutates: a document is an ordered list of
//! paragraphs, each paragraph an ordered list of independently formatted runs.
//! Table cells are flattened into extra paragraphs after the body.

mod document;
mod error;
mod extraction;
mod paragraph;
mod run;

pub use document::*;
pub use error::*;
pub use extraction::*;
pub use paragraph::*;
pub use run::*;
