//! Revision Diffing - What changed between two flattened texts
//!
//! This crate computes a character-level diff between the original and the
//! patched text of a document, cleans it up so edits line up with words, and
//! groups it into context-bounded change blocks:
//! - Myers diff over characters, then merge and semantic cleanup passes
//! - Change blocks with up to N characters of context on either side
//! - An explicit "no changes" marker instead of an empty block list
//! - HTML rendering with escaped text for before/after review

mod blocks;
mod diff;
mod error;
mod html;

pub use blocks::*;
pub use diff::*;
pub use error::*;
pub use html::*;
