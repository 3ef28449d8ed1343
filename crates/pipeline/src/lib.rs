//! Pipeline - Proposal validation, structured patching and diff rendering
//!
//! One request flows through three stages, strictly in sequence:
//! - validate untrusted proposals against a snapshot of the flattened text
//! - apply the surviving changes to the document's run structure
//! - diff the original and patched texts into reviewable change blocks
//!
//! Per-item failures are collected in the output; only malformed input or
//! unreadable settings surface as [`PipelineError`].

mod error;
mod output;
mod runner;
mod settings;

pub use error::*;
pub use output::*;
pub use runner::*;
pub use settings::*;
