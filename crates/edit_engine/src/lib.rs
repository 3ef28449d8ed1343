//! Edit Engine - Change proposal validation and structured patching
//!
//! This crate takes untrusted `{find, replace, reason}` proposals, checks them
//! against the document's flattened text, and applies the survivors to the
//! run structure of a [`doc_model::StructuredDocument`] while keeping
//! untouched formatting intact.

mod bullet;
mod error;
mod find_replace;
mod patch;
mod proposal;
mod response;
mod rewrite;
mod validator;

pub use bullet::*;
pub use error::*;
pub use find_replace::*;
pub use patch::*;
pub use proposal::*;
pub use response::*;
pub use rewrite::*;
pub use validator::*;
