//! Change proposals and validated changes

use serde::{Deserialize, Serialize};

/// An externally produced candidate edit. Untrusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeProposal {
    /// Text expected to exist in the document
    pub find: String,
    /// Text to put in its place
    pub replace: String,
    /// Free-text justification from the provider
    #[serde(default)]
    pub reason: String,
}

impl ChangeProposal {
    /// Create a new proposal
    pub fn new(find: impl Into<String>, replace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
            reason: reason.into(),
        }
    }
}

/// A proposal that passed the existence and length-ratio checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedChange {
    /// Text to locate in the document
    pub find: String,
    /// Replacement text, possibly truncated by the validator
    pub replace: String,
    /// Reason carried over from the proposal
    pub reason: String,
    /// Whether the validator truncated `replace`
    #[serde(default)]
    pub truncated: bool,
}

impl ValidatedChange {
    /// Create a validated change directly, bypassing the validator
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
            reason: String::new(),
            truncated: false,
        }
    }

    /// Length of `find` in characters
    pub fn find_chars(&self) -> usize {
        self.find.chars().count()
    }

    /// Length of `replace` in characters
    pub fn replace_chars(&self) -> usize {
        self.replace.chars().count()
    }

    /// How many characters longer the replacement is than the find text
    pub fn growth(&self) -> isize {
        self.replace_chars() as isize - self.find_chars() as isize
    }
}

/// Shorten text for log lines
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
