//! Text run - a contiguous span of text with one formatting attribute set

use serde::{Deserialize, Serialize};

/// Character formatting carried by a run.
///
/// Every attribute is optional; `None` means the value is inherited from the
/// paragraph or document defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunFormatting {
    /// Bold override
    #[serde(default)]
    pub bold: Option<bool>,
    /// Italic override
    #[serde(default)]
    pub italic: Option<bool>,
    /// Underline override
    #[serde(default)]
    pub underline: Option<bool>,
    /// Font family override
    #[serde(default)]
    pub font_name: Option<String>,
    /// Font size in points override
    #[serde(default)]
    pub font_size: Option<f32>,
}

impl RunFormatting {
    /// Check if no attribute is set
    pub fn is_empty(&self) -> bool {
        self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.font_name.is_none()
            && self.font_size.is_none()
    }

    /// Builder method to set bold
    pub fn bold(mut self, value: bool) -> Self {
        self.bold = Some(value);
        self
    }

    /// Builder method to set italic
    pub fn italic(mut self, value: bool) -> Self {
        self.italic = Some(value);
        self
    }

    /// Builder method to set underline
    pub fn underline(mut self, value: bool) -> Self {
        self.underline = Some(value);
        self
    }

    /// Builder method to set the font family
    pub fn font(mut self, name: impl Into<String>, size: f32) -> Self {
        self.font_name = Some(name.into());
        self.font_size = Some(size);
        self
    }
}

/// A text run - contiguous text with consistent formatting
///
/// The formatting of a run is fixed once the run is built. Patching may only
/// rewrite the text through [`Run::set_text`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    text: String,
    #[serde(default)]
    formatting: RunFormatting,
}

impl Run {
    /// Create a new unformatted run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            formatting: RunFormatting::default(),
        }
    }

    /// Create a new run with formatting
    pub fn with_formatting(text: impl Into<String>, formatting: RunFormatting) -> Self {
        Self {
            text: text.into(),
            formatting,
        }
    }

    /// The text content of this run
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The formatting of this run
    pub fn formatting(&self) -> &RunFormatting {
        &self.formatting
    }

    /// Replace the text content, leaving formatting untouched
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Clear the text content, leaving an empty run in place
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Get the length of the text in this run (in UTF-8 bytes)
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if this run is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_text_keeps_formatting() {
        let formatting = RunFormatting::default().bold(true).font("Calibri", 11.0);
        let mut run = Run::with_formatting("Built data workflows", formatting.clone());

        run.set_text("Built data pipelines");

        assert_eq!(run.text(), "Built data pipelines");
        assert_eq!(run.formatting(), &formatting);
    }

    #[test]
    fn test_clear() {
        let mut run = Run::with_formatting("tail", RunFormatting::default().italic(true));
        run.clear();

        assert!(run.is_empty());
        assert_eq!(run.formatting().italic, Some(true));
    }

    #[test]
    fn test_formatting_is_empty() {
        assert!(RunFormatting::default().is_empty());
        assert!(!RunFormatting::default().underline(false).is_empty());
    }
}
