//! Bullet marker preservation
//!
//! Proposals frequently drop the list marker from the replacement text. When
//! the matched text starts with a bullet glyph, the replacement gets the
//! original indentation and marker back.

/// Glyphs recognized as list markers
pub const BULLET_GLYPHS: [char; 11] = [
    '•', '‣', '⁃', '●', '○', '■', '□', '-', '–', '—', '*',
];

/// Leading indentation and marker of a bulleted line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulletPrefix<'a> {
    /// Whitespace before the marker
    pub indent: &'a str,
    pub glyph: char,
    /// Whether exactly one space follows the marker
    pub trailing_space: bool,
}

impl BulletPrefix<'_> {
    fn render(&self) -> String {
        let mut prefix = String::with_capacity(self.indent.len() + 5);
        prefix.push_str(self.indent);
        prefix.push(self.glyph);
        if self.trailing_space {
            prefix.push(' ');
        }
        prefix
    }
}

/// Check if text (after leading whitespace) starts with a bullet glyph
pub fn starts_with_bullet(text: &str) -> bool {
    text.trim_start()
        .chars()
        .next()
        .is_some_and(|c| BULLET_GLYPHS.contains(&c))
}

/// Extract the indentation and bullet marker that start `text`, if any
pub fn bullet_prefix(text: &str) -> Option<BulletPrefix<'_>> {
    let stripped = text.trim_start();
    let indent = &text[..text.len() - stripped.len()];
    let mut chars = stripped.chars();
    let glyph = chars.next().filter(|c| BULLET_GLYPHS.contains(c))?;

    Some(BulletPrefix {
        indent,
        glyph,
        trailing_space: chars.next() == Some(' '),
    })
}

/// Make `replacement` keep the bullet formatting of `original`.
///
/// - `original` has no marker: `replacement` is returned unchanged.
/// - `replacement` has no marker: the original indentation, marker and
///   following space are prepended.
/// - both have markers: the replacement's own marker is kept but re-indented
///   with the original indentation.
pub fn preserve_bullet(original: &str, replacement: &str) -> String {
    let Some(prefix) = bullet_prefix(original) else {
        return replacement.to_string();
    };

    let replacement_stripped = replacement.trim_start();
    if starts_with_bullet(replacement_stripped) {
        format!("{}{}", prefix.indent, replacement_stripped)
    } else {
        format!("{}{}", prefix.render(), replacement_stripped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinstates_bullet_and_space() {
        assert_eq!(
            preserve_bullet("• Led cross-functional initiatives", "Led initiatives"),
            "• Led initiatives"
        );
    }

    #[test]
    fn test_reinstates_indentation() {
        assert_eq!(
            preserve_bullet("    – Managed cloud resources", "  Managed AWS infrastructure"),
            "    – Managed AWS infrastructure"
        );
    }

    #[test]
    fn test_bullet_without_space() {
        assert_eq!(preserve_bullet("●Tight bullet text", "Loose text"), "●Loose text");
    }

    #[test]
    fn test_replacement_with_bullet_is_reindented() {
        assert_eq!(
            preserve_bullet("  • Built data workflows", "■ Built data pipelines"),
            "  ■ Built data pipelines"
        );
    }

    #[test]
    fn test_no_bullet_passthrough() {
        assert_eq!(
            preserve_bullet("Built data workflows", "  Built data pipelines"),
            "  Built data pipelines"
        );
    }

    #[test]
    fn test_bullet_prefix() {
        let prefix = bullet_prefix("\t* item").unwrap();
        assert_eq!(prefix.indent, "\t");
        assert_eq!(prefix.glyph, '*');
        assert!(prefix.trailing_space);

        assert!(bullet_prefix("plain").is_none());
        assert!(bullet_prefix("").is_none());
    }

    #[test]
    fn test_every_glyph_is_recognized() {
        for glyph in BULLET_GLYPHS {
            let original = format!("{} item text", glyph);
            assert_eq!(preserve_bullet(&original, "new"), format!("{} new", glyph));
        }
    }
}
