//! HTML rendering of change blocks for side-by-side review

use crate::{DiffOp, DiffRendering};

/// Message shown when the two texts are identical
pub const NO_CHANGES_MESSAGE: &str =
    "No text changes detected. The content may have been restructured or rephrased.";

/// Escape `&`, `<` and `>` and turn newlines into `<br>`
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a diff as an HTML fragment.
///
/// Each block becomes a numbered `change-block` with context spans around
/// `diff-removed` and `diff-added` spans.
pub fn render_html(rendering: &DiffRendering) -> String {
    let blocks = match rendering {
        DiffRendering::NoChanges => {
            return format!("<p class=\"no-changes\">{}</p>", NO_CHANGES_MESSAGE);
        }
        DiffRendering::Changes(blocks) => blocks,
    };

    let mut html = format!(
        "<p class=\"change-count\">Found <strong>{}</strong> change(s):</p>",
        blocks.len()
    );

    for (idx, block) in blocks.iter().enumerate() {
        html.push_str("<div class=\"change-block\">");
        html.push_str(&format!("<div class=\"change-number\">Change {}</div>", idx + 1));
        html.push_str("<div class=\"change-content\">");

        if !block.before.is_empty() {
            push_span(&mut html, "diff-context", &block.before);
        }
        for segment in &block.changes {
            match segment.op {
                DiffOp::Delete => push_span(&mut html, "diff-removed", &segment.text),
                DiffOp::Insert => push_span(&mut html, "diff-added", &segment.text),
                DiffOp::Equal => {}
            }
        }
        if !block.after.is_empty() {
            push_span(&mut html, "diff-context", &block.after);
        }

        html.push_str("</div></div>");
    }

    html
}

fn push_span(html: &mut String, class: &str, text: &str) {
    html.push_str(&format!("<span class=\"{}\">{}</span>", class, escape_html(text)));
}
