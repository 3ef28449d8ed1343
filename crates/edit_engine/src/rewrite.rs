//! Run-level rewriting of a matched span
//!
//! A span inside one run is spliced in place. A span crossing runs is folded
//! into the first overlapping run: it receives the text before the span, the
//! replacement, and whatever followed the span in the last overlapping run;
//! every other overlapping run is emptied. Run boundaries inside the span are
//! lost and the merged text takes the first run's formatting. Runs outside
//! the span are never touched.

use crate::{EditError, Result};
use doc_model::{Paragraph, Run, RunSpan};

/// Replace the byte range `[start, end)` of a paragraph's flattened text.
///
/// After rewriting, the paragraph's flattened text is checked against the
/// expected result. On mismatch the paragraph is restored and
/// [`EditError::StructuralInvariantViolation`] is returned.
pub fn rewrite_span(
    para: &mut Paragraph,
    paragraph: usize,
    start: usize,
    end: usize,
    replacement: &str,
) -> Result<()> {
    let before = para.flatten();
    if start > end
        || end > before.len()
        || !before.is_char_boundary(start)
        || !before.is_char_boundary(end)
    {
        return Err(EditError::InvalidSpan { paragraph, start, end });
    }

    let expected = format!("{}{}{}", &before[..start], replacement, &before[end..]);
    let snapshot = para.clone();

    let result = splice_runs(para, paragraph, start, end, replacement)
        .and_then(|_| check_invariant(para, paragraph, &expected));
    if result.is_err() {
        *para = snapshot;
    }
    result
}

/// Verify that a paragraph flattens to `expected`
pub fn check_invariant(para: &Paragraph, paragraph: usize, expected: &str) -> Result<()> {
    let found = para.flatten();
    if found == expected {
        Ok(())
    } else {
        tracing::warn!("Flatten invariant broken in paragraph {}", paragraph);
        Err(EditError::StructuralInvariantViolation {
            paragraph,
            expected: expected.to_string(),
            found,
        })
    }
}

fn splice_runs(
    para: &mut Paragraph,
    paragraph: usize,
    start: usize,
    end: usize,
    replacement: &str,
) -> Result<()> {
    if para.run_count() == 0 {
        para.push_run(Run::new(replacement));
        return Ok(());
    }

    let mut affected = para.spans_overlapping(start, end);
    if affected.is_empty() {
        // Zero-width span: insert into the run that ends at or contains it
        affected = para
            .run_spans()
            .into_iter()
            .filter(|span| span.start <= start && start <= span.end)
            .take(1)
            .collect();
    }

    let (first, last) = match (affected.first(), affected.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(EditError::InvalidSpan { paragraph, start, end }),
    };

    if first.index == last.index {
        splice_single(para, paragraph, first, start, end, replacement)
    } else {
        let prefix = para.runs()[first.index].text()[..start - first.start].to_string();
        let suffix = para.runs()[last.index].text()[end - last.start..].to_string();

        para.try_run_mut(paragraph, first.index)?
            .set_text(format!("{}{}{}", prefix, replacement, suffix));
        for span in &affected[1..] {
            para.try_run_mut(paragraph, span.index)?.clear();
        }
        Ok(())
    }
}

fn splice_single(
    para: &mut Paragraph,
    paragraph: usize,
    span: RunSpan,
    start: usize,
    end: usize,
    replacement: &str,
) -> Result<()> {
    let run = para.try_run_mut(paragraph, span.index)?;
    let local_start = start - span.start;
    let local_end = end - span.start;

    let text = run.text();
    let new_text = format!("{}{}{}", &text[..local_start], replacement, &text[local_end..]);
    run.set_text(new_text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::RunFormatting;

    fn bold() -> RunFormatting {
        RunFormatting::default().bold(true)
    }

    fn italic() -> RunFormatting {
        RunFormatting::default().italic(true)
    }

    #[test]
    fn test_single_run_splice() {
        let mut para = Paragraph::with_runs(vec![Run::with_formatting(
            "• Built data workflows for reporting.",
            bold(),
        )]);
        let text = para.flatten();
        let start = text.find("Built data workflows").unwrap();
        let end = start + "Built data workflows".len();

        rewrite_span(&mut para, 0, start, end, "Built data pipelines").unwrap();

        assert_eq!(para.runs()[0].text(), "• Built data pipelines for reporting.");
        assert_eq!(para.runs()[0].formatting(), &bold());
    }

    #[test]
    fn test_span_inside_middle_run_leaves_neighbors() {
        let mut para = Paragraph::with_runs(vec![
            Run::with_formatting("Lead: ", bold()),
            Run::new("Managed cloud resources"),
            Run::with_formatting(" (2019-2023)", italic()),
        ]);
        let start = "Lead: Managed ".len();
        let end = start + "cloud resources".len();

        rewrite_span(&mut para, 0, start, end, "AWS infrastructure").unwrap();

        assert_eq!(para.runs()[0].text(), "Lead: ");
        assert_eq!(para.runs()[1].text(), "Managed AWS infrastructure");
        assert_eq!(para.runs()[2].text(), " (2019-2023)");
        assert_eq!(para.runs()[2].formatting(), &italic());
    }

    #[test]
    fn test_multi_run_span_folds_into_first_run() {
        let mut para = Paragraph::with_runs(vec![
            Run::with_formatting("Worked with ", bold()),
            Run::with_formatting("cross-functional", italic()),
            Run::new(" teams daily"),
            Run::with_formatting(" [untouched]", italic()),
        ]);
        let text = para.flatten();
        let start = text.find("with cross").unwrap();
        let end = text.find(" daily").unwrap();

        rewrite_span(&mut para, 0, start, end, "alongside partner").unwrap();

        assert_eq!(para.runs()[0].text(), "Worked alongside partner daily");
        assert_eq!(para.runs()[0].formatting(), &bold());
        assert_eq!(para.runs()[1].text(), "");
        assert_eq!(para.runs()[2].text(), "");
        assert_eq!(para.runs()[3].text(), " [untouched]");
        assert_eq!(para.run_count(), 4);
        assert_eq!(para.flatten(), "Worked alongside partner daily [untouched]");
    }

    #[test]
    fn test_span_covering_whole_runs() {
        let mut para = Paragraph::with_runs(vec![Run::new("Skills: "), Run::new("Python")]);
        let len = para.flatten().len();
        rewrite_span(&mut para, 0, 0, len, "Skills: Rust").unwrap();

        assert_eq!(para.runs()[0].text(), "Skills: Rust");
        assert!(para.runs()[1].is_empty());
    }

    #[test]
    fn test_invalid_span_is_rejected_without_change() {
        let mut para = Paragraph::from_text("• bullet");
        let original = para.clone();

        // byte 1 is inside the three-byte bullet glyph
        let err = rewrite_span(&mut para, 2, 1, 3, "x").unwrap_err();
        assert!(matches!(err, EditError::InvalidSpan { paragraph: 2, .. }));
        assert_eq!(para, original);

        assert!(rewrite_span(&mut para, 2, 0, 99, "x").is_err());
        assert_eq!(para, original);
    }

    #[test]
    fn test_empty_paragraph_receives_run() {
        let mut para = Paragraph::new();
        rewrite_span(&mut para, 0, 0, 0, "inserted").unwrap();
        assert_eq!(para.flatten(), "inserted");
    }

    #[test]
    fn test_check_invariant_reports_mismatch() {
        let para = Paragraph::from_text("actual");
        let err = check_invariant(&para, 5, "expected").unwrap_err();

        match err {
            EditError::StructuralInvariantViolation { paragraph, expected, found } => {
                assert_eq!(paragraph, 5);
                assert_eq!(expected, "expected");
                assert_eq!(found, "actual");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
