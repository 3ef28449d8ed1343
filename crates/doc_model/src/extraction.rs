//! Extraction input - building a document from the extractor's output
//!
//! The extractor (outside this workspace) reads the source file and emits a
//! JSON description of it. Word documents arrive as body paragraphs with run
//! formatting plus tables as grids of cell text. PDFs arrive as pages of plain
//! text. This module turns either payload into a [`StructuredDocument`] in the
//! documented traversal order.

use crate::{DocModelError, Paragraph, ParagraphOrigin, Result, Run, RunFormatting, StructuredDocument};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Source formats the extractor reports
pub const SUPPORTED_SOURCE_TYPES: &[&str] = &["docx", "pdf"];

/// English Metric Units per typographic point
const EMU_PER_POINT: f64 = 12_700.0;

/// A run as reported by the extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedRun {
    pub text: String,
    #[serde(default)]
    pub bold: Option<bool>,
    #[serde(default)]
    pub italic: Option<bool>,
    #[serde(default)]
    pub underline: Option<bool>,
    #[serde(default)]
    pub font_name: Option<String>,
    /// Size in points; the extractor may also send a length string in EMU
    #[serde(default, deserialize_with = "deserialize_font_size")]
    pub font_size: Option<f32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FontSize {
    Points(f32),
    Emu(String),
}

fn deserialize_font_size<'de, D>(deserializer: D) -> std::result::Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FontSize>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FontSize::Points(points)) => Ok(Some(points)),
        Some(FontSize::Emu(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(|emu| Some((emu / EMU_PER_POINT) as f32))
                .map_err(|_| de::Error::custom(format!("invalid font size '{}'", raw)))
        }
    }
}

/// A body paragraph as reported by the extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedParagraph {
    /// Plain paragraph text, used only when no runs are reported
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    pub runs: Vec<ExtractedRun>,
}

/// A table as a grid of cell texts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub data: Vec<Vec<String>>,
}

/// One page of a text-only source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPage {
    #[serde(default)]
    pub index: Option<usize>,
    pub text: String,
}

/// Full extractor payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Source format tag ("docx" or "pdf")
    #[serde(rename = "type", default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub paragraphs: Vec<ExtractedParagraph>,
    #[serde(default)]
    pub tables: Vec<ExtractedTable>,
    #[serde(default)]
    pub pages: Vec<ExtractedPage>,
    /// Page count as reported; pages are read from `pages`
    #[serde(default)]
    pub total_pages: Option<usize>,
}

impl From<ExtractedRun> for Run {
    fn from(run: ExtractedRun) -> Self {
        Run::with_formatting(
            run.text,
            RunFormatting {
                bold: run.bold,
                italic: run.italic,
                underline: run.underline,
                font_name: run.font_name,
                font_size: run.font_size,
            },
        )
    }
}

impl StructuredDocument {
    /// Build a document from a decoded extractor payload.
    ///
    /// Body paragraphs come first, then table cells, then page lines. Each
    /// line of a page becomes one unformatted paragraph, so a PDF document
    /// flattens to its pages joined by newlines.
    pub fn from_extraction(extracted: ExtractedDocument) -> Result<Self> {
        if let Some(source_type) = &extracted.source_type {
            if !SUPPORTED_SOURCE_TYPES.contains(&source_type.as_str()) {
                return Err(DocModelError::MalformedInput(format!(
                    "unsupported source type '{}'",
                    source_type
                )));
            }
        }

        let mut doc = StructuredDocument::new();

        for (index, para) in extracted.paragraphs.into_iter().enumerate() {
            let mut paragraph = if para.runs.is_empty() {
                // Runless paragraphs still carry their text as one plain run
                match para.text {
                    Some(text) => Paragraph::from_text(text),
                    None => Paragraph::new(),
                }
            } else {
                Paragraph::with_runs(para.runs.into_iter().map(Run::from).collect())
            };
            paragraph.style = para.style;
            paragraph.origin = ParagraphOrigin::Body { index };
            doc.push_paragraph(paragraph);
        }

        for (table, grid) in extracted.tables.into_iter().enumerate() {
            for (row, cells) in grid.data.into_iter().enumerate() {
                for (column, cell) in cells.into_iter().enumerate() {
                    doc.push_paragraph(
                        Paragraph::from_text(cell)
                            .with_origin(ParagraphOrigin::TableCell { table, row, column }),
                    );
                }
            }
        }

        for (position, page) in extracted.pages.into_iter().enumerate() {
            let page_index = page.index.unwrap_or(position);
            for (line, text) in page.text.split(crate::PARAGRAPH_SEPARATOR).enumerate() {
                doc.push_paragraph(
                    Paragraph::from_text(text)
                        .with_origin(ParagraphOrigin::PageLine { page: page_index, line }),
                );
            }
        }

        Ok(doc)
    }

    /// Decode and build a document from the extractor's JSON output
    pub fn from_extraction_json(json: &str) -> Result<Self> {
        let extracted: ExtractedDocument = serde_json::from_str(json)
            .map_err(|e| DocModelError::MalformedInput(format!("extraction payload: {}", e)))?;
        Self::from_extraction(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "docx",
        "paragraphs": [
            {
                "text": "EXPERIENCE",
                "style": "Heading 1",
                "runs": [{"text": "EXPERIENCE", "bold": true, "font_name": "Calibri", "font_size": 14.0}]
            },
            {
                "style": "List Bullet",
                "runs": [
                    {"text": "• Built data "},
                    {"text": "workflows", "italic": true},
                    {"text": " for reporting."}
                ]
            },
            {"text": "Plain line", "runs": []}
        ],
        "tables": [
            {"data": [["Python", "Java"], ["SQL", "Go"]]}
        ]
    }"#;

    #[test]
    fn test_from_extraction_json() {
        let doc = StructuredDocument::from_extraction_json(SAMPLE).unwrap();

        assert_eq!(doc.len(), 7);
        assert_eq!(
            doc.flatten(),
            "EXPERIENCE\n• Built data workflows for reporting.\nPlain line\nPython\nJava\nSQL\nGo"
        );

        let heading = doc.paragraph(0).unwrap();
        assert_eq!(heading.style.as_deref(), Some("Heading 1"));
        assert_eq!(heading.runs()[0].formatting().bold, Some(true));
        assert_eq!(heading.runs()[0].formatting().font_size, Some(14.0));

        let bullet = doc.paragraph(1).unwrap();
        assert_eq!(bullet.run_count(), 3);
        assert_eq!(bullet.runs()[1].formatting().italic, Some(true));
    }

    #[test]
    fn test_table_cells_are_row_major() {
        let doc = StructuredDocument::from_extraction_json(SAMPLE).unwrap();

        assert_eq!(
            doc.paragraph(4).map(|p| p.origin),
            Some(ParagraphOrigin::TableCell { table: 0, row: 0, column: 1 })
        );
        assert_eq!(
            doc.paragraph(5).map(|p| p.origin),
            Some(ParagraphOrigin::TableCell { table: 0, row: 1, column: 0 })
        );
    }

    #[test]
    fn test_runless_paragraph_keeps_text() {
        let doc = StructuredDocument::from_extraction_json(SAMPLE).unwrap();
        let plain = doc.paragraph(2).unwrap();

        assert_eq!(plain.run_count(), 1);
        assert!(plain.runs()[0].formatting().is_empty());
    }

    #[test]
    fn test_null_runs_is_malformed() {
        let json = r#"{"paragraphs": [{"text": "x", "runs": null}]}"#;
        let err = StructuredDocument::from_extraction_json(json).unwrap_err();
        assert!(matches!(err, DocModelError::MalformedInput(_)));
    }

    #[test]
    fn test_empty_payload() {
        let doc = StructuredDocument::from_extraction_json("{}").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.flatten(), "");
    }

    #[test]
    fn test_docx_payload_with_emu_font_size() {
        let json = r#"{
            "type": "docx",
            "paragraphs": [
                {
                    "index": 0,
                    "text": "JANE DOE",
                    "style": "Title",
                    "runs": [
                        {
                            "text": "JANE DOE",
                            "bold": true,
                            "italic": null,
                            "underline": null,
                            "font_name": "Calibri",
                            "font_size": "177800"
                        }
                    ]
                },
                {
                    "index": 1,
                    "text": "Skills: Python",
                    "style": "Normal",
                    "runs": [{"text": "Skills: Python", "bold": null, "italic": null, "underline": null, "font_name": null, "font_size": null}]
                }
            ],
            "tables": [{"index": 0, "data": [["Python", "Java"]]}],
            "sections": []
        }"#;
        let doc = StructuredDocument::from_extraction_json(json).unwrap();

        assert_eq!(doc.flatten(), "JANE DOE\nSkills: Python\nPython\nJava");
        let title = doc.paragraph(0).unwrap().runs()[0].formatting();
        assert_eq!(title.font_size, Some(14.0));
        assert_eq!(title.bold, Some(true));
        assert_eq!(title.italic, None);
        assert!(doc.paragraph(1).unwrap().runs()[0].formatting().is_empty());
    }

    #[test]
    fn test_garbled_font_size_is_malformed() {
        let json = r#"{"paragraphs": [{"runs": [{"text": "x", "font_size": "twelve"}]}]}"#;
        let err = StructuredDocument::from_extraction_json(json).unwrap_err();
        assert!(matches!(err, DocModelError::MalformedInput(_)));
    }

    #[test]
    fn test_pdf_pages_become_lines() {
        let json = r#"{
            "type": "pdf",
            "pages": [
                {"index": 0, "text": "JANE DOE\nBuilt data workflows for reporting."},
                {"index": 2, "text": "Skills: Python"}
            ],
            "total_pages": 3
        }"#;
        let doc = StructuredDocument::from_extraction_json(json).unwrap();

        assert_eq!(doc.len(), 3);
        assert_eq!(
            doc.flatten(),
            "JANE DOE\nBuilt data workflows for reporting.\nSkills: Python"
        );
        assert_eq!(
            doc.paragraph(1).map(|p| p.origin),
            Some(ParagraphOrigin::PageLine { page: 0, line: 1 })
        );
        assert_eq!(
            doc.paragraph(2).map(|p| p.origin),
            Some(ParagraphOrigin::PageLine { page: 2, line: 0 })
        );
        assert!(doc.paragraphs().iter().all(|p| p.run_count() == 1));
    }

    #[test]
    fn test_unsupported_source_type() {
        let json = r#"{"type": "rtf", "paragraphs": []}"#;
        let err = StructuredDocument::from_extraction_json(json).unwrap_err();
        match err {
            DocModelError::MalformedInput(message) => assert!(message.contains("rtf")),
            other => panic!("expected malformed input, got {:?}", other),
        }
    }
}
