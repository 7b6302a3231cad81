//! PDF text-layer extraction.
//!
//! Scanned PDFs have no text layer; their pages come back as empty strings,
//! which the parser then treats as a bank with no units. Pages lopdf cannot
//! decode are skipped with a warning, and a document where every page fails
//! is an extraction error.

use crate::error::{PaperGenError, Result};
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

/// Turns a binary document into plain text.
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<String>;

    fn name(&self) -> &str;
}

/// Extracts per-page text with `lopdf`, pages joined by newlines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_from_bytes(&self, bytes: &[u8]) -> Result<String> {
        let doc = Document::load_mem(bytes).map_err(|e| PaperGenError::Extraction {
            path: "<memory>".to_string(),
            message: e.to_string(),
        })?;
        Self::join_pages(&doc, "<memory>")
    }

    fn join_pages(doc: &Document, source: &str) -> Result<String> {
        // get_pages() is keyed by page number, so iteration is already in reading order
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        debug!(pages = pages.len(), "extracting PDF text layer");

        let mut texts = Vec::with_capacity(pages.len());
        let mut last_error = None;
        for page in &pages {
            match doc.extract_text(&[*page]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!(page = *page, error = %e, "skipping page without readable text");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if texts.is_empty() => Err(PaperGenError::Extraction {
                path: source.to_string(),
                message: format!("no page could be decoded ({})", e),
            }),
            _ => Ok(texts.join("\n")),
        }
    }
}

impl TextExtractor for LopdfExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let doc = Document::load(path).map_err(|e| PaperGenError::Extraction {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::join_pages(&doc, &path.display().to_string())
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::paper::{Block, PdfRenderer};
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream, StringFormat};
    use tempfile::TempDir;

    fn show_text(text: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Tj", vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ]
    }

    // "Tf" without a font name makes lopdf's text extraction fail for the page.
    fn broken_font_selection() -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![]),
            Operation::new("ET", vec![]),
        ]
    }

    fn pdf_with_pages(pages: Vec<Vec<Operation>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in pages {
            let encoded = Content { operations }.encode().unwrap();
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_extracts_text_from_rendered_pdf() {
        let renderer = PdfRenderer::new(LayoutConfig::default());
        let blocks = vec![
            Block::Title("Physics - Question Paper".to_string()),
            Block::Question {
                number: 1,
                text: "What is inertia?".to_string(),
            },
        ];
        let bytes = renderer.render_blocks(&blocks).unwrap();

        let text = LopdfExtractor::new().extract_from_bytes(&bytes).unwrap();
        assert!(text.contains("What is inertia?"));
    }

    #[test]
    fn test_garbage_is_an_extraction_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let result = LopdfExtractor::new().extract(&path);
        assert!(matches!(result, Err(PaperGenError::Extraction { .. })));
    }

    #[test]
    fn test_undecodable_pages_are_skipped() {
        let bytes = pdf_with_pages(vec![show_text("Unit I - Basics"), broken_font_selection()]);

        let text = LopdfExtractor::new().extract_from_bytes(&bytes).unwrap();
        assert!(text.contains("Unit I - Basics"));
    }

    #[test]
    fn test_every_page_failing_is_an_extraction_error() {
        let bytes = pdf_with_pages(vec![broken_font_selection(), broken_font_selection()]);

        let result = LopdfExtractor::new().extract_from_bytes(&bytes);
        assert!(matches!(result, Err(PaperGenError::Extraction { .. })));
    }
}
