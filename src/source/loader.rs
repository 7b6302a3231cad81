use super::pdf_text::TextExtractor;
use crate::error::{PaperGenError, Result};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    PlainText,
    Pdf,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("pdf") => SourceKind::Pdf,
            _ => SourceKind::PlainText,
        }
    }
}

/// Raw text of a question bank plus where it came from.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub kind: SourceKind,
    pub text: String,
}

/// Read a question bank as text, running PDFs through `extractor`.
pub fn load_bank_text(path: &Path, extractor: &dyn TextExtractor) -> Result<SourceDocument> {
    if !path.is_file() {
        return Err(PaperGenError::InputNotFound {
            path: path.display().to_string(),
        });
    }

    let kind = SourceKind::from_path(path);
    let text = match kind {
        SourceKind::Pdf => extractor.extract(path)?,
        SourceKind::PlainText => {
            let bytes = std::fs::read(path)?;
            String::from_utf8(bytes).map_err(|_| PaperGenError::InvalidEncoding {
                path: path.display().to_string(),
            })?
        }
    };

    info!(
        path = %path.display(),
        kind = ?kind,
        extractor = extractor.name(),
        chars = text.chars().count(),
        "loaded question bank"
    );

    Ok(SourceDocument { kind, text })
}
