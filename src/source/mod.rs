pub mod loader;
pub mod pdf_text;

pub use loader::{load_bank_text, SourceDocument, SourceKind};
pub use pdf_text::{LopdfExtractor, TextExtractor};
