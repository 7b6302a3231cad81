pub mod assembler;
pub mod document;
pub mod render;

pub use assembler::PaperAssembler;
pub use document::{AssembledPaper, Block};
pub use render::{encode_win_ansi, wrap_text, PdfRenderer};
