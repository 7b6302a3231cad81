pub mod bundler;
pub mod output_manager;

pub use bundler::{ArchiveBuilder, DEFAULT_ARCHIVE_NAME};
pub use output_manager::{run_directory, sanitize_name, GenerationReport, OutputManager, RunSummary, UnitSummary};
