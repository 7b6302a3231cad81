use crate::error::{PaperGenError, Result};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const DEFAULT_ARCHIVE_NAME: &str = "Question_Papers.zip";

/// Packs rendered papers into one compressed archive.
pub struct ArchiveBuilder {
    dest_dir: PathBuf,
    archive_name: String,
}

impl ArchiveBuilder {
    pub fn new<P: Into<PathBuf>>(dest_dir: P) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }

    pub fn with_archive_name<S: Into<String>>(mut self, name: S) -> Self {
        self.archive_name = name.into();
        self
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dest_dir.join(&self.archive_name)
    }

    /// Write every file in `papers` under its base name and return the
    /// archive path. Entries keep the order given.
    pub fn bundle(&self, papers: &[PathBuf]) -> Result<PathBuf> {
        let archive_path = self.archive_path();
        let file = File::create(&archive_path)?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for paper in papers {
            let entry_name = entry_name(paper)?;
            let mut source = BufReader::new(File::open(paper)?);
            writer.start_file(entry_name, options)?;
            io::copy(&mut source, &mut writer)?;
        }

        writer.finish()?;
        info!(
            archive = %archive_path.display(),
            entries = papers.len(),
            "archive written"
        );
        Ok(archive_path)
    }
}

fn entry_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| PaperGenError::InvalidInput {
            message: format!("{} has no file name", path.display()),
        })
}
