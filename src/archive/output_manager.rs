use crate::error::{PaperGenError, Result};
use crate::parser::{ParseReport, Section};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const METADATA_DIR: &str = ".papergen";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub subject: String,
    pub num_papers: u32,
    pub seed: Option<u64>,
    pub parser_strategy: Option<String>,
    pub units: Vec<UnitSummary>,
    pub dropped_units: Vec<String>,
    pub papers: Vec<String>,
    pub archive: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub title: String,
    pub section_a: usize,
    pub section_b: usize,
}

impl UnitSummary {
    pub fn from_report(report: &ParseReport) -> Vec<Self> {
        report
            .bank
            .iter()
            .map(|(title, sections)| Self {
                title: title.to_string(),
                section_a: sections.pool(Section::A).len(),
                section_b: sections.pool(Section::B).len(),
            })
            .collect()
    }
}

/// What went into one run, before the report is stamped.
pub struct RunSummary<'a> {
    pub subject: &'a str,
    pub seed: Option<u64>,
    pub parse: &'a ParseReport,
    pub papers: &'a [PathBuf],
    pub archive: &'a Path,
    pub duration: Duration,
}

/// Owns the directory a single run writes into.
pub struct OutputManager {
    base_path: PathBuf,
    output_directory: PathBuf,
    force_overwrite: bool,
    protected_input: Option<PathBuf>,
}

impl OutputManager {
    pub fn new(base_path: PathBuf, subject: &str) -> Result<Self> {
        let output_directory = run_directory(&base_path, subject);

        let manager = Self {
            base_path,
            output_directory,
            force_overwrite: false,
            protected_input: None,
        };

        manager.validate_paths()?;
        Ok(manager)
    }

    /// Use `directory` itself as the run directory.
    pub fn at(directory: PathBuf) -> Result<Self> {
        let base_path = match directory.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let manager = Self {
            base_path,
            output_directory: directory,
            force_overwrite: false,
            protected_input: None,
        };

        manager.validate_paths()?;
        Ok(manager)
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    /// A file the run reads from; `--force` never removes a directory holding it.
    pub fn with_protected_input<P: Into<PathBuf>>(mut self, input: P) -> Self {
        self.protected_input = Some(input.into());
        self
    }

    /// Create the run directory. An existing one is replaced only with
    /// `--force`, and only if it is empty or an earlier run wrote it.
    pub fn initialize(&self) -> Result<()> {
        if self.output_directory.exists() {
            if !self.force_overwrite {
                return Err(PaperGenError::OutputDirectoryExists {
                    path: self.output_directory.display().to_string(),
                });
            }
            self.check_safe_to_replace()?;
            fs::remove_dir_all(&self.output_directory)?;
        }

        fs::create_dir_all(self.get_metadata_dir())?;
        Ok(())
    }

    fn check_safe_to_replace(&self) -> Result<()> {
        let refuse = |reason: &str| PaperGenError::UnsafeOverwrite {
            path: self.output_directory.display().to_string(),
            reason: reason.to_string(),
        };

        if !self.output_directory.is_dir() {
            return Err(refuse("it is not a directory"));
        }

        if let Some(ref input) = self.protected_input {
            let directory = fs::canonicalize(&self.output_directory)?;
            let input = fs::canonicalize(input).unwrap_or_else(|_| input.clone());
            if input.starts_with(&directory) {
                return Err(refuse("it contains the question bank"));
            }
        }

        let is_empty = fs::read_dir(&self.output_directory)?.next().is_none();
        if !is_empty && !self.get_metadata_dir().is_dir() {
            return Err(refuse("it was not written by papergen"));
        }

        Ok(())
    }

    pub fn get_output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn get_metadata_dir(&self) -> PathBuf {
        self.output_directory.join(METADATA_DIR)
    }

    pub fn create_generation_report(&self, run: &RunSummary<'_>) -> Result<GenerationReport> {
        let papers = run
            .papers
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect::<Vec<_>>();

        let report = GenerationReport {
            subject: run.subject.to_string(),
            num_papers: papers.len() as u32,
            seed: run.seed,
            parser_strategy: run.parse.strategy.map(str::to_string),
            units: UnitSummary::from_report(run.parse),
            dropped_units: run.parse.dropped_units.clone(),
            papers,
            archive: run.archive.to_path_buf(),
            generated_at: Utc::now(),
            duration: run.duration,
        };

        self.save_report_json(&report)?;
        self.save_report_text(&report)?;

        Ok(report)
    }

    fn save_report_json(&self, report: &GenerationReport) -> Result<()> {
        let report_path = self.get_metadata_dir().join("generation_report.json");
        let json_content = serde_json::to_string_pretty(report).map_err(|e| PaperGenError::Config {
            message: format!("Failed to serialize report to JSON: {}", e),
        })?;

        fs::write(&report_path, json_content)?;
        Ok(())
    }

    fn save_report_text(&self, report: &GenerationReport) -> Result<()> {
        let report_path = self.get_metadata_dir().join("generation_report.txt");
        let mut file = fs::File::create(&report_path)?;

        writeln!(file, "Question Paper Generation Report")?;
        writeln!(file, "================================")?;
        writeln!(file)?;
        writeln!(file, "Subject: {}", report.subject)?;
        writeln!(
            file,
            "Generated at: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(file, "Duration: {:?}", report.duration)?;
        if let Some(seed) = report.seed {
            writeln!(file, "Seed: {}", seed)?;
        }
        if let Some(ref strategy) = report.parser_strategy {
            writeln!(file, "Parser strategy: {}", strategy)?;
        }
        writeln!(file)?;

        writeln!(file, "Units:")?;
        for unit in &report.units {
            writeln!(
                file,
                "  {} (Section A: {}, Section B: {})",
                unit.title, unit.section_a, unit.section_b
            )?;
        }
        writeln!(file)?;

        if !report.dropped_units.is_empty() {
            writeln!(file, "Dropped units (missing Section A or Section B questions):")?;
            for unit in &report.dropped_units {
                writeln!(file, "  - {}", unit)?;
            }
            writeln!(file)?;
        }

        writeln!(file, "Papers ({}):", report.num_papers)?;
        for paper in &report.papers {
            writeln!(file, "  {}", paper)?;
        }
        writeln!(file)?;
        writeln!(file, "Archive: {}", report.archive.display())?;

        Ok(())
    }

    fn validate_paths(&self) -> Result<()> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path).map_err(|e| PaperGenError::Permission {
                path: format!(
                    "Cannot create base directory {}: {}",
                    self.base_path.display(),
                    e
                ),
            })?;
        }

        let test_file = self.base_path.join(".papergen_write_test");
        match fs::File::create(&test_file) {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                return Err(PaperGenError::Permission {
                    path: format!(
                        "No write permission for directory {}: {}",
                        self.base_path.display(),
                        e
                    ),
                });
            }
        }

        Ok(())
    }

    /// Remove this run's directory so a failed run leaves nothing behind.
    pub fn cleanup_on_error(&self) -> Result<()> {
        if self.output_directory.exists() {
            fs::remove_dir_all(&self.output_directory)?;
        }
        Ok(())
    }
}

/// `<base>/question_papers_<subject>`, the default run directory.
pub fn run_directory(base_path: &Path, subject: &str) -> PathBuf {
    base_path.join(format!("question_papers_{}", sanitize_name(subject)))
}

pub fn sanitize_name(name: &str) -> String {
    let mut sanitized = String::new();

    for ch in name.trim().chars() {
        match ch {
            c if c.is_alphanumeric() || c == '-' || c == '.' || c == '_' => sanitized.push(c),
            _ => sanitized.push('_'),
        }
    }

    let sanitized = sanitized.trim_matches(|c| c == '.' || c == '_');

    if sanitized.is_empty() {
        "subject".to_string()
    } else {
        sanitized.chars().take(100).collect()
    }
}
