use crate::error::{PaperGenError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SUBJECT: &str = "Subject";
pub const DEFAULT_NUM_PAPERS: u32 = 9;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub paper: PaperConfig,
    pub output: OutputConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaperConfig {
    pub subject: String,
    pub num_papers: u32,
    /// Section A questions drawn per unit. Section B always draws one either/or pair.
    pub questions_per_unit: usize,
    /// First item number of Section B. Not derived from the Section A count.
    pub section_b_start: u32,
    pub section_a_marks: u32,
    pub section_b_marks: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_directory: PathBuf,
    pub file_prefix: String,
    pub archive_name: String,
    pub generate_report: bool,
}

/// Page geometry in PDF points (1/72 inch).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub leading: f32,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            num_papers: DEFAULT_NUM_PAPERS,
            questions_per_unit: 2,
            section_b_start: 11,
            section_a_marks: 2,
            section_b_marks: 8,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            file_prefix: "Question_Paper_Set_".to_string(),
            archive_name: "Question_Papers.zip".to_string(),
            generate_report: true,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        // A4
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 40.0,
            title_size: 18.0,
            heading_size: 14.0,
            body_size: 10.0,
            leading: 14.0,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PaperGenError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| PaperGenError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| PaperGenError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["papergen.toml", ".papergen.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref subject) = cli_args.subject {
            self.paper.subject = subject.clone();
        }

        if let Some(num_papers) = cli_args.num_papers {
            self.paper.num_papers = num_papers;
        }

        if let Some(section_b_start) = cli_args.section_b_start {
            self.paper.section_b_start = section_b_start;
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.base_directory = output_dir.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.paper.num_papers == 0 {
            return Err(PaperGenError::Config {
                message: "Number of papers must be at least 1".to_string(),
            });
        }

        if self.paper.questions_per_unit == 0 {
            return Err(PaperGenError::Config {
                message: "Questions per unit must be at least 1".to_string(),
            });
        }

        if self.output.archive_name.trim().is_empty() || !self.output.archive_name.ends_with(".zip") {
            return Err(PaperGenError::Config {
                message: format!(
                    "Archive name must be a non-empty .zip file name, got '{}'",
                    self.output.archive_name
                ),
            });
        }

        if has_path_separator(&self.output.archive_name) || has_path_separator(&self.output.file_prefix) {
            return Err(PaperGenError::Config {
                message: format!(
                    "Archive name and file prefix must be plain file names, got '{}' and '{}'",
                    self.output.archive_name, self.output.file_prefix
                ),
            });
        }

        let layout = &self.layout;
        let sizes = [
            layout.title_size,
            layout.heading_size,
            layout.body_size,
            layout.leading,
        ];
        if sizes.iter().any(|size| *size <= 0.0) {
            return Err(PaperGenError::Config {
                message: "Font sizes and leading must be greater than 0".to_string(),
            });
        }

        if layout.margin < 0.0
            || layout.page_width <= 2.0 * layout.margin
            || layout.page_height <= 2.0 * layout.margin
        {
            return Err(PaperGenError::Config {
                message: "Page must be larger than its margins".to_string(),
            });
        }

        Ok(())
    }

    /// Subject to print on the paper; blank falls back to "Subject".
    pub fn subject(&self) -> &str {
        effective_subject(&self.paper.subject)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

// Output names are joined onto the run directory and must stay inside it.
fn has_path_separator(name: &str) -> bool {
    name.contains(['/', '\\']) || name.contains("..")
}

pub fn effective_subject(subject: &str) -> &str {
    let trimmed = subject.trim();
    if trimmed.is_empty() {
        DEFAULT_SUBJECT
    } else {
        trimmed
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub subject: Option<String>,
    pub num_papers: Option<u32>,
    pub section_b_start: Option<u32>,
    pub output_dir: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject;
        self
    }

    pub fn with_num_papers(mut self, num_papers: Option<u32>) -> Self {
        self.num_papers = num_papers;
        self
    }

    pub fn with_section_b_start(mut self, start: Option<u32>) -> Self {
        self.section_b_start = start;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }
}
