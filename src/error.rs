use crate::parser::Section;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaperGenError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Question bank not found: {path}")]
    InputNotFound { path: String },

    #[error("Question bank is not valid UTF-8 text: {path}")]
    InvalidEncoding { path: String },

    #[error("Failed to extract text from PDF {path}: {message}")]
    Extraction { path: String, message: String },

    #[error("Could not parse any units from the question bank")]
    UnparseableBank {
        headings_found: usize,
        dropped_units: Vec<String>,
    },

    #[error("Section {section} pool of unit '{unit}' is empty")]
    EmptyPool { unit: String, section: Section },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Failed to render paper: {message}")]
    Render { message: String },

    #[error("Failed to write archive: {message}")]
    Archive {
        message: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Output directory already exists: {path}")]
    OutputDirectoryExists { path: String },

    #[error("Refusing to overwrite {path}: {reason}")]
    UnsafeOverwrite { path: String, reason: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for PaperGenError {
    fn user_message(&self) -> String {
        match self {
            PaperGenError::InputNotFound { path } => {
                format!("Question bank not found: {}", path)
            }
            PaperGenError::InvalidEncoding { path } => {
                format!("Question bank is not readable as UTF-8 text: {}", path)
            }
            PaperGenError::Extraction { message, .. } => {
                format!("Failed to extract text from PDF: {}", message)
            }
            PaperGenError::UnparseableBank {
                headings_found,
                dropped_units,
            } => {
                if *headings_found == 0 {
                    "Could not parse any units/questions from the uploaded file. No 'Unit' headings were found.".to_string()
                } else {
                    format!(
                        "Could not parse any units/questions from the uploaded file. {} unit heading(s) found, {} dropped for missing Section A or Section B questions.",
                        headings_found,
                        dropped_units.len()
                    )
                }
            }
            PaperGenError::EmptyPool { unit, section } => {
                format!("Unit '{}' has no Section {} questions", unit, section)
            }
            PaperGenError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            PaperGenError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            PaperGenError::Cancelled => "Operation was cancelled by user".to_string(),
            PaperGenError::OutputDirectoryExists { path } => {
                format!("Output directory already exists: {}", path)
            }
            PaperGenError::UnsafeOverwrite { path, reason } => {
                format!("Refusing to overwrite {}: {}", path, reason)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            PaperGenError::InputNotFound { .. } => Some(
                "Check the path to the question bank. Upload a .txt or .pdf file.".to_string(),
            ),
            PaperGenError::InvalidEncoding { .. } => Some(
                "Save the question bank as UTF-8 text, or provide it as a PDF with a text layer.".to_string(),
            ),
            PaperGenError::Extraction { .. } => Some(
                "Make sure the PDF is not scanned or encrypted. Exporting the bank as plain text usually works.".to_string(),
            ),
            PaperGenError::UnparseableBank { .. } => Some(
                "Ensure it follows the sample format: 'Unit I - Title' headings, each with a 'Section A -' and a 'Section B -' list of numbered questions.".to_string(),
            ),
            PaperGenError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all values are in range.".to_string(),
            ),
            PaperGenError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the target directory.".to_string(),
            ),
            PaperGenError::OutputDirectoryExists { .. } => Some(
                "Remove the existing directory, choose a different one with --output, or use --force to overwrite.".to_string(),
            ),
            PaperGenError::UnsafeOverwrite { .. } => Some(
                "--force only replaces a directory written by an earlier papergen run. Pick an empty or new directory with --output.".to_string(),
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for PaperGenError {
    fn from(error: toml::de::Error) -> Self {
        PaperGenError::Config {
            message: error.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for PaperGenError {
    fn from(error: zip::result::ZipError) -> Self {
        PaperGenError::Archive {
            message: error.to_string(),
            source: error,
        }
    }
}

impl From<lopdf::Error> for PaperGenError {
    fn from(error: lopdf::Error) -> Self {
        PaperGenError::Render {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PaperGenError>;
