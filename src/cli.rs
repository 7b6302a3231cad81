use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "papergen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate randomized question papers from a question bank")]
#[command(
    long_about = "papergen reads a question bank (plain text or PDF) organized into units, \
                  each with a Section A and a Section B list of questions, and writes a set \
                  of randomized question papers as PDFs bundled into a zip archive."
)]
#[command(after_help = "EXAMPLES:\n  \
    papergen bank.txt --subject Physics\n  \
    papergen bank.pdf --subject \"Data Structures\" --num-papers 5 --output midterm\n  \
    papergen bank.txt --seed 42 --force\n  \
    papergen bank.txt --dry-run --output-format json\n  \
    papergen --generate-config --config papergen.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Question bank file (.txt or .pdf)
    #[arg(required_unless_present = "generate_config")]
    pub bank: Option<PathBuf>,

    /// Subject printed in each paper's title
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Number of papers to generate (non-numeric values fall back to the default)
    #[arg(short, long)]
    pub num_papers: Option<String>,

    /// Item number of the first Section B question
    #[arg(long, help = "Number of the first Section B item (default: 11)")]
    pub section_b_start: Option<u32>,

    /// Output directory (defaults to question_papers_{subject})
    #[arg(short, long)]
    pub output: Option<String>,

    /// Seed for reproducible papers
    #[arg(long, help = "Seed the random generator to reproduce a set of papers")]
    pub seed: Option<u64>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force overwrite of existing output directory
    #[arg(long, help = "Overwrite existing output directory")]
    pub force: bool,

    /// Parse the bank and report its units without writing any papers
    #[arg(long, help = "Show the parsed units without generating papers")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let output_dir = self.output.as_ref().map(|o| {
            if o.contains('/') || o.contains('\\') {
                PathBuf::from(o)
            } else {
                std::env::current_dir().unwrap_or_default().join(o)
            }
        });

        CliOverrides::new()
            .with_subject(self.subject.clone())
            .with_num_papers(self.num_papers.as_deref().and_then(parse_num_papers))
            .with_section_b_start(self.section_b_start)
            .with_output_dir(output_dir)
    }

    /// Whether `--output` names the run directory itself rather than a base
    /// directory to create `question_papers_{subject}` under.
    pub fn has_explicit_output(&self) -> bool {
        self.output.is_some()
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Lenient paper count: anything that is not a non-negative integer is
/// ignored so the configured default applies.
pub fn parse_num_papers(s: &str) -> Option<u32> {
    match s.trim().parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(value = s, "ignoring non-numeric paper count");
            None
        }
    }
}
