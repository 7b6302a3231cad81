pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod paper;
pub mod parser;
pub mod source;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, LayoutConfig, OutputConfig, PaperConfig};
pub use error::{PaperGenError, Result, UserFriendlyError};

// Core functionality re-exports
pub use archive::{ArchiveBuilder, GenerationReport, OutputManager, RunSummary};
pub use paper::{AssembledPaper, Block, PaperAssembler, PdfRenderer};
pub use parser::{parse_question_bank, BankParser, ParseReport, QuestionBank, Section, UnitSections};
pub use source::{load_bank_text, LopdfExtractor, SourceKind, TextExtractor};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub output_directory: PathBuf,
    pub papers: Vec<PathBuf>,
    pub archive: PathBuf,
    pub archive_size: u64,
    pub parse: ParseReport,
    pub report: Option<GenerationReport>,
    pub duration: Duration,
}

/// Main library interface: question bank in, archive of papers out.
pub struct PaperGen {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
    extractor: Box<dyn TextExtractor>,
    seed: Option<u64>,
    force: bool,
    explicit_output: Option<PathBuf>,
}

impl PaperGen {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Ok(Self::with_shutdown(config, output_mode, verbose, quiet, shutdown))
    }

    /// Same as [`PaperGen::new`] without registering a Ctrl+C handler, so
    /// several instances can live in one process.
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_shutdown(config, output_mode, verbose, quiet, GracefulShutdown::new_for_test())
    }

    fn with_shutdown(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(!quiet && output_mode == OutputMode::Human),
            shutdown,
            extractor: Box::new(LopdfExtractor::new()),
            seed: None,
            force: false,
            explicit_output: None,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        let explicit_output = cli_args
            .has_explicit_output()
            .then(|| config.output.base_directory.clone());

        let papergen = Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)?
            .with_seed(cli_args.seed)
            .with_force(cli_args.force);

        Ok(match explicit_output {
            Some(dir) => papergen.with_output_directory(dir),
            None => papergen,
        })
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Write into `dir` itself instead of `<base>/question_papers_<subject>`.
    pub fn with_output_directory(mut self, dir: PathBuf) -> Self {
        self.explicit_output = Some(dir);
        self
    }

    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Read and parse the bank. A bank with no complete unit is an error here,
    /// unlike [`BankParser::parse`], since nothing could be generated from it.
    pub fn load_bank(&self, bank_path: &Path) -> Result<ParseReport> {
        let spinner = self.progress_manager.create_spinner("Reading question bank");
        let document = load_bank_text(bank_path, self.extractor.as_ref());
        spinner.finish_and_clear();
        let document = document?;

        let parse = BankParser::new().parse(&document.text);
        if parse.bank.is_empty() {
            return Err(PaperGenError::UnparseableBank {
                headings_found: parse.headings_found,
                dropped_units: parse.dropped_units,
            });
        }

        self.output_formatter.info(&format!(
            "Parsed {} unit(s) with the {} strategy",
            parse.bank.len(),
            parse.strategy.unwrap_or("unknown")
        ));
        for title in &parse.dropped_units {
            self.output_formatter.warning(&format!(
                "Skipped '{}': it needs both Section A and Section B questions",
                title
            ));
        }

        Ok(parse)
    }

    pub fn generate(&self, bank_path: &Path) -> Result<GenerationOutcome> {
        let start_time = Instant::now();
        self.shutdown.check_shutdown()?;

        self.output_formatter.start_operation("Generating question papers");

        let parse = self.load_bank(bank_path)?;
        self.shutdown.check_shutdown()?;

        let output_manager = self.setup_output_directory(bank_path)?;

        match self.write_outputs(parse, &output_manager, start_time) {
            Ok(outcome) => {
                self.output_formatter.print_generation_summary(&outcome);
                Ok(outcome)
            }
            Err(e) => {
                if let Err(cleanup_error) = output_manager.cleanup_on_error() {
                    warn!(error = %cleanup_error, "failed to remove partial output");
                }
                Err(e)
            }
        }
    }

    /// Directory a run would write into, without touching the filesystem.
    pub fn output_directory(&self) -> PathBuf {
        match self.explicit_output {
            Some(ref dir) => dir.clone(),
            None => archive::run_directory(&self.config.output.base_directory, self.config.subject()),
        }
    }

    fn setup_output_directory(&self, bank_path: &Path) -> Result<OutputManager> {
        let manager = match self.explicit_output {
            Some(ref dir) => OutputManager::at(dir.clone())?,
            None => OutputManager::new(self.config.output.base_directory.clone(), self.config.subject())?,
        }
        .with_force_overwrite(self.force)
        .with_protected_input(bank_path);

        manager.initialize()?;

        self.output_formatter.info(&format!(
            "Initialized output directory: {}",
            manager.get_output_directory().display()
        ));

        Ok(manager)
    }

    fn write_outputs(
        &self,
        parse: ParseReport,
        output_manager: &OutputManager,
        start_time: Instant,
    ) -> Result<GenerationOutcome> {
        let output_dir = output_manager.get_output_directory();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let assembler = PaperAssembler::from_config(&self.config.paper);
        let papers = generate_papers(
            &parse.bank,
            self.config.subject(),
            self.config.paper.num_papers,
            &assembler,
            &mut rng,
        )?;

        let renderer = PdfRenderer::new(self.config.layout.clone());
        let progress = self.progress_manager.create_paper_progress(papers.len() as u64);
        let mut paper_paths = Vec::with_capacity(papers.len());

        for paper in &papers {
            let file_name = paper.file_name(&self.config.output.file_prefix);
            progress.set_message(file_name.clone());

            let path = self
                .shutdown
                .with_shutdown_check(|| renderer.render_to_file(paper, output_dir, &file_name))?;
            paper_paths.push(path);
            progress.inc(1);
        }

        ui::progress::finish_progress_with_summary(
            &progress,
            &format!("Rendered {} papers", paper_paths.len()),
            start_time.elapsed(),
        );

        self.shutdown.check_shutdown()?;
        let archive = ArchiveBuilder::new(output_dir)
            .with_archive_name(self.config.output.archive_name.clone())
            .bundle(&paper_paths)?;
        let archive_size = std::fs::metadata(&archive)?.len();

        let duration = start_time.elapsed();
        let report = if self.config.output.generate_report {
            Some(output_manager.create_generation_report(&RunSummary {
                subject: self.config.subject(),
                seed: self.seed,
                parse: &parse,
                papers: &paper_paths,
                archive: &archive,
                duration,
            })?)
        } else {
            None
        };

        info!(
            papers = paper_paths.len(),
            archive = %archive.display(),
            "generation finished"
        );

        Ok(GenerationOutcome {
            output_directory: output_dir.to_path_buf(),
            papers: paper_paths,
            archive,
            archive_size,
            parse,
            report,
            duration,
        })
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &PaperGenError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Assemble sets `1..=count` from one bank, sharing `rng` so each set is an
/// independent draw.
pub fn generate_papers<R: Rng + ?Sized>(
    bank: &QuestionBank,
    subject: &str,
    count: u32,
    assembler: &PaperAssembler,
    rng: &mut R,
) -> Result<Vec<AssembledPaper>> {
    (1..=count)
        .map(|set_number| assembler.assemble(bank, set_number, subject, rng))
        .collect()
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
