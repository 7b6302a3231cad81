use clap::Parser;
use papergen::{Cli, OutputFormatter, OutputMode, PaperGen, PaperGenError, UserFriendlyError};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbosity_level()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let papergen = match PaperGen::from_cli(&cli) {
        Ok(papergen) => papergen,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    // clap enforces this unless --generate-config was given
    let Some(bank) = cli.bank.as_deref() else {
        papergen.output_formatter().error("No question bank given");
        return 2;
    };

    if cli.dry_run {
        return handle_dry_run(&papergen, bank);
    }

    match papergen.generate(bank) {
        Ok(outcome) => {
            if let Some(ref report) = outcome.report {
                if papergen.output_formatter().mode() != OutputMode::Human || cli.verbose > 0 {
                    papergen.output_formatter().print_generation_report(report);
                }
            }
            0
        }
        Err(e) => {
            papergen.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &PaperGenError) -> i32 {
    match error {
        PaperGenError::Cancelled => 130,
        PaperGenError::InvalidInput { .. } | PaperGenError::Config { .. } => 2,
        PaperGenError::InputNotFound { .. } => 3,
        PaperGenError::Extraction { .. } | PaperGenError::InvalidEncoding { .. } => 4,
        PaperGenError::UnparseableBank { .. } | PaperGenError::EmptyPool { .. } => 5,
        PaperGenError::Permission { .. } => 7,
        PaperGenError::OutputDirectoryExists { .. } | PaperGenError::UnsafeOverwrite { .. } => 8,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "papergen.toml".to_string());

    match PaperGen::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  papergen <bank-file> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(papergen: &PaperGen, bank: &std::path::Path) -> i32 {
    let formatter = papergen.output_formatter();

    formatter.info("DRY RUN MODE - No papers will be written");
    formatter.print_separator();

    let parse = match papergen.load_bank(bank) {
        Ok(parse) => parse,
        Err(e) => {
            papergen.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    formatter.print_bank_summary(&parse);
    formatter.print_separator();

    let config = papergen.config();
    formatter.info(&format!(
        "Would generate {} paper(s) for '{}' in {}",
        config.paper.num_papers,
        config.subject(),
        papergen.output_directory().display()
    ));
    formatter.success("Dry run completed successfully");

    0
}

fn print_startup_error(error: &PaperGenError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

/// `RUST_LOG` wins; otherwise the level follows `-v`.
fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let default_level = match verbosity {
        0 => "papergen=warn",
        1 => "papergen=info",
        2 => "papergen=debug",
        _ => "papergen=trace",
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use papergen::Config;
    use std::fs;
    use tempfile::TempDir;

    fn cli_with(args: &[&str]) -> Cli {
        let mut full = vec!["papergen"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        let cli = cli_with(&["--generate-config", "--config", config_path.to_str().unwrap()]);

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[paper]"));
    }

    #[test]
    fn test_dry_run_mode() {
        let temp_dir = TempDir::new().unwrap();
        let bank = temp_dir.path().join("bank.txt");
        fs::write(
            &bank,
            "Unit I - Basics\nSection A - \n1. What is X?\nSection B -\n1. Explain Z.\n",
        )
        .unwrap();

        let papergen = PaperGen::new_for_test(Config::default(), OutputMode::Plain, 0, true);
        assert_eq!(handle_dry_run(&papergen, &bank), 0);
    }

    #[test]
    fn test_dry_run_with_unparseable_bank() {
        let temp_dir = TempDir::new().unwrap();
        let bank = temp_dir.path().join("bank.txt");
        fs::write(&bank, "nothing to see here\n").unwrap();

        let papergen = PaperGen::new_for_test(Config::default(), OutputMode::Plain, 0, true);
        assert_eq!(handle_dry_run(&papergen, &bank), 5);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&PaperGenError::Cancelled), 130);
        assert_eq!(
            exit_code_for(&PaperGenError::InputNotFound {
                path: "bank.txt".to_string()
            }),
            3
        );
        assert_eq!(
            exit_code_for(&PaperGenError::OutputDirectoryExists {
                path: "out".to_string()
            }),
            8
        );
        assert_eq!(
            exit_code_for(&PaperGenError::UnsafeOverwrite {
                path: ".".to_string(),
                reason: "it contains the question bank".to_string(),
            }),
            8
        );
        assert_eq!(
            exit_code_for(&PaperGenError::Render {
                message: "bad".to_string()
            }),
            1
        );
    }
}
