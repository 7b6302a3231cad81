use crate::archive::GenerationReport;
use crate::error::{PaperGenError, UserFriendlyError};
use crate::parser::{ParseReport, Section};
use crate::GenerationOutcome;
use console::{style, Emoji};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => console::colors_enabled() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &PaperGenError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!("{}{}", INFO, style(format!("Suggestion: {}", suggestion)).cyan());
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_generation_summary(&self, outcome: &GenerationOutcome) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(outcome),
            OutputMode::Json => self.print_json_summary(outcome),
            OutputMode::Plain => self.print_plain_summary(outcome),
        }
    }

    pub fn print_generation_report(&self, report: &GenerationReport) {
        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => {
                let json_output = serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                println!("REPORT: {} papers for {}", report.num_papers, report.subject);
                println!("Archive: {}", report.archive.display());
            }
        }
    }

    /// Units recovered from a bank, as shown by `--dry-run`.
    pub fn print_bank_summary(&self, parse: &ParseReport) {
        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "bank",
                    "strategy": parse.strategy,
                    "headings_found": parse.headings_found,
                    "units": parse.bank,
                    "dropped_units": parse.dropped_units,
                }));
            }
            OutputMode::Human | OutputMode::Plain => {
                println!(
                    "Parser strategy: {}",
                    parse.strategy.unwrap_or("none")
                );
                println!("Unit headings found: {}", parse.headings_found);
                println!("Units:");
                for (title, sections) in parse.bank.iter() {
                    println!(
                        "  {} (Section A: {}, Section B: {})",
                        title,
                        sections.pool(Section::A).len(),
                        sections.pool(Section::B).len()
                    );
                }
                if !parse.dropped_units.is_empty() {
                    println!("Dropped units:");
                    for title in &parse.dropped_units {
                        println!("  - {}", title);
                    }
                }
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        if self.use_colors {
            let styled = match msg_type {
                MessageType::Success => style(message).green().bold(),
                MessageType::Error => style(message).red().bold(),
                MessageType::Warning => style(message).yellow().bold(),
                MessageType::Info => style(message).cyan(),
            };
            let emoji = match msg_type {
                MessageType::Success => &CHECKMARK,
                MessageType::Error => &CROSS,
                MessageType::Warning => &WARNING,
                MessageType::Info => &INFO,
            };

            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_summary(&self, outcome: &GenerationOutcome) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Question papers generated!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Question papers generated!");
        }

        println!();
        println!("  Papers:      {}", self.highlight(outcome.papers.len().to_string()));
        println!("  Units:       {}", self.highlight(outcome.parse.bank.len().to_string()));
        if !outcome.parse.dropped_units.is_empty() {
            println!("  Dropped:     {}", outcome.parse.dropped_units.len());
        }
        println!(
            "  Archive:     {} ({})",
            self.highlight(outcome.archive.display().to_string()),
            format_bytes(outcome.archive_size)
        );
        println!("  Time taken:  {}", self.highlight(format_duration(outcome.duration)));

        self.print_separator();
    }

    fn print_json_summary(&self, outcome: &GenerationOutcome) {
        let summary = serde_json::json!({
            "type": "summary",
            "papers": outcome.papers.len(),
            "units": outcome.parse.bank.len(),
            "dropped_units": outcome.parse.dropped_units,
            "output_directory": outcome.output_directory,
            "archive": outcome.archive,
            "archive_bytes": outcome.archive_size,
            "duration_ms": outcome.duration.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, outcome: &GenerationOutcome) {
        println!("COMPLETED: Question paper generation");
        println!("Papers: {}", outcome.papers.len());
        println!("Units: {}", outcome.parse.bank.len());
        println!("Archive: {}", outcome.archive.display());
        println!("Duration: {:?}", outcome.duration);
    }

    fn print_human_report(&self, report: &GenerationReport) {
        self.print_header("Generation Report");

        println!("Subject: {}", report.subject);
        println!(
            "Generated at: {}",
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        if let Some(seed) = report.seed {
            println!("Seed: {}", seed);
        }
        println!();

        println!("Units:");
        for unit in &report.units {
            println!(
                "  {}: {} Section A, {} Section B",
                unit.title, unit.section_a, unit.section_b
            );
        }

        if !report.dropped_units.is_empty() {
            println!();
            println!("Dropped (missing Section A or Section B questions):");
            for title in &report.dropped_units {
                println!("  - {}", title);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_parsing() {
        assert_eq!(OutputMode::from_string("human"), OutputMode::Human);
        assert_eq!(OutputMode::from_string("JSON"), OutputMode::Json);
        assert_eq!(OutputMode::from_string("plain"), OutputMode::Plain);
        assert_eq!(OutputMode::from_string("invalid"), OutputMode::Human);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(!formatter.use_colors);
        assert!(!formatter.should_show_message(0));
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }
}
