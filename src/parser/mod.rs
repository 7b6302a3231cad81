pub mod bank;
pub mod normalize;
pub mod strategies;

pub use bank::{QuestionBank, Section, UnitSections};
pub use strategies::{HeadingStrategy, ParseStrategy, StrategyOutcome};

use tracing::{debug, warn};

/// Result of running the strategy chain over a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub bank: QuestionBank,
    /// Name of the strategy that produced `bank`, if any did.
    pub strategy: Option<&'static str>,
    pub headings_found: usize,
    pub dropped_units: Vec<String>,
}

/// Recovers a [`QuestionBank`] from free-form text by trying each
/// strategy in order until one yields at least one complete unit.
pub struct BankParser {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl BankParser {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(HeadingStrategy::roman_numerals()),
                Box::new(HeadingStrategy::any_unit_line()),
            ],
        }
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Never fails. An unrecognizable document gives an empty bank.
    pub fn parse(&self, text: &str) -> ParseReport {
        let text = normalize::normalize_text(text);
        let mut best_miss: Option<StrategyOutcome> = None;

        for strategy in &self.strategies {
            let outcome = strategy.scan(&text);
            debug!(
                strategy = strategy.name(),
                headings = outcome.headings_found,
                units = outcome.bank.len(),
                dropped = outcome.dropped_units.len(),
                "parse strategy finished"
            );

            if !outcome.bank.is_empty() {
                for title in &outcome.dropped_units {
                    warn!(unit = %title, "dropping unit with an empty Section A or Section B pool");
                }
                return ParseReport {
                    bank: outcome.bank,
                    strategy: Some(strategy.name()),
                    headings_found: outcome.headings_found,
                    dropped_units: outcome.dropped_units,
                };
            }

            let better = best_miss
                .as_ref()
                .is_none_or(|best| outcome.headings_found > best.headings_found);
            if better {
                best_miss = Some(outcome);
            }
        }

        let miss = best_miss.unwrap_or_default();
        ParseReport {
            bank: QuestionBank::new(),
            strategy: None,
            headings_found: miss.headings_found,
            dropped_units: miss.dropped_units,
        }
    }
}

impl Default for BankParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse with the default strategy chain and keep only the bank.
pub fn parse_question_bank(text: &str) -> QuestionBank {
    BankParser::default().parse(text).bank
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Unit I - Basics\nSection A - \n1. What is X?\n2. Define Y.\nSection B -\n1. Explain Z in detail.\n2. Discuss W.\n";

    #[test]
    fn test_sample_bank() {
        let bank = parse_question_bank(SAMPLE);

        assert_eq!(bank.len(), 1);
        let unit = bank.get("Unit I - Basics").unwrap();
        assert_eq!(unit.a, vec!["What is X?", "Define Y."]);
        assert_eq!(unit.b, vec!["Explain Z in detail.", "Discuss W."]);
    }

    #[test]
    fn test_k_units_in_document_order() {
        let numerals = ["I", "II", "III", "IV", "V"];
        let mut text = String::from("Department of Physics\nQuestion bank\n\n");
        for numeral in numerals {
            text.push_str(&format!(
                "Unit {numeral} - Topic {numeral}\nSection A -\n1. a1\n2. a2\n3. a3\nSection B -\n1. b1\n2. b2\n\n"
            ));
        }

        let report = BankParser::default().parse(&text);
        assert_eq!(report.strategy, Some("roman-headings"));
        let titles: Vec<&str> = report.bank.titles().collect();
        let expected: Vec<String> = numerals.iter().map(|n| format!("Unit {n} - Topic {n}")).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn test_no_headings_gives_empty_bank() {
        let report = BankParser::default().parse("Just some notes\n1. a question\n");
        assert!(report.bank.is_empty());
        assert_eq!(report.strategy, None);
        assert_eq!(report.headings_found, 0);

        assert!(parse_question_bank("").is_empty());
    }

    #[test]
    fn test_falls_back_to_generic_headings() {
        let text = "Unit 1 - Sets\nSection A -\n1. Define a set.\nSection B -\n1. Prove De Morgan's laws.\n";
        let report = BankParser::default().parse(text);
        assert_eq!(report.strategy, Some("unit-headings"));
        assert_eq!(report.bank.len(), 1);
    }

    #[test]
    fn test_dash_variants_are_normalized() {
        let text = "Unit I \u{2014} Basics\r\nSection A \u{2013} Short\r\n1. Q1\r\nSection B \u{2014} Long\r\n1. Q2\r\n";
        let bank = parse_question_bank(text);
        let unit = bank.get("Unit I - Basics").unwrap();
        assert_eq!(unit.a, vec!["Q1"]);
        assert_eq!(unit.b, vec!["Q2"]);
    }

    #[test]
    fn test_failed_parse_reports_dropped_units() {
        let text = "Unit I - Basics\nSection A -\n1. only A\n";
        let report = BankParser::default().parse(text);
        assert!(report.bank.is_empty());
        assert_eq!(report.headings_found, 1);
        assert_eq!(report.dropped_units, vec!["Unit I - Basics"]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let parser = BankParser::default();
        assert_eq!(parser.parse(SAMPLE), parser.parse(SAMPLE));
    }

    #[test]
    fn test_duplicate_headings_last_write_wins() {
        let text = "Unit I - Basics\nSection A -\n1. old a\nSection B -\n1. old b\n\
                    Unit I - Basics\nSection A -\n1. new a\nSection B -\n1. new b\n";
        let bank = parse_question_bank(text);
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.get("Unit I - Basics").unwrap().a, vec!["new a"]);
    }

    #[test]
    fn test_custom_strategy_chain() {
        let parser = BankParser::with_strategies(vec![Box::new(HeadingStrategy::any_unit_line())]);
        assert_eq!(parser.strategy_names(), vec!["unit-headings"]);
        assert_eq!(parser.parse(SAMPLE).bank.len(), 1);
    }
}
