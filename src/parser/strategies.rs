use super::bank::{QuestionBank, UnitSections};
use super::normalize::{numbered_questions, split_questions};
use regex::Regex;
use std::sync::LazyLock;

static ROMAN_UNIT_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Unit[ \t]+[IVXLC]+[ \t]*-.*$").unwrap());

static UNIT_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?im)^unit\b.*$").unwrap());

static SECTION_A_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)section\s*a\s*-[^\n]*\n").unwrap());

static SECTION_B_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)section\s*b\s*-").unwrap());

static SECTION_B_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)section\s*b\s*-[^\n]*\n").unwrap());

static BARE_SECTION_B: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)section\s*b").unwrap());

/// What a single strategy recovered from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyOutcome {
    pub bank: QuestionBank,
    pub headings_found: usize,
    /// Headings whose Section A or Section B pool came out empty.
    pub dropped_units: Vec<String>,
}

/// One way of recognizing units in normalized bank text.
///
/// Strategies are pure: the same text always yields the same outcome.
pub trait ParseStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn scan(&self, text: &str) -> StrategyOutcome;

    /// The recovered bank, or `None` when nothing usable was found.
    fn parse(&self, text: &str) -> Option<QuestionBank> {
        let outcome = self.scan(text);
        if outcome.bank.is_empty() {
            None
        } else {
            Some(outcome.bank)
        }
    }
}

/// Splits the document on heading lines matched by a regex and reads
/// Section A / Section B pools out of each unit body.
pub struct HeadingStrategy {
    name: &'static str,
    heading: &'static LazyLock<Regex>,
}

impl HeadingStrategy {
    /// `Unit IV - Title` style headings only.
    pub fn roman_numerals() -> Self {
        Self {
            name: "roman-headings",
            heading: &ROMAN_UNIT_HEADING,
        }
    }

    /// Any line starting with the word "unit", in any case.
    pub fn any_unit_line() -> Self {
        Self {
            name: "unit-headings",
            heading: &UNIT_HEADING,
        }
    }
}

impl ParseStrategy for HeadingStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn scan(&self, text: &str) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::default();
        let headings: Vec<_> = self.heading.find_iter(text).collect();
        outcome.headings_found = headings.len();

        for (index, heading) in headings.iter().enumerate() {
            let body_end = headings
                .get(index + 1)
                .map(|next| next.start())
                .unwrap_or(text.len());
            let body = &text[heading.end()..body_end];
            let title = heading.as_str().trim();

            let sections = extract_sections(body);
            if sections.is_complete() {
                outcome.bank.insert(title, sections);
            } else {
                outcome.dropped_units.push(title.to_string());
            }
        }

        outcome
    }
}

/// Read both pools out of one unit body, falling back to a bare
/// "section b" split when the labelled markers don't yield both pools.
pub fn extract_sections(body: &str) -> UnitSections {
    let sections = marker_sections(body);
    if sections.is_complete() {
        return sections;
    }

    bare_split_sections(body).unwrap_or(sections)
}

/// Pools delimited by `Section A - ...` and `Section B - ...` label lines.
pub fn marker_sections(body: &str) -> UnitSections {
    let a = SECTION_A_MARKER
        .find(body)
        .map(|marker| {
            let rest = &body[marker.end()..];
            let end = SECTION_B_START
                .find(rest)
                .map(|b| b.start())
                .unwrap_or(rest.len());
            split_questions(&rest[..end])
        })
        .unwrap_or_default();

    let b = SECTION_B_MARKER
        .find(body)
        .map(|marker| split_questions(&body[marker.end()..]))
        .unwrap_or_default();

    UnitSections::new(a, b)
}

/// Pools on either side of the first bare "section b" token.
///
/// Only numbered lines count here, so whatever trails the section labels
/// on their own lines is ignored.
pub fn bare_split_sections(body: &str) -> Option<UnitSections> {
    let mut splits = BARE_SECTION_B.find_iter(body);
    let first = splits.next()?;
    let b_end = splits.next().map(|next| next.start()).unwrap_or(body.len());

    Some(UnitSections::new(
        numbered_questions(&body[..first.start()]),
        numbered_questions(&body[first.end()..b_end]),
    ))
}
