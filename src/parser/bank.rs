use serde::Serialize;
use std::fmt;

/// One of the two question pools every unit carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    A,
    B,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::A => write!(f, "A"),
            Section::B => write!(f, "B"),
        }
    }
}

/// Section A (short answer) and Section B (long answer) questions of a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitSections {
    #[serde(rename = "A")]
    pub a: Vec<String>,
    #[serde(rename = "B")]
    pub b: Vec<String>,
}

impl UnitSections {
    pub fn new(a: Vec<String>, b: Vec<String>) -> Self {
        Self { a, b }
    }

    pub fn pool(&self, section: Section) -> &[String] {
        match section {
            Section::A => &self.a,
            Section::B => &self.b,
        }
    }

    /// A unit only belongs in a bank when both pools have questions.
    pub fn is_complete(&self) -> bool {
        !self.a.is_empty() && !self.b.is_empty()
    }
}

/// Units keyed by their heading line, in document order.
///
/// Inserting a heading that is already present replaces its sections but
/// keeps the position where the heading was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    units: Vec<(String, UnitSections)>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: impl Into<String>, sections: UnitSections) {
        let title = title.into();
        match self.units.iter_mut().find(|(existing, _)| *existing == title) {
            Some((_, slot)) => *slot = sections,
            None => self.units.push((title, sections)),
        }
    }

    pub fn get(&self, title: &str) -> Option<&UnitSections> {
        self.units
            .iter()
            .find(|(existing, _)| existing == title)
            .map(|(_, sections)| sections)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UnitSections)> {
        self.units
            .iter()
            .map(|(title, sections)| (title.as_str(), sections))
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|(title, _)| title.as_str())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn question_count(&self, section: Section) -> usize {
        self.units
            .iter()
            .map(|(_, sections)| sections.pool(section).len())
            .sum()
    }
}

impl Serialize for QuestionBank {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.units.len()))?;
        for (title, sections) in &self.units {
            map.serialize_entry(title, sections)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(a: &[&str], b: &[&str]) -> UnitSections {
        UnitSections::new(
            a.iter().map(|s| s.to_string()).collect(),
            b.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut bank = QuestionBank::new();
        bank.insert("Unit II - Later", sections(&["a"], &["b"]));
        bank.insert("Unit I - Earlier", sections(&["c"], &["d"]));

        let titles: Vec<&str> = bank.titles().collect();
        assert_eq!(titles, vec!["Unit II - Later", "Unit I - Earlier"]);
    }

    #[test]
    fn test_duplicate_heading_overwrites_in_place() {
        let mut bank = QuestionBank::new();
        bank.insert("Unit I - Basics", sections(&["old"], &["old"]));
        bank.insert("Unit II - Motion", sections(&["x"], &["y"]));
        bank.insert("Unit I - Basics", sections(&["new"], &["new"]));

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.titles().next(), Some("Unit I - Basics"));
        assert_eq!(bank.get("Unit I - Basics").unwrap().a, vec!["new"]);
    }

    #[test]
    fn test_question_counts() {
        let mut bank = QuestionBank::new();
        bank.insert("Unit I", sections(&["a1", "a2"], &["b1"]));
        bank.insert("Unit II", sections(&["a3"], &["b2", "b3", "b4"]));

        assert_eq!(bank.question_count(Section::A), 3);
        assert_eq!(bank.question_count(Section::B), 4);
    }

    #[test]
    fn test_completeness() {
        assert!(sections(&["a"], &["b"]).is_complete());
        assert!(!sections(&[], &["b"]).is_complete());
        assert!(!sections(&["a"], &[]).is_complete());
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let mut bank = QuestionBank::new();
        bank.insert("Unit II", sections(&["a"], &["b"]));
        bank.insert("Unit I", sections(&["c"], &["d"]));

        let json = serde_json::to_string(&bank).unwrap();
        assert_eq!(
            json,
            r#"{"Unit II":{"A":["a"],"B":["b"]},"Unit I":{"A":["c"],"B":["d"]}}"#
        );
    }
}
