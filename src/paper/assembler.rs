use super::document::{AssembledPaper, Block};
use crate::config::{effective_subject, PaperConfig};
use crate::error::{PaperGenError, Result};
use crate::parser::{QuestionBank, Section};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Builds one randomized paper per call from a shared, read-only bank.
///
/// Every unit contributes exactly `questions_per_unit` Section A questions
/// and one Section B either/or item built from two draws. Section B items are numbered from `section_b_start` regardless of
/// how many Section A items came before, so with a bank of anything other
/// than five units the numbering is not contiguous.
#[derive(Debug, Clone)]
pub struct PaperAssembler {
    questions_per_unit: usize,
    section_b_start: u32,
    section_a_marks: u32,
    section_b_marks: u32,
}

impl PaperAssembler {
    pub fn new() -> Self {
        Self::from_config(&PaperConfig::default())
    }

    pub fn from_config(config: &PaperConfig) -> Self {
        Self {
            questions_per_unit: config.questions_per_unit,
            section_b_start: config.section_b_start,
            section_a_marks: config.section_a_marks,
            section_b_marks: config.section_b_marks,
        }
    }

    pub fn with_section_b_start(mut self, start: u32) -> Self {
        self.section_b_start = start;
        self
    }

    /// Assemble the paper for `set_number` (1-based).
    ///
    /// Every pool in `bank` must hold at least one question; an empty pool is
    /// reported as [`PaperGenError::EmptyPool`]. Pools smaller than the number
    /// of draws are padded by drawing again with replacement.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        bank: &QuestionBank,
        set_number: u32,
        subject: &str,
        rng: &mut R,
    ) -> Result<AssembledPaper> {
        if set_number == 0 {
            return Err(PaperGenError::InvalidInput {
                message: "set numbers start at 1".to_string(),
            });
        }

        let subject = effective_subject(subject).to_string();
        let mut blocks = vec![
            Block::Title(format!("{} \u{2013} Question Paper", subject)),
            Block::SetLabel(format!("Set {}", set_number)),
            Block::Spacer(0.2),
            Block::SectionHeader(format!(
                "Section A \u{2013} ({} Marks Each)",
                self.section_a_marks
            )),
        ];

        let mut number = 1;
        for (title, sections) in bank.iter() {
            let drawn = draw(title, sections.pool(Section::A), Section::A, self.questions_per_unit, rng)?;
            for question in drawn {
                blocks.push(Block::Question {
                    number,
                    text: question.to_string(),
                });
                number += 1;
            }
        }

        blocks.push(Block::Spacer(0.3));
        blocks.push(Block::SectionHeader(format!(
            "Section B \u{2013} ({} Marks Each)",
            self.section_b_marks
        )));

        let mut number = self.section_b_start;
        for (title, sections) in bank.iter() {
            let [first, second] = draw_pair(title, sections.pool(Section::B), rng)?;
            blocks.push(Block::EitherOr {
                number,
                first: first.to_string(),
                second: second.to_string(),
            });
            blocks.push(Block::Spacer(0.2));
            number += 1;
        }

        debug!(set = set_number, units = bank.len(), "assembled paper");
        Ok(AssembledPaper::new(set_number, subject, blocks))
    }

}

/// `wanted` questions from `pool`, without replacement while the pool lasts.
fn draw<'a, R: Rng + ?Sized>(
    unit: &str,
    pool: &'a [String],
    section: Section,
    wanted: usize,
    rng: &mut R,
) -> Result<Vec<&'a str>> {
    if pool.is_empty() {
        return Err(PaperGenError::EmptyPool {
            unit: unit.to_string(),
            section,
        });
    }

    let mut selected: Vec<&str> = pool
        .choose_multiple(rng, wanted.min(pool.len()))
        .map(String::as_str)
        .collect();

    while selected.len() < wanted {
        if let Some(extra) = pool.choose(rng) {
            selected.push(extra.as_str());
        }
    }

    Ok(selected)
}

// An either/or item always offers two alternatives.
fn draw_pair<'a, R: Rng + ?Sized>(unit: &str, pool: &'a [String], rng: &mut R) -> Result<[&'a str; 2]> {
    match draw(unit, pool, Section::B, 2, rng)?.as_slice() {
        [first, second] => Ok([*first, *second]),
        _ => Err(PaperGenError::EmptyPool {
            unit: unit.to_string(),
            section: Section::B,
        }),
    }
}

impl Default for PaperAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_question_bank, UnitSections};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample_bank() -> QuestionBank {
        parse_question_bank(
            "Unit I - Basics\nSection A - \n1. What is X?\n2. Define Y.\nSection B -\n1. Explain Z in detail.\n2. Discuss W.\n",
        )
    }

    #[test]
    fn test_sample_paper_structure() {
        let bank = sample_bank();
        let mut rng = StdRng::seed_from_u64(7);
        let paper = PaperAssembler::new()
            .assemble(&bank, 1, "Physics", &mut rng)
            .unwrap();

        assert_eq!(paper.set_number(), 1);
        assert_eq!(
            paper.blocks()[0],
            Block::Title("Physics \u{2013} Question Paper".to_string())
        );
        assert_eq!(paper.blocks()[1], Block::SetLabel("Set 1".to_string()));

        let mut section_a = paper.section_a_questions();
        section_a.sort();
        assert_eq!(section_a, vec!["Define Y.", "What is X?"]);

        let items = paper.either_or_items();
        assert_eq!(items.len(), 1);
        let (number, first, second) = items[0];
        assert_eq!(number, 11);
        let mut pair = vec![first, second];
        pair.sort();
        assert_eq!(pair, vec!["Discuss W.", "Explain Z in detail."]);
    }

    #[test]
    fn test_section_a_numbering_continues_across_units() {
        let mut bank = QuestionBank::new();
        for unit in ["Unit I", "Unit II", "Unit III"] {
            bank.insert(unit, UnitSections::new(strings(&["a1", "a2", "a3"]), strings(&["b1", "b2"])));
        }

        let mut rng = StdRng::seed_from_u64(1);
        let paper = PaperAssembler::new().assemble(&bank, 2, "Maths", &mut rng).unwrap();

        let numbers: Vec<u32> = paper
            .blocks()
            .iter()
            .filter_map(|b| match b {
                Block::Question { number, .. } => Some(*number),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);

        let b_numbers: Vec<u32> = paper.either_or_items().iter().map(|i| i.0).collect();
        assert_eq!(b_numbers, vec![11, 12, 13]);
    }

    #[test]
    fn test_single_question_pools_are_padded() {
        let mut bank = QuestionBank::new();
        bank.insert("Unit I", UnitSections::new(strings(&["only a"]), strings(&["only b"])));

        let mut rng = StdRng::seed_from_u64(3);
        let paper = PaperAssembler::new().assemble(&bank, 1, "Bio", &mut rng).unwrap();

        assert_eq!(paper.section_a_questions(), vec!["only a", "only a"]);
        assert_eq!(paper.either_or_items(), vec![(11, "only b", "only b")]);
    }

    #[test]
    fn test_draws_without_replacement_when_pool_is_large_enough() {
        let mut bank = QuestionBank::new();
        bank.insert("Unit I", UnitSections::new(strings(&["p", "q"]), strings(&["r", "s"])));

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let paper = PaperAssembler::new().assemble(&bank, 1, "X", &mut rng).unwrap();
            let a = paper.section_a_questions();
            assert_ne!(a[0], a[1]);
            let (_, first, second) = paper.either_or_items()[0];
            assert_ne!(first, second);
        }
    }

    #[test]
    fn test_same_seed_same_paper() {
        let mut bank = QuestionBank::new();
        bank.insert(
            "Unit I",
            UnitSections::new(strings(&["a", "b", "c", "d", "e"]), strings(&["f", "g", "h", "i"])),
        );
        let assembler = PaperAssembler::new();

        let first = assembler.assemble(&bank, 1, "X", &mut StdRng::seed_from_u64(42)).unwrap();
        let second = assembler.assemble(&bank, 1, "X", &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let mut bank = QuestionBank::new();
        bank.insert("Unit I", UnitSections::new(Vec::new(), strings(&["b"])));

        let result = PaperAssembler::new().assemble(&bank, 1, "X", &mut StdRng::seed_from_u64(0));
        match result {
            Err(PaperGenError::EmptyPool { unit, section }) => {
                assert_eq!(unit, "Unit I");
                assert_eq!(section, Section::A);
            }
            other => panic!("expected EmptyPool, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_subject_and_zero_set() {
        let bank = sample_bank();
        let mut rng = StdRng::seed_from_u64(0);
        let assembler = PaperAssembler::new();

        let paper = assembler.assemble(&bank, 1, "  ", &mut rng).unwrap();
        assert_eq!(paper.subject(), "Subject");

        assert!(matches!(
            assembler.assemble(&bank, 0, "X", &mut rng),
            Err(PaperGenError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_configurable_section_b_start() {
        let bank = sample_bank();
        let paper = PaperAssembler::new()
            .with_section_b_start(3)
            .assemble(&bank, 1, "X", &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(paper.either_or_items()[0].0, 3);
    }

    #[test]
    fn test_section_b_is_one_pair_per_unit_whatever_the_a_count() {
        let bank = sample_bank();

        for per_unit in [1, 3] {
            let config = PaperConfig {
                questions_per_unit: per_unit,
                ..PaperConfig::default()
            };
            let paper = PaperAssembler::from_config(&config)
                .assemble(&bank, 1, "X", &mut StdRng::seed_from_u64(4))
                .unwrap();

            assert_eq!(paper.section_a_questions().len(), per_unit);
            let items = paper.either_or_items();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].0, 11);
            assert!(paper.to_plain_text().contains("OR"));
        }
    }
}
