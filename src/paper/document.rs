use serde::Serialize;

/// One rendered element of a question paper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Block {
    Title(String),
    SetLabel(String),
    SectionHeader(String),
    /// A numbered Section A line, or the first half of a Section B pair.
    Question { number: u32, text: String },
    /// The "(a) ... OR (b) ..." item of Section B.
    EitherOr {
        number: u32,
        first: String,
        second: String,
    },
    /// Vertical gap, in inches.
    Spacer(f32),
}

impl Block {
    /// Printed lines for this block, without any layout applied.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Block::Title(text) | Block::SetLabel(text) | Block::SectionHeader(text) => {
                vec![text.clone()]
            }
            Block::Question { number, text } => vec![format!("{}. {}", number, text)],
            Block::EitherOr {
                number,
                first,
                second,
            } => vec![
                format!("{}. (a) {}", number, first),
                "     OR".to_string(),
                format!("     (b) {}", second),
            ],
            Block::Spacer(_) => Vec::new(),
        }
    }
}

/// A finished paper for one set. Built once by the assembler, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledPaper {
    set_number: u32,
    subject: String,
    blocks: Vec<Block>,
}

impl AssembledPaper {
    pub(crate) fn new(set_number: u32, subject: String, blocks: Vec<Block>) -> Self {
        Self {
            set_number,
            subject,
            blocks,
        }
    }

    pub fn set_number(&self) -> u32 {
        self.set_number
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// `<prefix><set>.pdf`, e.g. `Question_Paper_Set_3.pdf`.
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}{}.pdf", prefix, self.set_number)
    }

    pub fn section_a_questions(&self) -> Vec<&str> {
        let mut in_section_b = false;
        let mut questions = Vec::new();
        for block in &self.blocks {
            match block {
                Block::SectionHeader(header) => {
                    in_section_b = header.starts_with("Section B");
                }
                Block::Question { text, .. } if !in_section_b => questions.push(text.as_str()),
                _ => {}
            }
        }
        questions
    }

    pub fn either_or_items(&self) -> Vec<(u32, &str, &str)> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::EitherOr {
                    number,
                    first,
                    second,
                } => Some((*number, first.as_str(), second.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Spacer(_) => out.push('\n'),
                other => {
                    for line in other.lines() {
                        out.push_str(&line);
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}
