//! PDF output for assembled papers.
//!
//! Uses the standard Helvetica faces, so no fonts are embedded. Text is
//! encoded as WinAnsi; characters outside it print as `?`.

use super::document::{AssembledPaper, Block};
use crate::config::LayoutConfig;
use crate::error::{PaperGenError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::fs;
use std::path::{Path, PathBuf};

const POINTS_PER_INCH: f32 = 72.0;
// Average Helvetica advance as a fraction of the font size.
const AVERAGE_CHAR_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn resource_name(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
}

struct StyledLine {
    text: String,
    face: Face,
    size: f32,
    align: Align,
    indent: f32,
}

/// Lays text out top to bottom, starting a new page when the bottom margin
/// is reached.
struct PageWriter<'a> {
    layout: &'a LayoutConfig,
    pages: Vec<Vec<Operation>>,
    cursor_y: f32,
}

impl<'a> PageWriter<'a> {
    fn new(layout: &'a LayoutConfig) -> Self {
        Self {
            layout,
            pages: vec![Vec::new()],
            cursor_y: layout.page_height - layout.margin,
        }
    }

    fn advance(&mut self, height: f32) {
        if self.cursor_y - height < self.layout.margin {
            self.pages.push(Vec::new());
            self.cursor_y = self.layout.page_height - self.layout.margin;
        }
        self.cursor_y -= height;
    }

    fn space(&mut self, points: f32) {
        self.cursor_y -= points;
        if self.cursor_y < self.layout.margin {
            self.pages.push(Vec::new());
            self.cursor_y = self.layout.page_height - self.layout.margin;
        }
    }

    fn write(&mut self, line: &StyledLine) {
        let usable = self.layout.page_width - 2.0 * self.layout.margin - line.indent;
        let max_chars = ((usable / (line.size * AVERAGE_CHAR_WIDTH)) as usize).max(1);
        let leading = line.size.max(self.layout.leading * line.size / self.layout.body_size);

        for (index, segment) in wrap_text(&line.text, max_chars).into_iter().enumerate() {
            self.advance(leading);
            let width = segment.chars().count() as f32 * line.size * AVERAGE_CHAR_WIDTH;
            let x = match line.align {
                Align::Center => ((self.layout.page_width - width) / 2.0).max(self.layout.margin),
                Align::Left if index == 0 => self.layout.margin + line.indent,
                // continuation lines hang under the question text
                Align::Left => self.layout.margin + line.indent + hanging_indent(&line.text, line.size),
            };

            if let Some(ops) = self.pages.last_mut() {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![line.face.resource_name().into(), line.size.into()],
                ));
                ops.push(Operation::new("Td", vec![x.into(), self.cursor_y.into()]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(&segment), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }
}

pub struct PdfRenderer {
    layout: LayoutConfig,
}

impl PdfRenderer {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Write `paper` as `<dest_dir>/<file_name>` and return the path.
    pub fn render_to_file(&self, paper: &AssembledPaper, dest_dir: &Path, file_name: &str) -> Result<PathBuf> {
        let bytes = self.render_blocks(paper.blocks())?;
        let path = dest_dir.join(file_name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn render_blocks(&self, blocks: &[Block]) -> Result<Vec<u8>> {
        let mut writer = PageWriter::new(&self.layout);
        let body = self.layout.body_size;

        for block in blocks {
            match block {
                Block::Title(text) => writer.write(&StyledLine {
                    text: text.clone(),
                    face: Face::Bold,
                    size: self.layout.title_size,
                    align: Align::Center,
                    indent: 0.0,
                }),
                Block::SetLabel(text) => writer.write(&StyledLine {
                    text: text.clone(),
                    face: Face::Bold,
                    size: self.layout.heading_size,
                    align: Align::Center,
                    indent: 0.0,
                }),
                Block::SectionHeader(text) => {
                    writer.space(self.layout.leading / 2.0);
                    writer.write(&StyledLine {
                        text: text.clone(),
                        face: Face::Bold,
                        size: self.layout.heading_size,
                        align: Align::Left,
                        indent: 0.0,
                    });
                    writer.space(self.layout.leading / 2.0);
                }
                Block::Spacer(inches) => writer.space(inches * POINTS_PER_INCH),
                Block::Question { .. } | Block::EitherOr { .. } => {
                    for line in block.lines() {
                        writer.write(&StyledLine {
                            text: line,
                            face: Face::Regular,
                            size: body,
                            align: Align::Left,
                            indent: 0.0,
                        });
                    }
                }
            }
        }

        self.build_document(writer.pages)
    }

    fn build_document(&self, pages: Vec<Vec<Operation>>) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                Face::Regular.resource_name() => regular_id,
                Face::Bold.resource_name() => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let page_id = self.add_page(&mut doc, pages_id, operations)?;
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.layout.page_width),
                Object::Real(self.layout.page_height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn add_page(&self, doc: &mut Document, pages_id: ObjectId, operations: Vec<Operation>) -> Result<ObjectId> {
        let content = Content { operations };
        let encoded = content.encode().map_err(|e| PaperGenError::Render {
            message: e.to_string(),
        })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        }))
    }
}

/// Greedy word wrap to at most `max_chars` characters per line. Words longer
/// than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    // keep leading spaces, they carry the "     OR" indentation
    let leading: String = text.chars().take_while(|c| *c == ' ').collect();
    current.push_str(&leading);

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let used = current.chars().count();
            let needed = if used == 0 || current.trim().is_empty() {
                word.len()
            } else {
                word.len() + 1
            };

            if used + needed <= max_chars {
                if used > 0 && !current.trim().is_empty() {
                    current.push(' ');
                }
                current.extend(word.iter());
                break;
            }

            if current.trim().is_empty() {
                let room = max_chars.saturating_sub(used).max(1);
                let rest = word.split_off(room.min(word.len()));
                current.extend(word.iter());
                lines.push(std::mem::take(&mut current));
                word = rest;
                if word.is_empty() {
                    break;
                }
            } else {
                lines.push(std::mem::take(&mut current));
            }
        }
    }

    if !current.trim().is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn hanging_indent(text: &str, size: f32) -> f32 {
    // width of "12. " or "     (b) " so wrapped lines align with the question
    let rest = text.trim_start();
    let mut prefix = text.len() - rest.len();

    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    let rest = match rest[digits..].strip_prefix(". ") {
        Some(after) if digits > 0 => {
            prefix += digits + 2;
            after
        }
        _ => rest,
    };
    if rest.starts_with("(a) ") || rest.starts_with("(b) ") {
        prefix += 4;
    }

    prefix as f32 * size * AVERAGE_CHAR_WIDTH
}

/// Encode as WinAnsi (Windows-1252); unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}
