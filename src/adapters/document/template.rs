//! Fixed exam page template.
//!
//! Describes *what* goes on the page, in order, as a list of text blocks.
//! Placement on physical pages is done by `layout`.

use crate::domain::exam::{CopyLabel, Exam};

/// Horizontal alignment of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One logical line of text before wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub text: String,
    pub align: Align,
    pub font_size: f32,
    pub leading: f32,
    /// Extra vertical space after the block.
    pub space_after: f32,
}

impl Block {
    fn new(text: impl Into<String>, align: Align, font_size: f32) -> Self {
        Self {
            text: text.into(),
            align,
            font_size,
            leading: font_size * 1.35,
            space_after: 0.0,
        }
    }

    fn then_space(mut self, space: f32) -> Self {
        self.space_after = space;
        self
    }
}

const TITLE_SIZE: f32 = 16.0;
const VERSION_SIZE: f32 = 11.0;
const HEADER_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 12.0;
const PARAGRAPH_BREAK: f32 = 12.0;

/// Institutional header printed under the exam title.
///
/// Fixed for the lifetime of the renderer, so it never breaks rendering
/// determinism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
    institution_lines: [String; 3],
    date_line: String,
    version_prefix: String,
}

impl DocumentTemplate {
    pub fn new(
        university: impl Into<String>,
        department: impl Into<String>,
        course: impl Into<String>,
        date_line: impl Into<String>,
    ) -> Self {
        Self {
            institution_lines: [university.into(), department.into(), course.into()],
            date_line: date_line.into(),
            version_prefix: "Version".to_string(),
        }
    }

    pub fn institution_lines(&self) -> &[String; 3] {
        &self.institution_lines
    }

    pub fn date_line(&self) -> &str {
        &self.date_line
    }

    /// Text of the version line for a labelled copy.
    pub fn version_line(&self, label: CopyLabel) -> Option<String> {
        label
            .number()
            .map(|n| format!("{}: {}", self.version_prefix, n))
    }

    /// The page content for `exam`, in print order.
    ///
    /// Title, optional version line, institutional lines, date placeholder,
    /// then every question as `"{n}. {prompt}"` followed by a paragraph break.
    pub fn blocks(&self, exam: &Exam, label: CopyLabel) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(6 + exam.question_count());

        blocks.push(Block::new(exam.title(), Align::Center, TITLE_SIZE).then_space(6.0));

        if let Some(version) = self.version_line(label) {
            blocks.push(Block::new(version, Align::Right, VERSION_SIZE).then_space(4.0));
        }

        for line in &self.institution_lines {
            blocks.push(Block::new(line.as_str(), Align::Center, HEADER_SIZE));
        }
        blocks.push(
            Block::new(self.date_line.as_str(), Align::Center, HEADER_SIZE).then_space(18.0),
        );

        for (index, prompt) in exam.questions().iter().enumerate() {
            blocks.push(
                Block::new(format!("{}. {}", index + 1, prompt), Align::Left, BODY_SIZE)
                    .then_space(PARAGRAPH_BREAK),
            );
        }

        blocks
    }
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self::new(
            "Universidade Federal de Pernambuco",
            "Centro de Informática",
            "Engenharia de Software e Sistemas",
            "Data: ____/____/________",
        )
    }
}
