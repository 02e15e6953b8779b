//! Vertical-cursor layout onto fixed US Letter pages.
//!
//! Page breaks depend only on the cursor position: each primitive checks its
//! own threshold before drawing and starts a new page when the cursor is
//! below it.

use serde::Serialize;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 40.0;
pub const LINE_HEIGHT: f32 = 14.0;
pub const VALUE_OFFSET: f32 = 250.0;
pub const WRAP_INDENT: f32 = 20.0;
pub const WRAP_COLUMNS: usize = 70;

const TITLE_SIZE: f32 = 16.0;
const SECTION_SIZE: f32 = 12.0;
const GROUP_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;
const CAPTION_SIZE: f32 = 9.0;
const FOOTER_SIZE: f32 = 8.0;

const SECTION_BREAK_BELOW: f32 = 80.0;
const GROUP_BREAK_BELOW: f32 = 250.0;
const LINE_BREAK_BELOW: f32 = MARGIN;
const FOOTER_BASELINE: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Pages ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutDocument {
    pub title: String,
    pub pages: Vec<Page>,
}

/// Splits on newlines, then into runs of at most `columns` characters.
pub fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let chars: Vec<char> = paragraph.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(chars.chunks(columns).map(|chunk| chunk.iter().collect()));
    }
    lines
}

pub struct LayoutCursor {
    title: String,
    pages: Vec<Page>,
    y: f32,
}

impl LayoutCursor {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: vec![Page::default()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    pub fn cursor(&self) -> f32 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn break_below(&mut self, threshold: f32) {
        if self.y < threshold {
            self.pages.push(Page::default());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text(&mut self, x: f32, size: f32, bold: bool, text: impl Into<String>) {
        let y = self.y;
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(DrawOp::Text {
                x,
                y,
                size,
                bold,
                text: text.into(),
            });
        }
    }

    fn rule(&mut self, thickness: f32) {
        let y = self.y;
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(DrawOp::Rule {
                x1: MARGIN,
                x2: PAGE_WIDTH - MARGIN,
                y,
                thickness,
            });
        }
    }

    pub fn heading(&mut self, title: &str, caption: &str) {
        self.text(MARGIN, TITLE_SIZE, true, title);
        self.y -= 20.0;
        self.text(MARGIN, CAPTION_SIZE, false, caption);
        self.y -= 30.0;
    }

    pub fn section(&mut self, title: &str) {
        self.break_below(SECTION_BREAK_BELOW);
        self.text(MARGIN, SECTION_SIZE, true, title);
        self.y -= 16.0;
        self.rule(1.0);
        self.y -= 20.0;
    }

    /// Sub-heading for a repeated entity; keeps the whole group on one page when it can.
    pub fn group(&mut self, title: &str) {
        self.break_below(GROUP_BREAK_BELOW);
        self.text(MARGIN, GROUP_SIZE, true, title);
        self.y -= 18.0;
    }

    pub fn note(&mut self, text: &str) {
        for line in wrap(text, WRAP_COLUMNS) {
            self.break_below(LINE_BREAK_BELOW);
            self.text(MARGIN, BODY_SIZE, false, line);
            self.y -= LINE_HEIGHT;
        }
    }

    /// `label:` at the margin and the value in the value column; long or
    /// multi-line values go on indented lines below the label.
    pub fn field(&mut self, label: &str, value: &str) {
        self.break_below(LINE_BREAK_BELOW);
        self.text(MARGIN, BODY_SIZE, false, format!("{label}:"));
        if value.chars().count() <= WRAP_COLUMNS && !value.contains('\n') {
            self.text(MARGIN + VALUE_OFFSET, BODY_SIZE, false, value);
            self.y -= LINE_HEIGHT;
            return;
        }

        self.y -= LINE_HEIGHT;
        for line in wrap(value, WRAP_COLUMNS) {
            self.break_below(LINE_BREAK_BELOW);
            self.text(MARGIN + WRAP_INDENT, BODY_SIZE, false, line);
            self.y -= LINE_HEIGHT;
        }
    }

    pub fn gap(&mut self, points: f32) {
        self.y -= points;
    }

    /// Stamps `<footer> - Page i of n` on every page and returns the document.
    pub fn finish(mut self, footer: &str) -> LaidOutDocument {
        let total = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.ops.push(DrawOp::Rule {
                x1: MARGIN,
                x2: PAGE_WIDTH - MARGIN,
                y: FOOTER_BASELINE + 12.0,
                thickness: 0.5,
            });
            page.ops.push(DrawOp::Text {
                x: MARGIN,
                y: FOOTER_BASELINE,
                size: FOOTER_SIZE,
                bold: false,
                text: format!("{footer} - Page {} of {total}", index + 1),
            });
        }
        LaidOutDocument {
            title: self.title,
            pages: self.pages,
        }
    }
}
