//! Page layout for classified report lines.
//!
//! Produces positioned drawing operations on A4 pages, top-left origin, in
//! millimetres. Nothing here touches PDF objects, so layouts can be checked
//! directly in tests.

use crate::report::classifier::ReportLine;
use crate::report::font_metrics::{HELVETICA, PT_TO_MM};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
/// Content may not extend below `PAGE_HEIGHT_MM - BREAK_MARGIN_MM`.
const BREAK_MARGIN_MM: f32 = 20.0;
/// Horizontal padding inside a cell.
const CELL_PADDING_MM: f32 = 1.0;
const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

const TITLE_SIZE_PT: f32 = 12.0;
const TITLE_HEIGHT_MM: f32 = 8.0;
const TITLE_GAP_MM: f32 = 5.0;

const HEADING_SIZE_PT: f32 = 11.0;
const HEADING_HEIGHT_MM: f32 = 6.0;
const HEADING_GAP_MM: f32 = 3.0;

const BODY_SIZE_PT: f32 = 10.0;
const BODY_LINE_MM: f32 = 5.0;

const BULLET_INDENT_MM: f32 = 5.0;
pub const BULLET_GLYPH: &str = "\u{2022} ";

const TABLE_SIZE_PT: f32 = 9.0;
const TABLE_ROW_MM: f32 = 6.0;
/// Fixed table column widths.
pub const TABLE_COLUMNS_MM: [f32; 4] = [50.0, 35.0, 35.0, 35.0];

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text with its baseline at `baseline` mm from the top of the page.
    Text {
        x: f32,
        baseline: f32,
        size_pt: f32,
        text: String,
    },
    /// Stroked rectangle, `y` is the top edge.
    Rect { x: f32, y: f32, w: f32, h: f32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<PageLayout>,
}

impl ReportLayout {
    #[cfg(test)]
    pub fn ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.pages.iter().flat_map(|p| p.ops.iter())
    }
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
}

/// Cursor over the page sequence. Starts a new page whenever the next block
/// would cross the bottom break line.
struct Cursor {
    pages: Vec<PageLayout>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![PageLayout::default()],
            y: MARGIN_MM,
        }
    }

    fn reserve(&mut self, height: f32) {
        if self.y + height > PAGE_HEIGHT_MM - BREAK_MARGIN_MM {
            self.pages.push(PageLayout::default());
            self.y = MARGIN_MM;
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// One cell of text, vertically centred in a row of `height` at the cursor.
    fn cell_text(&mut self, x: f32, width: f32, height: f32, size_pt: f32, text: &str, align: Align) {
        if text.is_empty() {
            return;
        }
        let text_x = match align {
            Align::Left => x + CELL_PADDING_MM,
            Align::Center => x + (width - HELVETICA.width_mm(text, size_pt)) / 2.0,
        };
        let baseline = self.y + height / 2.0 + 0.3 * size_pt * PT_TO_MM;
        self.push(DrawOp::Text {
            x: text_x,
            baseline,
            size_pt,
            text: text.to_string(),
        });
    }

    /// Wrapped paragraph, one line of `line_height` per wrapped line.
    fn paragraph(&mut self, x: f32, width: f32, size_pt: f32, line_height: f32, text: &str) {
        let lines = HELVETICA.wrap(text, size_pt, width - 2.0 * CELL_PADDING_MM);
        for line in lines {
            self.reserve(line_height);
            self.cell_text(x, width, line_height, size_pt, &line, Align::Left);
            self.y += line_height;
        }
    }
}

/// Lays out a candidate report: a title line followed by the classified lines.
pub fn layout_report(candidate_name: &str, lines: &[ReportLine]) -> ReportLayout {
    let mut cursor = Cursor::new();

    cursor.cell_text(
        MARGIN_MM,
        CONTENT_WIDTH_MM,
        TITLE_HEIGHT_MM,
        TITLE_SIZE_PT,
        &format!("Candidate Report: {candidate_name}"),
        Align::Left,
    );
    cursor.y += TITLE_HEIGHT_MM + TITLE_GAP_MM;

    for line in lines {
        match line {
            ReportLine::Heading(section) => {
                cursor.reserve(HEADING_HEIGHT_MM);
                cursor.cell_text(
                    MARGIN_MM,
                    CONTENT_WIDTH_MM,
                    HEADING_HEIGHT_MM,
                    HEADING_SIZE_PT,
                    &section.heading(),
                    Align::Left,
                );
                cursor.y += HEADING_HEIGHT_MM + HEADING_GAP_MM;
            }
            ReportLine::Bullet(item) => {
                cursor.paragraph(
                    MARGIN_MM + BULLET_INDENT_MM,
                    CONTENT_WIDTH_MM - BULLET_INDENT_MM,
                    BODY_SIZE_PT,
                    BODY_LINE_MM,
                    &format!("{BULLET_GLYPH}{item}"),
                );
            }
            ReportLine::TableRow(cells) => {
                cursor.reserve(TABLE_ROW_MM);
                let mut x = MARGIN_MM;
                for (i, (cell, width)) in cells.iter().zip(TABLE_COLUMNS_MM).enumerate() {
                    cursor.push(DrawOp::Rect {
                        x,
                        y: cursor.y,
                        w: width,
                        h: TABLE_ROW_MM,
                    });
                    let fitted =
                        HELVETICA.truncate(cell, TABLE_SIZE_PT, width - 2.0 * CELL_PADDING_MM);
                    let align = if i == 0 { Align::Left } else { Align::Center };
                    cursor.cell_text(x, width, TABLE_ROW_MM, TABLE_SIZE_PT, &fitted, align);
                    x += width;
                }
                cursor.y += TABLE_ROW_MM;
            }
            ReportLine::Text(text) => {
                cursor.paragraph(MARGIN_MM, CONTENT_WIDTH_MM, BODY_SIZE_PT, BODY_LINE_MM, text);
            }
            ReportLine::Blank => {
                cursor.reserve(BODY_LINE_MM);
                cursor.y += BODY_LINE_MM;
            }
            ReportLine::Dropped => {}
        }
    }

    ReportLayout {
        pages: cursor.pages,
    }
}
