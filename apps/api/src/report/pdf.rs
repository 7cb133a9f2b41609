//! Writes a `ReportLayout` as a PDF with `printpdf`.

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

use crate::report::layout::{DrawOp, ReportLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::report::RenderError;

const LAYER_NAME: &str = "Report";
const BORDER_THICKNESS_PT: f32 = 0.5;

/// Serialises the layout to PDF bytes. Every layout page becomes one PDF page.
pub fn render_pdf(title: &str, layout: &ReportLayout) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    for (i, page) in layout.pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            doc.get_page(page_idx).get_layer(layer_idx)
        };
        layer.set_outline_thickness(BORDER_THICKNESS_PT);

        for op in &page.ops {
            draw(&layer, &font, op);
        }
    }

    doc.save_to_bytes()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn draw(layer: &PdfLayerReference, font: &IndirectFontRef, op: &DrawOp) {
    match op {
        DrawOp::Text {
            x,
            baseline,
            size_pt,
            text,
        } => {
            layer.use_text(
                to_base_font_text(text),
                *size_pt,
                Mm(*x),
                Mm(PAGE_HEIGHT_MM - baseline),
                font,
            );
        }
        DrawOp::Rect { x, y, w, h } => {
            let top = PAGE_HEIGHT_MM - y;
            let bottom = top - h;
            let corners = [
                (*x, top),
                (x + w, top),
                (x + w, bottom),
                (*x, bottom),
            ];
            layer.add_line(Line {
                points: corners
                    .iter()
                    .map(|(px, py)| (Point::new(Mm(*px), Mm(*py)), false))
                    .collect(),
                is_closed: true,
            });
        }
    }
}

/// Maps typographic punctuation the model likes to emit onto characters the
/// PDF base fonts can show; anything outside Latin-1 besides the bullet
/// becomes `?`.
pub fn to_base_font_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201F}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2026}' => '.',
            '\u{00A0}' | '\t' => ' ',
            '\u{2022}' => '\u{2022}',
            c if (c as u32) < 0x100 && !c.is_control() => c,
            _ => '?',
        })
        .collect()
}
