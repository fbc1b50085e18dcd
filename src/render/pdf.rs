use std::path::Path;

use encoding_rs::WINDOWS_1252;
use genpdf::elements::{Break, LinearLayout, PageBreak, Paragraph};
use genpdf::fonts::{Font, FontFamily};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Document, Element, Margins, PaperSize, SimplePageDecorator};

use super::fonts::FontSet;
use super::{BlockSink, BuildError, RenderError};
use crate::document::Block;

/// 0.7 inch.
const MARGIN_MM: f64 = 17.78;
const BODY_FONT_SIZE: u8 = 10;
const CODE_FONT_SIZE: u8 = 7;
const LINE_SPACING: f64 = 1.4;
/// Width of one leading space in 7pt Courier.
const CODE_INDENT_MM: f64 = 1.48;
const PAPER_WIDTH_MM: f64 = 210.0;
/// Widest horizontal padding any block adds inside the margins.
const PADDING_ALLOWANCE_MM: f64 = 8.0;
const MM_PER_PT: f64 = 25.4 / 72.0;

const INK: Color = Color::Rgb(0x33, 0x33, 0x33);
const HEADING: Color = Color::Rgb(0x2c, 0x3e, 0x50);
const MUTED: Color = Color::Rgb(0x55, 0x55, 0x55);

/// genpdf-backed sink producing an A4 PDF.
pub struct PdfSink {
    doc: Document,
    code_family: Option<FontFamily<Font>>,
    body_builtin: bool,
    code_builtin: bool,
}

impl PdfSink {
    pub fn new(fonts: FontSet, title: &str) -> Self {
        let mut doc = Document::new(fonts.body);
        doc.set_title(title);
        doc.set_paper_size(PaperSize::A4);
        doc.set_font_size(BODY_FONT_SIZE);
        doc.set_line_spacing(LINE_SPACING);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(MARGIN_MM);
        decorator.set_header(|page| {
            Paragraph::new(format!("- {} -", page))
                .aligned(Alignment::Center)
                .styled(Style::new().with_font_size(7).with_color(MUTED))
        });
        doc.set_page_decorator(decorator);

        let code_family = fonts.code.map(|f| doc.add_font_family(f));
        PdfSink {
            doc,
            code_family,
            body_builtin: fonts.body_builtin,
            code_builtin: fonts.code_builtin,
        }
    }

    fn push_text(
        &mut self,
        text: &str,
        font_size: u8,
        style: Style,
        alignment: Alignment,
        padding: Margins,
    ) -> Result<(), RenderError> {
        let text = prepare_text(text, self.body_builtin)?;
        let text = break_long_runs(&text, run_budget(font_size, text_width_mm()));
        self.doc.push(
            Paragraph::new(text)
                .aligned(alignment)
                .styled(style.with_font_size(font_size))
                .padded(padding),
        );
        Ok(())
    }

    /// One paragraph per line so line structure survives wrapping; leading
    /// spaces become left padding.
    fn push_code(&mut self, code: &str) -> Result<(), RenderError> {
        if code.trim().is_empty() {
            return Err(RenderError::Empty);
        }
        let mut style = Style::new().with_font_size(CODE_FONT_SIZE).with_color(INK);
        match self.code_family.clone() {
            Some(family) if check_glyphs(code, self.code_builtin).is_ok() => {
                style = style.with_font_family(family);
            }
            _ => check_glyphs(code, self.body_builtin)?,
        }

        let mut layout = LinearLayout::vertical();
        for line in code.lines() {
            let body = line.trim_start();
            if body.is_empty() {
                layout.push(Break::new(0.5));
                continue;
            }
            let indent_mm = (line.chars().count() - body.chars().count()) as f64 * CODE_INDENT_MM;
            let width = (text_width_mm() - indent_mm).max(CODE_INDENT_MM);
            layout.push(
                Paragraph::new(break_long_runs(body, run_budget(CODE_FONT_SIZE, width)))
                    .styled(style)
                    .padded(Margins::trbl(0.0, 0.0, 0.0, indent_mm)),
            );
        }
        self.doc.push(layout.padded(Margins::trbl(1.0, 4.0, 2.0, 4.0)));
        Ok(())
    }
}

impl BlockSink for PdfSink {
    fn render(&mut self, block: &Block) -> Result<(), RenderError> {
        let none = || Margins::trbl(0.0, 0.0, 0.0, 0.0);
        match block {
            Block::Title(t) => self.push_text(
                t,
                28,
                Style::new().bold().with_color(Color::Rgb(0x1a, 0x1a, 0x1a)),
                Alignment::Center,
                Margins::trbl(0.0, 0.0, 4.0, 0.0),
            ),
            Block::Subtitle(t) => self.push_text(
                t,
                11,
                Style::new().with_color(MUTED),
                Alignment::Center,
                none(),
            ),
            Block::TocHeading(t) => self.push_text(
                t,
                18,
                Style::new().bold(),
                Alignment::Left,
                none(),
            ),
            Block::TocGroup(t) => self.push_text(
                t,
                11,
                Style::new().bold().with_color(HEADING),
                Alignment::Left,
                Margins::trbl(2.8, 0.0, 1.0, 2.5),
            ),
            Block::TocEntry { .. } => {
                let text = block.text().unwrap_or_default();
                self.push_text(
                    &text,
                    BODY_FONT_SIZE,
                    Style::new(),
                    Alignment::Left,
                    Margins::trbl(0.0, 0.0, 0.8, 7.6),
                )
            }
            Block::SectionHeading(t) => self.push_text(
                t,
                14,
                Style::new().bold().with_color(HEADING),
                Alignment::Left,
                Margins::trbl(4.2, 0.0, 3.5, 0.0),
            ),
            Block::Paragraph(t) => self.push_text(
                t,
                BODY_FONT_SIZE,
                Style::new().with_color(INK),
                Alignment::Left,
                Margins::trbl(0.0, 0.0, 2.8, 0.0),
            ),
            Block::CodeLabel(t) => self.push_text(
                t,
                9,
                Style::new().bold().with_color(MUTED),
                Alignment::Left,
                Margins::trbl(2.8, 0.0, 2.0, 0.0),
            ),
            Block::Code(code) => self.push_code(code),
            Block::Spacer(inches) => {
                self.doc.push(Break::new(spacer_lines(*inches)));
                Ok(())
            }
            Block::PageBreak => {
                self.doc.push(PageBreak::new());
                Ok(())
            }
        }
    }

    fn finish(self, path: &Path) -> Result<(), BuildError> {
        self.doc
            .render_to_file(path)
            .map_err(|source| BuildError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Single-line printable text, checked against the font's coverage.
fn prepare_text(text: &str, builtin: bool) -> Result<String, RenderError> {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    if flat.is_empty() {
        return Err(RenderError::Empty);
    }
    check_glyphs(flat, builtin)?;
    Ok(flat.to_string())
}

/// Built-in PDF fonts are written as Windows-1252.
fn check_glyphs(text: &str, builtin: bool) -> Result<(), RenderError> {
    if !builtin {
        return Ok(());
    }
    match text.chars().find(|&c| !in_windows_1252(c)) {
        Some(c) => Err(RenderError::UnsupportedGlyph(c)),
        None => Ok(()),
    }
}

/// C1 controls share code points with the 1252 punctuation block, so they
/// are excluded before asking the encoder.
fn in_windows_1252(c: char) -> bool {
    if ('\u{80}'..='\u{9f}').contains(&c) {
        return false;
    }
    let mut buf = [0u8; 4];
    let (_, _, unmappable) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
    !unmappable
}

fn text_width_mm() -> f64 {
    PAPER_WIDTH_MM - 2.0 * MARGIN_MM - PADDING_ALLOWANCE_MM
}

/// Characters per line assuming every glyph is a full em wide.
fn run_budget(font_size: u8, width_mm: f64) -> usize {
    ((width_mm / (f64::from(font_size) * MM_PER_PT)) as usize).max(1)
}

/// genpdf wraps only at spaces and drops a word wider than the line, so
/// longer runs are cut into pieces of at most `max_chars`.
fn break_long_runs(text: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;
    for c in text.chars() {
        if c == ' ' {
            run = 0;
        } else {
            if run == max_chars {
                out.push(' ');
                run = 0;
            }
            run += 1;
        }
        out.push(c);
    }
    out
}

/// Convert a spacer height to body-text lines.
fn spacer_lines(inches: f64) -> f64 {
    inches * 72.0 / (f64::from(BODY_FONT_SIZE) * LINE_SPACING)
}
