//! Plain-text PDF transcription of a report.
//!
//! Layout is computed separately from rendering so it can be inspected
//! directly. The title is drawn once on the first page; every source line
//! becomes exactly one drawn line, in order, with no Markdown formatting.
//! When the next line would cross the bottom margin a new page begins. Long
//! lines are not wrapped.
//!
//! The builtin fonts only cover WinAnsi. Characters outside it (emoji, CJK,
//! most symbols) are drawn as `?` and tabs as four spaces.
//!
//! The trailer `/ID` is derived from the drawn text, so rendering the same
//! report twice yields the same bytes apart from the creation and
//! modification dates.

use chrono::NaiveDate;
use printpdf::lopdf::{self, Object, StringFormat};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, Pt};
use sha2::{Digest, Sha256};

use crate::{ExportArtifact, ExportFormat, ReportError};

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 841.89;
/// One inch.
pub const MARGIN: f32 = 72.0;

pub const TITLE_SIZE: f32 = 14.0;
pub const BODY_SIZE: f32 = 10.0;
/// Baseline-to-baseline distance for body text (1.2 x size).
pub const LEADING: f32 = 12.0;
/// Body starts half an inch below the title.
const BODY_TOP_FIRST_PAGE: f32 = PAGE_HEIGHT - 1.5 * MARGIN;
const BODY_TOP: f32 = PAGE_HEIGHT - MARGIN;

pub const REPORT_TITLE: &str = "Substation Inspection Report";

/// Drawn in place of characters the builtin fonts cannot encode.
pub const REPLACEMENT_CHAR: char = '?';
const TAB_SPACES: &str = "    ";
const WIN_ANSI: &str = "WinAnsiEncoding";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfFont {
    Helvetica,
    HelveticaBold,
}

/// One text run at a fixed position, in points from the bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnLine {
    pub text: String,
    pub font: PdfFont,
    pub size: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfPage {
    pub lines: Vec<DrawnLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfLayout {
    pub title: String,
    pub pages: Vec<PdfPage>,
}

impl PdfLayout {
    pub fn from_text(title: &str, text: &str) -> Self {
        let mut first = PdfPage::default();
        first.lines.push(DrawnLine {
            text: title.to_string(),
            font: PdfFont::HelveticaBold,
            size: TITLE_SIZE,
            x: MARGIN,
            y: PAGE_HEIGHT - MARGIN,
        });

        let mut pages = Vec::new();
        let mut current = first;
        let mut y = BODY_TOP_FIRST_PAGE;
        let mut replaced = 0;

        for line in text.split('\n') {
            if y < MARGIN {
                pages.push(std::mem::take(&mut current));
                y = BODY_TOP;
            }
            let (drawable, count) = to_win_ansi(line.strip_suffix('\r').unwrap_or(line));
            replaced += count;
            current.lines.push(DrawnLine {
                text: drawable,
                font: PdfFont::Helvetica,
                size: BODY_SIZE,
                x: MARGIN,
                y,
            });
            y -= LEADING;
        }
        pages.push(current);

        if replaced > 0 {
            tracing::warn!(
                replaced,
                "report contains characters the pdf fonts cannot draw; replaced with '?'"
            );
        }

        Self {
            title: title.to_string(),
            pages,
        }
    }

    /// Body lines across all pages, in drawing order (title excluded).
    pub fn body_lines(&self) -> impl Iterator<Item = &DrawnLine> {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .filter(|l| l.font == PdfFont::Helvetica)
    }

    /// Identifier pair for the trailer `/ID`, taken from a SHA-256 of
    /// every drawn line.
    fn document_ids(&self) -> (String, String) {
        let mut hasher = Sha256::new();
        for line in self.pages.iter().flat_map(|p| p.lines.iter()) {
            hasher.update(line.text.as_bytes());
            hasher.update(b"\n");
        }
        let digest = hex::encode(hasher.finalize());
        let (document, instance) = digest.split_at(32);
        (document.to_string(), instance.to_string())
    }
}

/// Rewrites `line` so every character has a WinAnsi code, returning the
/// number of characters replaced.
fn to_win_ansi(line: &str) -> (String, usize) {
    let mut out = String::with_capacity(line.len());
    let mut replaced = 0;
    for ch in line.chars() {
        if ch == '\t' {
            out.push_str(TAB_SPACES);
        } else if win_ansi_encodable(ch) {
            out.push(ch);
        } else {
            out.push(REPLACEMENT_CHAR);
            replaced += 1;
        }
    }
    (out, replaced)
}

fn win_ansi_encodable(ch: char) -> bool {
    let mut buf = [0u8; 4];
    lopdf::Document::encode_text(Some(WIN_ANSI), ch.encode_utf8(&mut buf)).len() == 1
}

/// Draws `layout` with the builtin Helvetica fonts and returns the file bytes.
pub fn render_pdf(layout: &PdfLayout) -> Result<Vec<u8>, ReportError> {
    let page_w = Mm::from(Pt(PAGE_WIDTH));
    let page_h = Mm::from(Pt(PAGE_HEIGHT));
    let (doc, first_page, first_layer) = PdfDocument::new(&layout.title, page_w, page_h, "text");

    let regular = builtin_font(&doc, BuiltinFont::Helvetica)?;
    let bold = builtin_font(&doc, BuiltinFont::HelveticaBold)?;

    let mut targets = vec![(first_page, first_layer)];
    for _ in 1..layout.pages.len() {
        targets.push(doc.add_page(page_w, page_h, "text"));
    }

    for (page, (page_ref, layer_ref)) in layout.pages.iter().zip(targets) {
        let layer = doc.get_page(page_ref).get_layer(layer_ref);

        for line in page.lines.iter().filter(|l| !l.text.is_empty()) {
            let font = match line.font {
                PdfFont::Helvetica => &regular,
                PdfFont::HelveticaBold => &bold,
            };
            layer.use_text(
                line.text.as_str(),
                line.size,
                Mm::from(Pt(line.x)),
                Mm::from(Pt(line.y)),
                font,
            );
        }
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
    with_stable_id(&bytes, layout.document_ids())
}

/// printpdf fills `/ID` with random strings; reload the output and
/// replace them.
fn with_stable_id(
    bytes: &[u8],
    (document, instance): (String, String),
) -> Result<Vec<u8>, ReportError> {
    let mut doc =
        lopdf::Document::load_mem(bytes).map_err(|e| ReportError::Pdf(e.to_string()))?;
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(document.into_bytes(), StringFormat::Literal),
            Object::String(instance.into_bytes(), StringFormat::Literal),
        ]),
    );

    let mut out = Vec::with_capacity(bytes.len());
    doc.save_to(&mut out)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    Ok(out)
}

fn builtin_font(
    doc: &PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, ReportError> {
    doc.add_builtin_font(font)
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))
}

/// The report as a `.pdf` download.
pub fn pdf_export(report: &str, date: NaiveDate) -> Result<ExportArtifact, ReportError> {
    let layout = PdfLayout::from_text(REPORT_TITLE, report);
    let bytes = render_pdf(&layout)?;
    tracing::debug!(
        pages = layout.pages.len(),
        bytes = bytes.len(),
        "pdf rendered"
    );
    Ok(ExportArtifact::new(ExportFormat::Pdf, date, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_then_one_line_per_source_line() {
        let layout = PdfLayout::from_text(REPORT_TITLE, "## Summary\nAll intact");
        assert_eq!(layout.pages.len(), 1);

        let title = &layout.pages[0].lines[0];
        assert_eq!(title.text, REPORT_TITLE);
        assert_eq!(title.font, PdfFont::HelveticaBold);
        assert_eq!(title.size, TITLE_SIZE);
        assert_eq!((title.x, title.y), (MARGIN, PAGE_HEIGHT - MARGIN));

        let body: Vec<_> = layout.body_lines().collect();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].text, "## Summary");
        assert_eq!(body[1].text, "All intact");
        assert_eq!(body[0].y, PAGE_HEIGHT - 108.0);
        assert!((body[0].y - body[1].y - LEADING).abs() < 1e-3);
        assert!(body.iter().all(|l| l.size == BODY_SIZE && l.x == MARGIN));
    }

    #[test]
    fn markdown_is_kept_literal() {
        let text = "| Towers | 3 |\n**bold** and _em_";
        let body: Vec<_> = PdfLayout::from_text("t", text)
            .body_lines()
            .map(|l| l.text.clone())
            .collect();
        assert_eq!(body, vec!["| Towers | 3 |", "**bold** and _em_"]);
    }

    #[test]
    fn crlf_and_blank_lines_are_preserved_as_lines() {
        let body: Vec<_> = PdfLayout::from_text("t", "a\r\n\r\nb\n")
            .body_lines()
            .map(|l| l.text.clone())
            .collect();
        assert_eq!(body, vec!["a", "", "b", ""]);
    }

    #[test]
    fn overflow_starts_new_page_in_order() {
        let text: Vec<String> = (0..200).map(|i| format!("line {i}")).collect();
        let layout = PdfLayout::from_text("t", &text.join("\n"));

        assert!(layout.pages.len() > 1);
        let body: Vec<_> = layout.body_lines().map(|l| l.text.clone()).collect();
        assert_eq!(body, text);

        for page in &layout.pages {
            assert!(page.lines.iter().all(|l| l.y >= MARGIN));
        }
        let second_first = &layout.pages[1].lines[0];
        assert_eq!(second_first.y, PAGE_HEIGHT - MARGIN);
        assert_eq!(second_first.font, PdfFont::Helvetica);
    }

    #[test]
    fn unencodable_characters_become_placeholders() {
        let text = "\u{2705} Intact\n\u{2705}\n\u{5909}\u{96fb}\n\tcaf\u{e9} \u{2014} 5\u{b0}C";
        let body: Vec<_> = PdfLayout::from_text("t", text)
            .body_lines()
            .map(|l| l.text.clone())
            .collect();
        assert_eq!(body, vec!["? Intact", "?", "??", "    caf\u{e9} \u{2014} 5\u{b0}C"]);
    }

    #[test]
    fn every_drawn_character_is_win_ansi() {
        let text = "\u{26a0}\u{fe0f} rust on tower 3 \u{1f50d}";
        let layout = PdfLayout::from_text(REPORT_TITLE, text);
        for line in layout.pages.iter().flat_map(|p| p.lines.iter()) {
            let encoded = lopdf::Document::encode_text(Some(WIN_ANSI), &line.text);
            assert_eq!(encoded.len(), line.text.chars().count(), "{:?}", line.text);
        }
    }

    #[test]
    fn document_ids_follow_the_text() {
        let a = PdfLayout::from_text(REPORT_TITLE, "All intact").document_ids();
        let b = PdfLayout::from_text(REPORT_TITLE, "All intact").document_ids();
        let c = PdfLayout::from_text(REPORT_TITLE, "Tower 2 damaged").document_ids();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.0.len(), 32);
        assert_eq!(a.1.len(), 32);
    }

    #[test]
    fn render_produces_pdf_bytes() {
        let layout = PdfLayout::from_text(REPORT_TITLE, "## Summary\nAll intact");
        let bytes = render_pdf(&layout).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
