//! Multi-page PDF output for plotters charts.
//!
//! [`PdfDocument`] collects pages; each [`PdfPage`] is a plotters
//! [`DrawingBackend`] that records drawing calls into one PDF content stream.
//! Backend coordinates are PDF points with the origin in the top-left corner,
//! flipped to PDF's bottom-left origin when written. Text uses the standard
//! Helvetica font, so no font data is embedded.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    FontTransform,
};

/// A4 landscape page size in points.
pub const A4_LANDSCAPE: (u32, u32) = (842, 595);

const CATALOG_ID: i32 = 1;
const PAGE_TREE_ID: i32 = 2;
const FONT_ID: i32 = 3;
const INFO_ID: i32 = 4;
/// First object id used for page and content objects. Page `i` is object
/// `FIRST_PAGE_ID + 2i`, its content stream the object after it.
const FIRST_PAGE_ID: i32 = 5;

const FONT_NAME: Name<'static> = Name(b"F1");

/// Helvetica ascender height as a fraction of the font size.
const HELVETICA_ASCENT: f32 = 0.718;

/// Control point distance for approximating a quarter circle with a cubic.
const CIRCLE_KAPPA: f32 = 0.552_284_8;

/// Errors raised while drawing or assembling a PDF document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfError {
    /// A drawing call arrived after the page was presented.
    PageClosed,
    /// The document has more pages than PDF object ids can address.
    TooManyPages(usize),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageClosed => write!(f, "drawing on a page that was already presented"),
            Self::TooManyPages(n) => write!(f, "too many pages for one PDF document: {n}"),
        }
    }
}

impl std::error::Error for PdfError {}

/// An in-memory PDF document built one page at a time.
#[derive(Debug)]
pub struct PdfDocument {
    size: (u32, u32),
    title: Option<String>,
    pages: Vec<Vec<u8>>,
}

impl PdfDocument {
    /// Create an empty document whose pages are `size` points large.
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            size,
            title: None,
            pages: Vec::new(),
        }
    }

    /// Set the document title stored in the info dictionary.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Page size in points.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Start a new page. The page is appended when presented or dropped.
    pub fn page(&mut self) -> PdfPage<'_> {
        PdfPage {
            doc: self,
            content: Some(Content::new()),
        }
    }

    /// Number of completed pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize the document.
    pub fn finish(self) -> Result<Vec<u8>, PdfError> {
        let page_count = self.pages.len();
        let too_many = || PdfError::TooManyPages(page_count);
        let count = i32::try_from(page_count).map_err(|_| too_many())?;
        let last_id = count
            .checked_mul(2)
            .and_then(|n| n.checked_add(FIRST_PAGE_ID))
            .ok_or_else(too_many)?;

        let page_ids: Vec<i32> = (FIRST_PAGE_ID..last_id).step_by(2).collect();
        let (width, height) = (self.size.0 as f32, self.size.1 as f32);
        let page_tree_id = Ref::new(PAGE_TREE_ID);
        let font_id = Ref::new(FONT_ID);

        let mut pdf = Pdf::new();
        pdf.catalog(Ref::new(CATALOG_ID)).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().map(|&id| Ref::new(id)))
            .count(count);

        for (&page_id, content) in page_ids.iter().zip(&self.pages) {
            let content_id = Ref::new(page_id + 1);

            let mut page = pdf.page(Ref::new(page_id));
            page.media_box(Rect::new(0.0, 0.0, width, height));
            page.parent(page_tree_id);
            page.contents(content_id);
            page.resources().fonts().pair(FONT_NAME, font_id);
            page.finish();

            pdf.stream(content_id, content);
        }

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        let mut info = pdf.document_info(Ref::new(INFO_ID));
        info.producer(TextStr("benchgraph"));
        if let Some(title) = &self.title {
            info.title(TextStr(title));
        }
        info.finish();

        Ok(pdf.finish())
    }

    /// Serialize the document and write it to `path`, replacing any
    /// existing file.
    pub fn save(self, path: &Path) -> Result<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
    }
}

/// A single page being drawn. Implements [`DrawingBackend`].
pub struct PdfPage<'a> {
    doc: &'a mut PdfDocument,
    content: Option<Content>,
}

type DrawResult = Result<(), DrawingErrorKind<PdfError>>;

impl PdfPage<'_> {
    fn content(&mut self) -> Result<&mut Content, DrawingErrorKind<PdfError>> {
        self.content
            .as_mut()
            .ok_or(DrawingErrorKind::DrawingError(PdfError::PageClosed))
    }

    /// Flip a backend y coordinate into PDF space.
    fn flip(&self, y: f32) -> f32 {
        self.doc.size.1 as f32 - y
    }

    fn point(&self, (x, y): BackendCoord) -> (f32, f32) {
        (x as f32, self.flip(y as f32))
    }

    fn set_stroke<S: BackendStyle>(&mut self, style: &S) -> DrawResult {
        let (r, g, b) = blend_on_white(style.color());
        let width = style.stroke_width() as f32;
        let content = self.content()?;
        content.set_stroke_rgb(r, g, b);
        content.set_line_width(width);
        Ok(())
    }

    fn set_fill(&mut self, color: BackendColor) -> DrawResult {
        let (r, g, b) = blend_on_white(color);
        self.content()?.set_fill_rgb(r, g, b);
        Ok(())
    }

    fn trace_polyline(&mut self, points: &[BackendCoord]) -> DrawResult {
        let Some((&first, rest)) = points.split_first() else {
            return Ok(());
        };
        let (x, y) = self.point(first);
        let rest: Vec<(f32, f32)> = rest.iter().map(|&p| self.point(p)).collect();

        let content = self.content()?;
        content.move_to(x, y);
        for (x, y) in rest {
            content.line_to(x, y);
        }
        Ok(())
    }
}

impl DrawingBackend for PdfPage<'_> {
    type ErrorType = PdfError;

    fn get_size(&self) -> (u32, u32) {
        self.doc.size
    }

    fn ensure_prepared(&mut self) -> DrawResult {
        self.content().map(|_| ())
    }

    fn present(&mut self) -> DrawResult {
        if let Some(content) = self.content.take() {
            self.doc.pages.push(content.finish());
        }
        Ok(())
    }

    fn draw_pixel(&mut self, point: BackendCoord, color: BackendColor) -> DrawResult {
        if color.alpha <= 0.0 {
            return Ok(());
        }
        let (x, y) = self.point(point);
        self.set_fill(color)?;
        let content = self.content()?;
        content.rect(x, y - 1.0, 1.0, 1.0);
        content.fill_nonzero();
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> DrawResult {
        if style.color().alpha <= 0.0 {
            return Ok(());
        }
        self.set_stroke(style)?;
        self.trace_polyline(&[from, to])?;
        self.content()?.stroke();
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> DrawResult {
        if style.color().alpha <= 0.0 {
            return Ok(());
        }
        let (x0, y0) = self.point(upper_left);
        let (x1, y1) = self.point(bottom_right);
        let (x, y) = (x0.min(x1), y0.min(y1));
        let (w, h) = ((x1 - x0).abs(), (y1 - y0).abs());

        if fill {
            self.set_fill(style.color())?;
            let content = self.content()?;
            content.rect(x, y, w, h);
            content.fill_nonzero();
        } else {
            self.set_stroke(style)?;
            let content = self.content()?;
            content.rect(x, y, w, h);
            content.stroke();
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> DrawResult {
        if style.color().alpha <= 0.0 {
            return Ok(());
        }
        let points: Vec<BackendCoord> = path.into_iter().collect();
        if points.len() < 2 {
            return Ok(());
        }
        self.set_stroke(style)?;
        self.trace_polyline(&points)?;
        self.content()?.stroke();
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> DrawResult {
        if radius == 0 || style.color().alpha <= 0.0 {
            return Ok(());
        }
        if fill {
            self.set_fill(style.color())?;
        } else {
            self.set_stroke(style)?;
        }

        let (cx, cy) = self.point(center);
        let r = radius as f32;
        let k = CIRCLE_KAPPA * r;
        let content = self.content()?;
        content.move_to(cx + r, cy);
        content.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
        content.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
        content.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
        content.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
        content.close_path();
        if fill {
            content.fill_nonzero();
        } else {
            content.stroke();
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> DrawResult {
        if style.color().alpha <= 0.0 {
            return Ok(());
        }
        let points: Vec<BackendCoord> = vert.into_iter().collect();
        if points.len() < 3 {
            return Ok(());
        }
        self.set_fill(style.color())?;
        self.trace_polyline(&points)?;
        let content = self.content()?;
        content.close_path();
        content.fill_nonzero();
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> DrawResult {
        let color = style.color();
        if text.is_empty() || color.alpha <= 0.0 {
            return Ok(());
        }

        let size = style.size() as f32;
        let width = text_width(text, size);
        let ascent = size * HELVETICA_ASCENT;
        let anchor = style.anchor();

        // Baseline origin relative to `pos`, in the unrotated text frame
        // (x along the text, y pointing down).
        let dx = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -width / 2.0,
            HPos::Right => -width,
        };
        let dy = match anchor.v_pos {
            VPos::Top => ascent,
            VPos::Center => ascent / 2.0,
            VPos::Bottom => 0.0,
        };

        // Clockwise rotation on screen.
        let degrees: f32 = match style.transform() {
            FontTransform::None => 0.0,
            FontTransform::Rotate90 => 90.0,
            FontTransform::Rotate180 => 180.0,
            FontTransform::Rotate270 => 270.0,
        };
        let (sin, cos) = degrees.to_radians().sin_cos();
        let sx = pos.0 as f32 + dx * cos - dy * sin;
        let sy = pos.1 as f32 + dx * sin + dy * cos;
        let (x, y) = (sx, self.flip(sy));

        self.set_fill(color)?;
        let encoded = encode_text(text);
        let content = self.content()?;
        content.begin_text();
        content.set_font(FONT_NAME, size);
        // PDF angles run counter-clockwise.
        content.set_text_matrix([cos, -sin, sin, cos, x, y]);
        content.show(Str(&encoded));
        content.end_text();
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<PdfError>> {
        let size = style.size() as f32;
        Ok((text_width(text, size).ceil() as u32, size.ceil() as u32))
    }
}

impl Drop for PdfPage<'_> {
    fn drop(&mut self) {
        let _ = self.present();
    }
}

/// Flatten a translucent color onto a white page, as PDF fractions.
fn blend_on_white(color: BackendColor) -> (f32, f32, f32) {
    let alpha = color.alpha.clamp(0.0, 1.0) as f32;
    let channel = |v: u8| f32::from(v) / 255.0 * alpha + (1.0 - alpha);
    let (r, g, b) = color.rgb;
    (channel(r), channel(g), channel(b))
}

/// Encode text for a simple font. Characters outside printable ASCII are
/// replaced with `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u8::try_from(c) {
            Ok(b) if (0x20..0x7f).contains(&b) => b,
            _ => b'?',
        })
        .collect()
}

/// Width of `text` set in Helvetica at `size` points.
fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = encode_text(text).iter().map(|&b| glyph_width(b)).sum();
    units as f32 * size / 1000.0
}

/// Helvetica advance widths for printable ASCII, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn glyph_width(byte: u8) -> u32 {
    byte.checked_sub(0x20)
        .and_then(|i| HELVETICA_WIDTHS.get(usize::from(i)))
        .map_or(556, |&w| u32::from(w))
}
