//! PDF renderer for [`ReportDocument`] section lists.
//!
//! Walks the sections top to bottom, starting a new page whenever the next
//! block would cross the bottom margin. Every page carries the running
//! header (logo, organization, timestamp, page number) and a footer rule.

use printpdf::lopdf::{self, StringFormat};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Mm, OffsetDateTime, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Px, Rect, Rgb,
};

use meal_core::logo::LogoImage;
use meal_core::report::{BarRow, KeyValue, ReportDocument, Section, REPORT_TITLE};
use meal_core::types::Timestamp;

use crate::layout::{
    bar_length_mm, chars_per_width, line_height_mm, sanitize_text, text_width_mm, truncate_text,
    wrap_text, CONTENT_BOTTOM_MM, CONTENT_TOP_MM, CONTENT_WIDTH_MM, FOOTER_BASELINE_MM,
    MARGIN_LEFT_MM, MARGIN_RIGHT_MM, MARGIN_TOP_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
    PROJECT_TABLE_WIDTHS_MM,
};
use crate::ReportError;

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

const TITLE_SIZE: f32 = 20.0;
const SUBTITLE_SIZE: f32 = 11.0;
const HEADING_SIZE: f32 = 13.0;
const SUBHEADING_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 9.5;
const SMALL_SIZE: f32 = 8.0;
const HEADER_SIZE: f32 = 8.5;

const LOGO_MAX_HEIGHT_MM: f32 = 12.0;
const LOGO_MAX_WIDTH_MM: f32 = 36.0;

/// Width of the label column in key-value blocks and bar charts.
const LABEL_COLUMN_MM: f32 = 62.0;
const BAR_HEIGHT_MM: f32 = 3.2;
const BAR_GAP_MM: f32 = 1.0;
const TABLE_ROW_MM: f32 = 6.0;
const CELL_PADDING_MM: f32 = 1.5;
const BLOCK_GAP_MM: f32 = 4.0;

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn ink() -> Color {
    rgb(0.13, 0.15, 0.18)
}

fn muted() -> Color {
    rgb(0.42, 0.45, 0.50)
}

fn accent() -> Color {
    rgb(0.05, 0.38, 0.55)
}

fn accent_light() -> Color {
    rgb(0.55, 0.76, 0.86)
}

fn rule() -> Color {
    rgb(0.80, 0.82, 0.85)
}

fn zebra() -> Color {
    rgb(0.95, 0.96, 0.97)
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Drawing state for one document. Dropped (or consumed by
/// [`PdfRenderer::finish`]) at the end of a single compile call.
pub struct PdfRenderer<'a> {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    report: &'a ReportDocument,
    logo: Option<&'a LogoImage>,
    page_number: usize,
    /// Baseline of the next line, in millimetres from the page bottom.
    cursor_y: f32,
}

fn render_err(e: impl std::fmt::Display) -> ReportError {
    ReportError::Render(e.to_string())
}

// ---------------------------------------------------------------------------
// Document identity
// ---------------------------------------------------------------------------

/// Identifier written to the trailer `/ID`, derived from the generation
/// timestamp so identical inputs serialize to identical bytes.
pub fn document_id(generated_at: &Timestamp) -> String {
    format!("MEAL{}", generated_at.format("%Y%m%d%H%M%S%f"))
}

fn pdf_date(ts: &Timestamp) -> Result<OffsetDateTime, ReportError> {
    OffsetDateTime::from_unix_timestamp(ts.timestamp()).map_err(render_err)
}

/// Replace both halves of the trailer `/ID` with `id`.
///
/// printpdf always writes a random instance id as the second element.
fn stamp_trailer_id(bytes: &[u8], id: &str) -> Result<Vec<u8>, ReportError> {
    let mut doc = lopdf::Document::load_mem(bytes).map_err(render_err)?;
    let id = lopdf::Object::String(id.as_bytes().to_vec(), StringFormat::Literal);
    doc.trailer.set("ID", lopdf::Object::Array(vec![id.clone(), id]));
    let mut out = Vec::with_capacity(bytes.len());
    doc.save_to(&mut out).map_err(render_err)?;
    Ok(out)
}

impl<'a> PdfRenderer<'a> {
    /// Create the document and draw the header of page 1.
    pub fn new(
        report: &'a ReportDocument,
        logo: Option<&'a LogoImage>,
    ) -> Result<Self, ReportError> {
        let (doc, page, layer) = PdfDocument::new(
            REPORT_TITLE,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Page 1",
        );
        let stamp = pdf_date(&report.generated_at)?;
        let doc = doc
            .with_document_id(document_id(&report.generated_at))
            .with_creation_date(stamp)
            .with_mod_date(stamp)
            .with_metadata_date(stamp);
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_err)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(render_err)?,
            italic: doc
                .add_builtin_font(BuiltinFont::HelveticaOblique)
                .map_err(render_err)?,
        };
        let layer = doc.get_page(page).get_layer(layer);

        let mut renderer = Self {
            doc,
            layer,
            fonts,
            report,
            logo,
            page_number: 1,
            cursor_y: CONTENT_TOP_MM,
        };
        renderer.draw_page_chrome();
        Ok(renderer)
    }

    /// Number of pages emitted so far.
    pub fn page_count(&self) -> usize {
        self.page_number
    }

    /// Render every section in order.
    pub fn render(&mut self) {
        let report = self.report;
        for section in &report.sections {
            self.render_section(section);
        }
    }

    /// Serialize the document to bytes.
    pub fn finish(self) -> Result<Vec<u8>, ReportError> {
        let id = document_id(&self.report.generated_at);
        let bytes = self.doc.save_to_bytes().map_err(render_err)?;
        stamp_trailer_id(&bytes, &id)
    }

    // -- pages --------------------------------------------------------------

    fn new_page(&mut self) {
        self.page_number += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Page {}", self.page_number),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor_y = CONTENT_TOP_MM;
        self.draw_page_chrome();
    }

    /// Start a new page unless `height_mm` still fits above the footer.
    fn ensure_space(&mut self, height_mm: f32) {
        if self.cursor_y - height_mm < CONTENT_BOTTOM_MM {
            self.new_page();
        }
    }

    fn draw_page_chrome(&mut self) {
        let top = PAGE_HEIGHT_MM - MARGIN_TOP_MM;
        let right = PAGE_WIDTH_MM - MARGIN_RIGHT_MM;

        let mut text_x = MARGIN_LEFT_MM;
        if let Some(logo) = self.logo {
            let width = self.draw_logo(logo, MARGIN_LEFT_MM, top - LOGO_MAX_HEIGHT_MM);
            text_x += width + 4.0;
        }

        let org = sanitize_text(&self.report.organization_name);
        let regular = self.fonts.regular.clone();
        let bold = self.fonts.bold.clone();
        self.text(&org, 11.0, text_x, top - 5.0, &bold, ink());
        self.text(REPORT_TITLE, HEADER_SIZE, text_x, top - 10.0, &regular, muted());

        let stamp = format!(
            "Generated {}",
            self.report.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        let page = format!("Page {}", self.page_number);
        let stamp_x = right - text_width_mm(&stamp, HEADER_SIZE);
        let page_x = right - text_width_mm(&page, HEADER_SIZE);
        self.text(&stamp, HEADER_SIZE, stamp_x, top - 5.0, &regular, muted());
        self.text(&page, HEADER_SIZE, page_x, top - 10.0, &bold, muted());

        self.fill_rect(MARGIN_LEFT_MM, top - 15.0, CONTENT_WIDTH_MM, 0.4, accent());

        self.fill_rect(MARGIN_LEFT_MM, FOOTER_BASELINE_MM + 4.0, CONTENT_WIDTH_MM, 0.3, rule());
        self.text(
            "Confidential - for programme use only",
            SMALL_SIZE,
            MARGIN_LEFT_MM,
            FOOTER_BASELINE_MM,
            &self.fonts.italic.clone(),
            muted(),
        );
    }

    /// Draw the logo with its bottom-left corner at (`x`, `y`). Returns the
    /// rendered width.
    fn draw_logo(&self, logo: &LogoImage, x: f32, y: f32) -> f32 {
        let mut height = LOGO_MAX_HEIGHT_MM;
        let mut width = height * logo.aspect_ratio();
        if width > LOGO_MAX_WIDTH_MM {
            width = LOGO_MAX_WIDTH_MM;
            height = width / logo.aspect_ratio();
        }

        let xobject = ImageXObject {
            width: Px(logo.width as usize),
            height: Px(logo.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: logo.rgb.clone(),
            image_filter: None,
            smask: None,
            clipping_bbox: None,
        };
        // Native size is px / dpi inches; pick the dpi that yields `height`.
        let dpi = logo.height as f32 * 25.4 / height;
        Image::from(xobject).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        width
    }

    // -- primitives ---------------------------------------------------------

    fn text(&self, text: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef, color: Color) {
        self.layer.set_fill_color(color);
        self.layer.use_text(sanitize_text(text), size, Mm(x), Mm(y), font);
    }

    fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.layer.set_fill_color(color);
        let rect =
            Rect::new(Mm(x), Mm(y), Mm(x + width), Mm(y + height)).with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
    }

    /// Write wrapped lines starting at the cursor, breaking pages as needed.
    fn wrapped(
        &mut self,
        text: &str,
        size: f32,
        x: f32,
        width: f32,
        font: IndirectFontRef,
        color: Color,
    ) {
        let lh = line_height_mm(size);
        for line in wrap_text(&sanitize_text(text), chars_per_width(width, size)) {
            self.ensure_space(lh);
            self.cursor_y -= lh;
            self.text(&line, size, x, self.cursor_y, &font, color.clone());
        }
    }

    // -- sections -----------------------------------------------------------

    fn render_section(&mut self, section: &Section) {
        match section {
            Section::Title { text, subtitle } => self.render_title(text, subtitle.as_deref()),
            Section::Heading { text } => self.render_heading(text, HEADING_SIZE, accent()),
            Section::SubHeading { text } => self.render_heading(text, SUBHEADING_SIZE, ink()),
            Section::KeyValues { rows } => self.render_key_values(rows),
            Section::BarChart { rows, max_value } => self.render_bar_chart(rows, *max_value),
            Section::Table { columns, rows } => self.render_table(columns, rows),
            Section::Notice { text } => {
                let font = self.fonts.bold.clone();
                self.wrapped(text, BODY_SIZE, MARGIN_LEFT_MM, CONTENT_WIDTH_MM, font, accent());
                self.cursor_y -= BLOCK_GAP_MM / 2.0;
            }
            Section::Placeholder { text } => {
                let font = self.fonts.italic.clone();
                self.wrapped(text, BODY_SIZE, MARGIN_LEFT_MM, CONTENT_WIDTH_MM, font, muted());
                self.cursor_y -= BLOCK_GAP_MM / 2.0;
            }
            Section::Paragraph { text } => {
                let font = self.fonts.regular.clone();
                self.wrapped(text, BODY_SIZE, MARGIN_LEFT_MM, CONTENT_WIDTH_MM, font, ink());
                self.cursor_y -= BLOCK_GAP_MM / 2.0;
            }
            Section::PageBreak => self.new_page(),
        }
    }

    fn render_title(&mut self, text: &str, subtitle: Option<&str>) {
        let title_lh = line_height_mm(TITLE_SIZE);
        self.ensure_space(title_lh * 2.0);
        self.cursor_y -= title_lh;
        let bold = self.fonts.bold.clone();
        self.text(text, TITLE_SIZE, MARGIN_LEFT_MM, self.cursor_y, &bold, ink());
        if let Some(sub) = subtitle {
            self.cursor_y -= line_height_mm(SUBTITLE_SIZE);
            let regular = self.fonts.regular.clone();
            self.text(sub, SUBTITLE_SIZE, MARGIN_LEFT_MM, self.cursor_y, &regular, muted());
        }
        self.cursor_y -= BLOCK_GAP_MM;
    }

    fn render_heading(&mut self, text: &str, size: f32, color: Color) {
        let lh = line_height_mm(size);
        // Keep a heading together with at least a couple of body lines.
        self.ensure_space(lh + line_height_mm(BODY_SIZE) * 3.0);
        self.cursor_y -= BLOCK_GAP_MM / 2.0 + lh;
        self.text(text, size, MARGIN_LEFT_MM, self.cursor_y, &self.fonts.bold.clone(), color);
        self.cursor_y -= 1.5;
    }

    fn render_key_values(&mut self, rows: &[KeyValue]) {
        let lh = line_height_mm(BODY_SIZE);
        let label_chars = chars_per_width(LABEL_COLUMN_MM - 2.0, BODY_SIZE);
        let value_x = MARGIN_LEFT_MM + LABEL_COLUMN_MM;
        let value_chars = chars_per_width(CONTENT_WIDTH_MM - LABEL_COLUMN_MM, BODY_SIZE);
        let regular = self.fonts.regular.clone();
        let bold = self.fonts.bold.clone();

        for row in rows {
            let lines = wrap_text(&sanitize_text(&row.value), value_chars);
            let height = lh * lines.len().max(1) as f32;
            self.ensure_space(height);
            self.cursor_y -= lh;
            let label = truncate_text(&row.label, label_chars);
            self.text(&label, BODY_SIZE, MARGIN_LEFT_MM, self.cursor_y, &bold, muted());
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    self.cursor_y -= lh;
                }
                self.text(line, BODY_SIZE, value_x, self.cursor_y, &regular, ink());
            }
        }
        self.cursor_y -= BLOCK_GAP_MM;
    }

    fn render_bar_chart(&mut self, rows: &[BarRow], max_value: u64) {
        let track = CONTENT_WIDTH_MM - LABEL_COLUMN_MM - 24.0;
        let bar_x = MARGIN_LEFT_MM + LABEL_COLUMN_MM;
        let row_height = BAR_HEIGHT_MM * 2.0 + BAR_GAP_MM + 2.5;
        let regular = self.fonts.regular.clone();

        // Legend.
        self.ensure_space(line_height_mm(SMALL_SIZE) + row_height);
        self.cursor_y -= line_height_mm(SMALL_SIZE);
        self.fill_rect(bar_x, self.cursor_y, 3.0, 2.5, accent());
        self.text("Direct", SMALL_SIZE, bar_x + 4.0, self.cursor_y, &regular, muted());
        self.fill_rect(bar_x + 22.0, self.cursor_y, 3.0, 2.5, accent_light());
        self.text("Indirect", SMALL_SIZE, bar_x + 26.0, self.cursor_y, &regular, muted());
        self.cursor_y -= 2.0;

        for row in rows {
            self.ensure_space(row_height);
            let top = self.cursor_y;
            let direct_y = top - BAR_HEIGHT_MM;
            let indirect_y = direct_y - BAR_GAP_MM - BAR_HEIGHT_MM;

            self.text(&row.label, BODY_SIZE, MARGIN_LEFT_MM, direct_y - 1.0, &regular, ink());

            let direct_len = bar_length_mm(row.direct, max_value, track);
            let indirect_len = bar_length_mm(row.indirect, max_value, track);
            self.fill_rect(bar_x, direct_y, direct_len, BAR_HEIGHT_MM, accent());
            self.fill_rect(bar_x, indirect_y, indirect_len, BAR_HEIGHT_MM, accent_light());

            let direct_label = meal_core::report::format_count(row.direct);
            let indirect_label = meal_core::report::format_count(row.indirect);
            self.text(
                &direct_label,
                SMALL_SIZE,
                bar_x + direct_len + 1.5,
                direct_y + 0.4,
                &regular,
                muted(),
            );
            self.text(
                &indirect_label,
                SMALL_SIZE,
                bar_x + indirect_len + 1.5,
                indirect_y + 0.4,
                &regular,
                muted(),
            );

            self.cursor_y = indirect_y - 2.5;
        }
        self.cursor_y -= BLOCK_GAP_MM;
    }

    fn column_widths(count: usize) -> Vec<f32> {
        if count == PROJECT_TABLE_WIDTHS_MM.len() {
            PROJECT_TABLE_WIDTHS_MM.to_vec()
        } else {
            vec![CONTENT_WIDTH_MM / count.max(1) as f32; count]
        }
    }

    fn table_row(
        &mut self,
        cells: &[String],
        widths: &[f32],
        font: &IndirectFontRef,
        color: Color,
    ) {
        let mut x = MARGIN_LEFT_MM;
        let baseline = self.cursor_y + (TABLE_ROW_MM - line_height_mm(SMALL_SIZE)) / 2.0 + 0.6;
        for (cell, width) in cells.iter().zip(widths) {
            let max_chars = chars_per_width(width - CELL_PADDING_MM * 2.0, SMALL_SIZE);
            let fitted = truncate_text(&sanitize_text(cell), max_chars);
            self.text(&fitted, SMALL_SIZE, x + CELL_PADDING_MM, baseline, font, color.clone());
            x += width;
        }
    }

    fn table_header(&mut self, columns: &[String], widths: &[f32]) {
        self.cursor_y -= TABLE_ROW_MM;
        self.fill_rect(MARGIN_LEFT_MM, self.cursor_y, CONTENT_WIDTH_MM, TABLE_ROW_MM, accent());
        let bold = self.fonts.bold.clone();
        self.table_row(columns, widths, &bold, rgb(1.0, 1.0, 1.0));
    }

    fn render_table(&mut self, columns: &[String], rows: &[Vec<String>]) {
        let widths = Self::column_widths(columns.len());
        self.ensure_space(TABLE_ROW_MM * 2.0);
        self.table_header(columns, &widths);

        let regular = self.fonts.regular.clone();
        for (i, row) in rows.iter().enumerate() {
            if self.cursor_y - TABLE_ROW_MM < CONTENT_BOTTOM_MM {
                // Repeat the header on continuation pages.
                self.new_page();
                self.table_header(columns, &widths);
            }
            self.cursor_y -= TABLE_ROW_MM;
            if i % 2 == 1 {
                let y = self.cursor_y;
                self.fill_rect(MARGIN_LEFT_MM, y, CONTENT_WIDTH_MM, TABLE_ROW_MM, zebra());
            }
            self.table_row(row, &widths, &regular, ink());
        }
        self.fill_rect(MARGIN_LEFT_MM, self.cursor_y - 0.3, CONTENT_WIDTH_MM, 0.3, rule());
        self.cursor_y -= BLOCK_GAP_MM;
    }
}

/// Render a report document to PDF bytes.
///
/// Returns the encoded document and the number of pages it spans.
pub fn render_pdf(
    report: &ReportDocument,
    logo: Option<&LogoImage>,
) -> Result<(Vec<u8>, usize), ReportError> {
    let mut renderer = PdfRenderer::new(report, logo)?;
    renderer.render();
    let pages = renderer.page_count();
    let bytes = renderer.finish()?;
    Ok((bytes, pages))
}
