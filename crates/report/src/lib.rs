//! PDF compilation of MEAL portfolio reports.
//!
//! [`compile`] is the single entry point used by the API: it filters and
//! aggregates the snapshot, builds the section list, decodes the branding
//! logo (best effort) and renders the pages.

pub mod layout;
pub mod pdf;

use meal_core::filter::ReportFilters;
use meal_core::logo::{decode_logo, LogoImage};
use meal_core::report::{build_report, ReportDocument, ReportOptions};
use meal_core::snapshot::{Branding, EntitySnapshot};

pub use pdf::render_pdf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

/// A compiled report.
#[derive(Debug, Clone)]
pub struct CompiledReport {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Decode the branding logo, logging and discarding any failure.
pub fn load_logo(branding: &Branding) -> Option<LogoImage> {
    let uri = branding.logo_data_uri.as_deref()?;
    match decode_logo(uri) {
        Ok(logo) => Some(logo),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping undecodable branding logo");
            None
        }
    }
}

/// Render an already built document.
pub fn compile_document(
    document: &ReportDocument,
    branding: &Branding,
) -> Result<CompiledReport, ReportError> {
    let logo = load_logo(branding);
    let (bytes, page_count) = render_pdf(document, logo.as_ref())?;
    tracing::debug!(
        page_count,
        size_bytes = bytes.len(),
        sections = document.sections.len(),
        "Report rendered",
    );
    Ok(CompiledReport { bytes, page_count })
}

/// Filter, aggregate, lay out and render a report.
pub fn compile(
    snapshot: &EntitySnapshot,
    filters: &ReportFilters,
    options: &ReportOptions,
) -> Result<CompiledReport, ReportError> {
    let document = build_report(snapshot, filters, options);
    compile_document(&document, &snapshot.branding)
}

/// Download filename for a report generated at `generated_at`.
pub fn report_filename(generated_at: &meal_core::types::Timestamp) -> String {
    format!("meal-report-{}.pdf", generated_at.format("%Y%m%d-%H%M%S"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
