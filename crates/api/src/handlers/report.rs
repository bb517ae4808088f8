//! Handlers for `/reports`: PDF download and JSON preview.
//!
//! Both endpoints accept the raw filter object as the request body. The
//! body is sanitized rather than strictly deserialized, so unknown keys and
//! malformed entries are ignored; an empty body selects the full portfolio.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use meal_core::aggregate::{aggregate, PortfolioSummary};
use meal_core::filter::{filter_snapshot, ReportFilters};
use meal_core::report::{build_report_from, ReportDocument, ReportOptions};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Payload of `POST /reports/preview`.
#[derive(Debug, Serialize)]
pub struct ReportPreview {
    pub filters: ReportFilters,
    pub summary: PortfolioSummary,
    pub document: ReportDocument,
}

/// Parse a request body into sanitized filters.
pub fn parse_filters(body: &[u8]) -> AppResult<ReportFilters> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReportFilters::default());
    }
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Filter body is not valid JSON: {e}")))?;
    Ok(ReportFilters::from_json(&value))
}

fn report_options(state: &AppState) -> ReportOptions {
    ReportOptions {
        row_limit: state.config.report_row_limit,
        ..ReportOptions::new(chrono::Utc::now())
    }
}

/// POST /api/v1/reports/pdf
pub async fn generate_pdf(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let filters = parse_filters(&body)?;
    let options = report_options(&state);
    let snapshot = state.snapshots.fetch_snapshot().await?;

    tracing::info!(
        years = ?filters.years,
        project_ids = filters.project_ids.len(),
        provinces = filters.provinces.len(),
        sectors = filters.sectors.len(),
        clusters = filters.clusters.len(),
        "Generating report PDF",
    );

    // Layout and rendering are CPU-bound; keep them off the async workers.
    let report = tokio::task::spawn_blocking(move || {
        meal_report::compile(&snapshot, &filters, &options)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Report task failed: {e}")))??;

    let filename = meal_report::report_filename(&options.generated_at);
    tracing::info!(
        %filename,
        page_count = report.page_count,
        size_bytes = report.bytes.len(),
        "Report PDF generated",
    );

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (CACHE_CONTROL, "no-store".to_string()),
        ],
        report.bytes,
    ))
}

/// POST /api/v1/reports/preview
pub async fn preview(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<DataResponse<ReportPreview>>> {
    let filters = parse_filters(&body)?;
    let options = report_options(&state);
    let snapshot = state.snapshots.fetch_snapshot().await?;

    let scoped = filter_snapshot(&snapshot, &filters);
    let summary = aggregate(&scoped.projects);
    let document = build_report_from(&snapshot, &scoped, &summary, &filters, &options);

    Ok(Json(DataResponse {
        data: ReportPreview {
            filters,
            summary,
            document,
        },
    }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn blank_body_means_no_filters() {
        assert!(parse_filters(b"").unwrap().is_empty());
        assert!(parse_filters(b" \n").unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert_matches!(parse_filters(b"{years:"), Err(AppError::BadRequest(_)));
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let filters = parse_filters(br#"{"years": [2023, "x"], "provinces": "Kabul"}"#).unwrap();
        assert_eq!(filters.years, vec![2023]);
        assert!(filters.provinces.is_empty());
    }
}
