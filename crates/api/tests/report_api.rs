//! HTTP-level tests for the report endpoints.
//!
//! Snapshots come from an in-memory provider; no database is needed.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use common::{body_bytes, body_json, post_json, post_raw, sample_snapshot};
use meal_core::report::NO_FINDINGS_TEXT;
use meal_core::snapshot::{EntitySnapshot, Project};
use serde_json::json;

// ---------------------------------------------------------------------------
// PDF download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pdf_download_has_attachment_headers() {
    let app = common::build_test_app(sample_snapshot());
    let response = post_json(app, "/api/v1/reports/pdf", json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"meal-report-"));
    assert!(disposition.ends_with(".pdf\""));

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn pdf_with_empty_body_covers_full_portfolio() {
    let app = common::build_test_app(sample_snapshot());
    let response = post_raw(app, "/api/v1/reports/pdf", "").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn pdf_for_empty_selection_still_renders() {
    let app = common::build_test_app(sample_snapshot());
    let response = post_json(app, "/api/v1/reports/pdf", json!({"provinces": ["Herat"]})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.starts_with(b"%PDF"));
}

#[tokio::test]
async fn invalid_json_body_is_rejected() {
    let app = common::build_test_app(sample_snapshot());
    let response = post_raw(app, "/api/v1/reports/pdf", "{\"years\": [").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preview_without_filters_summarizes_everything() {
    let app = common::build_test_app(sample_snapshot());
    let response = post_json(app, "/api/v1/reports/preview", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let summary = &json["data"]["summary"];
    assert_eq!(summary["project_count"], 2);
    assert_eq!(summary["provinces"], json!(["Balkh", "Kabul"]));
    assert_eq!(summary["sectors"], json!(["Education", "Health"]));
    assert_eq!(summary["beneficiaries"]["children_girls"]["direct"], 1150);
}

#[tokio::test]
async fn preview_applies_year_filter() {
    let app = common::build_test_app(sample_snapshot());
    let response = post_json(app, "/api/v1/reports/preview", json!({"years": [2024]})).await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["filters"]["years"], json!([2024]));
    let summary = &json["data"]["summary"];
    assert_eq!(summary["project_count"], 1);
    assert_eq!(summary["provinces"], json!(["Balkh"]));
    assert_eq!(summary["beneficiaries"]["adults_women"]["direct"], 0);
}

#[tokio::test]
async fn preview_sanitizes_malformed_filters() {
    let app = common::build_test_app(sample_snapshot());
    let response = post_json(
        app,
        "/api/v1/reports/preview",
        json!({"years": ["2023", "soon", 3000], "sectors": "Health", "extra": true}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let filters = &json["data"]["filters"];
    assert_eq!(filters["years"], json!([2023]));
    assert_eq!(filters["sectors"], json!([]));
    assert_eq!(json["data"]["summary"]["project_count"], 1);
}

#[tokio::test]
async fn preview_caps_project_table_rows() {
    let projects = (1..=20)
        .map(|n| Project::new(n.to_string(), format!("P-{n:02}"), format!("Project {n}")))
        .collect();
    let snapshot = EntitySnapshot {
        projects,
        ..Default::default()
    };
    let app = common::build_test_app(snapshot);
    let response = post_json(app, "/api/v1/reports/preview", json!({})).await;
    let json = body_json(response).await;

    let sections = json["data"]["document"]["sections"].as_array().unwrap();
    let table = sections.iter().find(|s| s["kind"] == "table").unwrap();
    assert_eq!(table["rows"].as_array().unwrap().len(), 15);
    assert!(sections
        .iter()
        .any(|s| s["kind"] == "notice" && s["text"] == "+5 additional projects not shown"));
}

#[tokio::test]
async fn preview_scopes_findings_to_selected_projects() {
    let app = common::build_test_app(sample_snapshot());
    let response = post_json(app, "/api/v1/reports/preview", json!({"projectIds": ["1"]})).await;
    let json = body_json(response).await;

    // The only finding belongs to project 2.
    let sections = json["data"]["document"]["sections"].as_array().unwrap();
    assert!(sections
        .iter()
        .any(|s| s["kind"] == "placeholder" && s["text"] == NO_FINDINGS_TEXT));
}
