pub mod branding;
pub mod complaint;
pub mod health;
pub mod project;
pub mod report;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /reports/pdf                       compile and download a report (POST)
/// /reports/preview                   filters, summary and sections as JSON (POST)
///
/// /projects                          list, create
/// /projects/{id}                     get, update
///
/// /branding                          get, replace (PUT)
///
/// /complaints                        list (?status=), create
/// /complaints/{id}                   get
/// /complaints/{id}/status            update status (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/reports", report::router())
        .nest("/projects", project::router())
        .nest("/branding", branding::router())
        .nest("/complaints", complaint::router())
}
