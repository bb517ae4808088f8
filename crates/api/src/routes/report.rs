//! Route definitions for `/reports`.

use axum::routing::post;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// POST   /pdf                               -> generate_pdf
/// POST   /preview                           -> preview
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pdf", post(report::generate_pdf))
        .route("/preview", post(report::preview))
}
