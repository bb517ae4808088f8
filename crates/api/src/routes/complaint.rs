//! Route definitions for the `/complaints` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::complaint;
use crate::state::AppState;

/// Routes mounted at `/complaints`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}/status                       -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(complaint::list).post(complaint::create))
        .route("/{id}", get(complaint::get_by_id))
        .route("/{id}/status", put(complaint::update_status))
}
