use axum::routing::get;
use axum::Router;

use crate::handlers::branding;
use crate::state::AppState;

/// Routes mounted at `/branding`.
///
/// ```text
/// GET    /                                  -> get
/// PUT    /                                  -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(branding::get).put(branding::update))
}
