use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at `/ai`.
///
/// ```text
/// POST   /generate                          -> generate
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generation::generate))
}
