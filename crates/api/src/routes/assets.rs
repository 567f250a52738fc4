use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::assets;
use crate::handlers::upload::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Routes mounted at `/assets`.
///
/// ```text
/// POST   /                                  -> upload
/// DELETE /{file_name}                       -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(assets::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/{file_name}", delete(assets::delete))
}
