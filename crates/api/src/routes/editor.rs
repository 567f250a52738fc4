//! Route definitions for the `/editor/sessions` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::editor;
use crate::handlers::upload::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Routes mounted at `/editor/sessions`.
///
/// ```text
/// GET    /                                  -> list_sessions
/// POST   /                                  -> create_session
/// GET    /{id}                              -> get_session
/// POST   /{id}/saves                        -> append_save
/// GET    /{id}/latest                       -> latest_save
/// GET    /{id}/assets                       -> list_assets
/// POST   /{id}/assets                       -> upload_asset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(editor::list_sessions).post(editor::create_session))
        .route("/{id}", get(editor::get_session))
        .route("/{id}/saves", post(editor::append_save))
        .route("/{id}/latest", get(editor::latest_save))
        .route(
            "/{id}/assets",
            get(editor::list_assets)
                .post(editor::upload_asset)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}
