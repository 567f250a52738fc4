use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::products;
use crate::handlers::upload::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// POST   /{id}/images                       -> upload_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::get_by_id).put(products::update))
        .route(
            "/{id}/images",
            post(products::upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}
