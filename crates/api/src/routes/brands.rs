//! Route definitions for the `/brands` resource.
//!
//! Also nests brand-scoped product routes under `/brands/{id}/products`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::upload::MAX_UPLOAD_BYTES;
use crate::handlers::{brands, products};
use crate::state::AppState;

/// Routes mounted at `/brands`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
/// POST   /{id}/logos                        -> upload_logo
///
/// GET    /{id}/products                     -> products::list_by_brand
/// POST   /{id}/products                     -> products::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(brands::list).post(brands::create))
        .route(
            "/{id}",
            get(brands::get_by_id)
                .put(brands::update)
                .delete(brands::delete),
        )
        .route(
            "/{id}/logos",
            post(brands::upload_logo).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/{id}/products",
            get(products::list_by_brand).post(products::create),
        )
}
