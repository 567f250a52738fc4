pub mod assets;
pub mod auth;
pub mod billing;
pub mod brands;
pub mod editor;
pub mod generation;
pub mod health;
pub mod products;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     signup (public)
/// /auth/signin                                     signin (public)
///
/// /users/me                                        get, update (PATCH)
///
/// /brands                                          list, create (brand limit)
/// /brands/{id}                                     get, update, delete (soft)
/// /brands/{id}/logos                               upload logo (multipart)
/// /brands/{id}/products                            list, create
///
/// /products/{id}                                   get, update
/// /products/{id}/images                            upload image (multipart)
///
/// /ai/generate                                     generate email (usage gated)
///
/// /editor/sessions                                 list, create (manual)
/// /editor/sessions/{id}                            get
/// /editor/sessions/{id}/saves                      append save
/// /editor/sessions/{id}/latest                     latest save, decompressed
/// /editor/sessions/{id}/assets                     list, upload (multipart)
///
/// /billing/customer                                create or return billing customer
/// /billing/plans                                   list plans
/// /billing/subscription                            current subscription
/// /billing/subscriptions                           subscribe
/// /billing/subscriptions/{id}                      cancel (DELETE)
/// /billing/subscriptions/{id}/upgrade              change plan
/// /billing/payment-methods                         list, add
/// /billing/payment-methods/{id}                    remove (DELETE)
/// /billing/invoices                                list invoices
/// /billing/usage                                   credits used and remaining
///
/// /assets                                          upload (multipart)
/// /assets/{file_name}                              delete
/// ```
///
/// Everything except `/auth/*` requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/brands", brands::router())
        .nest("/products", products::router())
        .nest("/ai", generation::router())
        .nest("/editor/sessions", editor::router())
        .nest("/billing", billing::router())
        .nest("/assets", assets::router())
}
