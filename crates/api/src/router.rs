//! Router assembly for the MailSpark API.
//!
//! [`build_app_router`] is called by `main.rs` and by the integration test
//! harness, so tests exercise the same middleware as production.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application [`Router`]: `/health`, the `/api/v1` tree and the
/// middleware stack.
///
/// Layers wrap everything added before them, so the last `.layer` call sees
/// a request first. In request order:
///
/// 1. CORS (answers preflights before anything else runs)
/// 2. Request id assigned, unless the client sent one
/// 3. Tracing span per request, tagged with the id
/// 4. Request id copied onto the response
/// 5. Timeout (generation calls included)
/// 6. Panic recovery
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        // Health check at root level, outside the versioned API.
        .merge(routes::health::router())
        // Auth, brands, products, generation, editor, billing, assets.
        .nest("/api/v1", routes::api_routes())
        // Innermost: a panicking handler becomes a 500 instead of a dropped
        // connection.
        .layer(CatchPanicLayer::new())
        // Bounds slow completion and billing calls as well as handlers.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Echo the request id so the editor can report it with errors.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // One INFO span per request with method, path and status.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Assign a UUID request id when the client did not send one.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // Outermost: CORS for the editor frontend.
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured frontend origins.
///
/// Panics at startup on an unparseable origin.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
