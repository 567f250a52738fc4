use std::sync::Arc;

use mailspark_core::providers::{BillingProvider, CompletionProvider, ObjectStorage};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Providers are built once at startup; tests swap in fakes.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mailspark_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Chat completion provider used by the copy generator.
    pub completion: Arc<dyn CompletionProvider>,
    /// Billing provider: customers, plans, subscriptions.
    pub billing: Arc<dyn BillingProvider>,
    /// Object storage for uploaded logos, images and editor assets.
    pub storage: Arc<dyn ObjectStorage>,
}
