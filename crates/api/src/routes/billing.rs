use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::billing;
use crate::state::AppState;

/// Routes mounted at `/billing`.
///
/// ```text
/// POST   /customer                          -> ensure_customer
/// GET    /plans                             -> list_plans
/// GET    /subscription                      -> current_subscription
/// POST   /subscriptions                     -> create_subscription
/// DELETE /subscriptions/{id}                -> cancel_subscription
/// POST   /subscriptions/{id}/upgrade        -> upgrade_subscription
/// GET    /payment-methods                   -> list_payment_methods
/// POST   /payment-methods                   -> add_payment_method
/// DELETE /payment-methods/{id}              -> delete_payment_method
/// GET    /invoices                          -> list_invoices
/// GET    /usage                             -> usage
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customer", post(billing::ensure_customer))
        .route("/plans", get(billing::list_plans))
        .route("/subscription", get(billing::current_subscription))
        .route("/subscriptions", post(billing::create_subscription))
        .route("/subscriptions/{id}", delete(billing::cancel_subscription))
        .route(
            "/subscriptions/{id}/upgrade",
            post(billing::upgrade_subscription),
        )
        .route(
            "/payment-methods",
            get(billing::list_payment_methods).post(billing::add_payment_method),
        )
        .route(
            "/payment-methods/{id}",
            delete(billing::delete_payment_method),
        )
        .route("/invoices", get(billing::list_invoices))
        .route("/usage", get(billing::usage))
}
