//! Handlers for plans, subscriptions, payment methods, invoices and credit
//! usage.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mailspark_core::billing::{find_plan, UsageSummary};
use mailspark_core::error::CoreError;
use mailspark_core::providers::{Invoice, PaymentMethod, PlanProduct, Subscription};
use mailspark_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::engine::usage::{ensure_billing_customer, load_user, usage_summary};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /billing/subscriptions`.
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub price_id: String,
    pub payment_method_id: String,
}

/// Request body for `POST /billing/subscriptions/{id}/upgrade`.
#[derive(Debug, Deserialize)]
pub struct UpgradeSubscriptionRequest {
    pub price_id: String,
}

/// Request body for `POST /billing/payment-methods`.
#[derive(Debug, Deserialize)]
pub struct AddPaymentMethodRequest {
    pub payment_method_id: String,
}

#[derive(Debug, Serialize)]
pub struct BillingCustomer {
    pub customer_id: String,
}

async fn customer_for(state: &AppState, user_id: DbId) -> AppResult<String> {
    let user = load_user(state, user_id).await?;
    ensure_billing_customer(state, &user).await
}

async fn require_known_price(state: &AppState, price_id: &str) -> AppResult<()> {
    let plans = state.billing.list_plans().await?;
    if find_plan(&plans, price_id).is_none() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown price {price_id}"
        ))));
    }
    Ok(())
}

/// The customer's active subscription, which must be `subscription_id`.
async fn require_active(
    state: &AppState,
    customer_id: &str,
    subscription_id: &str,
) -> AppResult<Subscription> {
    state
        .billing
        .active_subscription(customer_id)
        .await?
        .filter(|sub| sub.id == subscription_id)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Subscription {subscription_id} is not the active subscription"
            )))
        })
}

/// POST /api/v1/billing/customer
///
/// Idempotent: returns the existing customer when there is one.
pub async fn ensure_customer(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BillingCustomer>>> {
    let customer_id = customer_for(&state, auth.user_id).await?;
    Ok(Json(DataResponse::new(BillingCustomer { customer_id })))
}

/// GET /api/v1/billing/plans
pub async fn list_plans(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PlanProduct>>>> {
    let plans = state.billing.list_plans().await?;
    Ok(Json(DataResponse::new(plans)))
}

/// GET /api/v1/billing/subscription
///
/// `data` is `null` when the user has no active subscription.
pub async fn current_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<Subscription>>>> {
    let customer_id = customer_for(&state, auth.user_id).await?;
    let subscription = state.billing.active_subscription(&customer_id).await?;
    Ok(Json(DataResponse::new(subscription)))
}

/// POST /api/v1/billing/subscriptions
pub async fn create_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSubscriptionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Subscription>>)> {
    if input.payment_method_id.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "payment_method_id must not be empty".into(),
        )));
    }

    let customer_id = customer_for(&state, auth.user_id).await?;
    require_known_price(&state, &input.price_id).await?;

    if state.billing.active_subscription(&customer_id).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An active subscription already exists".into(),
        )));
    }

    let subscription = state
        .billing
        .create_subscription(&customer_id, &input.price_id, &input.payment_method_id)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        subscription_id = %subscription.id,
        price_id = %input.price_id,
        "Subscription created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(subscription))))
}

/// DELETE /api/v1/billing/subscriptions/{id}
pub async fn cancel_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> AppResult<Json<DataResponse<Subscription>>> {
    let customer_id = customer_for(&state, auth.user_id).await?;
    require_active(&state, &customer_id, &subscription_id).await?;

    let subscription = state.billing.cancel_subscription(&subscription_id).await?;
    tracing::info!(user_id = auth.user_id, subscription_id = %subscription.id, "Subscription cancelled");
    Ok(Json(DataResponse::new(subscription)))
}

/// POST /api/v1/billing/subscriptions/{id}/upgrade
///
/// Moves the active subscription to another plan's price.
pub async fn upgrade_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
    Json(input): Json<UpgradeSubscriptionRequest>,
) -> AppResult<Json<DataResponse<Subscription>>> {
    let customer_id = customer_for(&state, auth.user_id).await?;
    require_known_price(&state, &input.price_id).await?;

    let active = require_active(&state, &customer_id, &subscription_id).await?;
    if active.price_id.as_deref() == Some(input.price_id.as_str()) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Subscription is already on price {}",
            input.price_id
        ))));
    }

    let subscription = state
        .billing
        .update_subscription_price(&subscription_id, &input.price_id)
        .await?;
    tracing::info!(
        user_id = auth.user_id,
        subscription_id = %subscription.id,
        from = ?active.price_id,
        to = %input.price_id,
        "Subscription plan changed"
    );
    Ok(Json(DataResponse::new(subscription)))
}

// ---------------------------------------------------------------------------
// Payment methods and invoices
// ---------------------------------------------------------------------------

/// GET /api/v1/billing/payment-methods
pub async fn list_payment_methods(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PaymentMethod>>>> {
    let customer_id = customer_for(&state, auth.user_id).await?;
    let methods = state.billing.list_payment_methods(&customer_id).await?;
    Ok(Json(DataResponse::new(methods)))
}

/// POST /api/v1/billing/payment-methods
///
/// The attached method becomes the customer's default.
pub async fn add_payment_method(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AddPaymentMethodRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PaymentMethod>>)> {
    if input.payment_method_id.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "payment_method_id must not be empty".into(),
        )));
    }

    let customer_id = customer_for(&state, auth.user_id).await?;
    let method = state
        .billing
        .attach_payment_method(&customer_id, &input.payment_method_id)
        .await?;
    tracing::info!(user_id = auth.user_id, payment_method_id = %method.id, "Payment method added");
    Ok((StatusCode::CREATED, Json(DataResponse::new(method))))
}

/// DELETE /api/v1/billing/payment-methods/{id}
///
/// Only methods attached to the caller's customer can be removed.
pub async fn delete_payment_method(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(payment_method_id): Path<String>,
) -> AppResult<StatusCode> {
    let customer_id = customer_for(&state, auth.user_id).await?;
    let owned = state
        .billing
        .list_payment_methods(&customer_id)
        .await?
        .iter()
        .any(|method| method.id == payment_method_id);
    if !owned {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Payment method {payment_method_id} does not belong to this account"
        ))));
    }

    state.billing.detach_payment_method(&payment_method_id).await?;
    tracing::info!(user_id = auth.user_id, payment_method_id = %payment_method_id, "Payment method removed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/billing/invoices
pub async fn list_invoices(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Invoice>>>> {
    let customer_id = customer_for(&state, auth.user_id).await?;
    let invoices = state.billing.list_invoices(&customer_id).await?;
    Ok(Json(DataResponse::new(invoices)))
}

/// GET /api/v1/billing/usage
pub async fn usage(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UsageSummary>>> {
    let summary = usage_summary(&state, auth.user_id).await?;
    Ok(Json(DataResponse::new(summary)))
}
