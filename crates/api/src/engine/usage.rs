//! The usage gate: plan allowances checked against current usage.
//!
//! Reads are not locked. Two concurrent generation requests from the same
//! user can both pass the gate before either session is written.

use mailspark_core::billing::{
    evaluate, find_plan, DenyReason, PlanMetadata, UsageDecision, UsageSummary,
};
use mailspark_core::error::CoreError;
use mailspark_core::providers::{PlanProduct, Subscription};
use mailspark_core::types::DbId;
use mailspark_db::models::editor_session::SessionType;
use mailspark_db::models::user::User;
use mailspark_db::repositories::{BrandRepo, EditorSessionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The user's active subscription resolved to a plan and its limits.
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub subscription: Subscription,
    pub plan: PlanProduct,
    pub limits: PlanMetadata,
}

/// Load the user; a dangling id from a valid token is a validation error.
pub async fn load_user(state: &AppState, user_id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("User {user_id} not found"))))
}

/// The user's billing customer id, creating and attaching one if the user
/// has none yet.
pub async fn ensure_billing_customer(state: &AppState, user: &User) -> AppResult<String> {
    if let Some(customer_id) = &user.billing_customer_id {
        return Ok(customer_id.clone());
    }

    let customer_id = state.billing.create_customer(&user.email).await?;
    UserRepo::set_billing_customer(&state.pool, user.id, &customer_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", user.id)))?;
    tracing::info!(user_id = user.id, customer_id = %customer_id, "Attached billing customer");
    Ok(customer_id)
}

/// Resolve the customer's active subscription to a plan. `None` without one.
pub async fn resolve_plan(state: &AppState, customer_id: &str) -> AppResult<Option<PlanContext>> {
    let Some(subscription) = state.billing.active_subscription(customer_id).await? else {
        return Ok(None);
    };

    let price_id = subscription.price_id.as_deref().ok_or_else(|| {
        CoreError::Validation(format!("Subscription {} has no price", subscription.id))
    })?;

    let plans = state.billing.list_plans().await?;
    let plan = find_plan(&plans, price_id)
        .cloned()
        .ok_or_else(|| CoreError::Validation(format!("No plan found for price {price_id}")))?;
    let limits = PlanMetadata::from_metadata(&plan.metadata)?;

    Ok(Some(PlanContext {
        subscription,
        plan,
        limits,
    }))
}

async fn generated_count(state: &AppState, user_id: DbId) -> AppResult<u64> {
    let count =
        EditorSessionRepo::count_by_type(&state.pool, user_id, SessionType::Generated).await?;
    Ok(count.max(0) as u64)
}

/// Decide whether the user may generate another email.
pub async fn check_generation_allowance(
    state: &AppState,
    user_id: DbId,
) -> AppResult<UsageDecision> {
    let user = load_user(state, user_id).await?;
    let customer_id = ensure_billing_customer(state, &user).await?;

    let Some(plan) = resolve_plan(state, &customer_id).await? else {
        return Ok(UsageDecision::Deny(DenyReason::NoSubscription));
    };

    let used = generated_count(state, user_id).await?;
    let decision = evaluate(plan.limits.credits, used);
    tracing::debug!(
        user_id,
        plan = %plan.plan.product_name,
        used,
        allowed = decision.is_allowed(),
        "Evaluated generation allowance"
    );
    Ok(decision)
}

/// Decide whether the user may create another brand.
pub async fn check_brand_allowance(state: &AppState, user_id: DbId) -> AppResult<UsageDecision> {
    let user = load_user(state, user_id).await?;
    let customer_id = ensure_billing_customer(state, &user).await?;

    let Some(plan) = resolve_plan(state, &customer_id).await? else {
        return Ok(UsageDecision::Deny(DenyReason::NoSubscription));
    };

    let active = BrandRepo::count_active_by_user(&state.pool, user_id).await?;
    Ok(evaluate(plan.limits.brand_limit, active.max(0) as u64))
}

/// Turn a denial into the matching error.
pub fn require(decision: UsageDecision) -> AppResult<()> {
    match decision {
        UsageDecision::Allow => Ok(()),
        UsageDecision::Deny(reason) => Err(AppError::UsageDenied(reason)),
    }
}

/// Credits used and remaining on the user's current plan.
pub async fn usage_summary(state: &AppState, user_id: DbId) -> AppResult<UsageSummary> {
    let user = load_user(state, user_id).await?;
    let customer_id = ensure_billing_customer(state, &user).await?;

    let plan = resolve_plan(state, &customer_id)
        .await?
        .ok_or(AppError::UsageDenied(DenyReason::NoSubscription))?;

    let used = generated_count(state, user_id).await?;
    Ok(UsageSummary::new(
        plan.plan.product_name,
        plan.limits.credits,
        used,
    ))
}
