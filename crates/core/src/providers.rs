//! Traits for the external capabilities the backend depends on.
//!
//! Concrete clients live in `mailspark-cloud`. One instance of each is
//! constructed at startup and shared as `Arc<dyn …>` through the API state;
//! tests substitute in-memory fakes.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure talking to an external provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request never produced a response (network, DNS, TLS, SDK error).
    #[error("{provider} request failed: {message}")]
    Request {
        provider: &'static str,
        message: String,
    },

    /// The provider answered with a non-2xx status.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The provider answered 2xx but the payload was not what we expected.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Text completion
// ---------------------------------------------------------------------------

/// A two-message chat prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Submit the prompt and return the raw text of the first choice.
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ProviderError>;
}

// ---------------------------------------------------------------------------
// Billing
// ---------------------------------------------------------------------------

/// The subset of a billing subscription the backend reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub id: String,
    pub customer_id: String,
    pub status: String,
    /// Price of the first subscription item; identifies the plan.
    pub price_id: Option<String>,
    /// Unix timestamp of the end of the current billing period.
    pub current_period_end: Option<i64>,
}

/// A purchasable plan: a billing product with its primary price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanProduct {
    pub product_id: String,
    pub product_name: String,
    pub price_id: String,
    /// Price in the smallest currency unit.
    pub unit_amount: Option<i64>,
    pub currency: Option<String>,
    /// Raw product metadata (`credits`, `brand_limit`, `features`, ...).
    pub metadata: HashMap<String, String>,
}

/// A saved card on a billing customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMethod {
    pub id: String,
    pub card_brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<u32>,
    pub exp_year: Option<u32>,
}

/// An invoice issued to a billing customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    pub id: String,
    pub number: Option<String>,
    pub status: Option<String>,
    /// Amounts in the smallest currency unit.
    pub amount_due: i64,
    pub amount_paid: i64,
    pub currency: String,
    /// Unix timestamp.
    pub created: i64,
    pub hosted_invoice_url: Option<String>,
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a customer and return its id.
    async fn create_customer(&self, email: &str) -> Result<String, ProviderError>;

    /// The customer's first active subscription, if any.
    async fn active_subscription(
        &self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, ProviderError>;

    /// All products that have at least one price.
    async fn list_plans(&self) -> Result<Vec<PlanProduct>, ProviderError>;

    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
        payment_method_id: &str,
    ) -> Result<Subscription, ProviderError>;

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, ProviderError>;

    /// Move the subscription's single item to `price_id`.
    async fn update_subscription_price(
        &self,
        subscription_id: &str,
        price_id: &str,
    ) -> Result<Subscription, ProviderError>;

    /// Attach a payment method and make it the customer's default.
    async fn attach_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<PaymentMethod, ProviderError>;

    /// Card payment methods attached to the customer.
    async fn list_payment_methods(
        &self,
        customer_id: &str,
    ) -> Result<Vec<PaymentMethod>, ProviderError>;

    async fn detach_payment_method(&self, payment_method_id: &str) -> Result<(), ProviderError>;

    async fn list_invoices(&self, customer_id: &str) -> Result<Vec<Invoice>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `body` under the owner's prefix and return its public URL.
    async fn put_object(
        &self,
        owner: DbId,
        file_name: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ProviderError>;

    async fn delete_object(&self, owner: DbId, file_name: &str) -> Result<(), ProviderError>;

    /// Public URL prefix under which `owner`'s objects are served, with a
    /// trailing `/`.
    fn owner_url_prefix(&self, owner: DbId) -> String;
}

/// Storage key for a user-owned file: `{owner}/{file_name}`.
pub fn object_key(owner: DbId, file_name: &str) -> String {
    format!("{owner}/{file_name}")
}

/// The file name of an object `owner` stored through `storage`, or `None`
/// for any URL the storage did not hand out for that owner.
pub fn owned_file_name<'a>(
    storage: &dyn ObjectStorage,
    owner: DbId,
    url: &'a str,
) -> Option<&'a str> {
    file_name_under(&storage.owner_url_prefix(owner), url)
}

fn file_name_under<'a>(prefix: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(prefix)
        .filter(|name| !name.is_empty() && !name.contains('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_prefixes_owner() {
        assert_eq!(object_key(42, "logo.svg"), "42/logo.svg");
    }

    #[test]
    fn file_name_under_accepts_only_direct_children_of_prefix() {
        let prefix = "https://bucket.s3.amazonaws.com/7/";
        assert_eq!(
            file_name_under(prefix, "https://bucket.s3.amazonaws.com/7/brand_logo.png"),
            Some("brand_logo.png")
        );
        assert_eq!(file_name_under(prefix, "https://bucket.s3.amazonaws.com/7/"), None);
        assert_eq!(
            file_name_under(prefix, "https://bucket.s3.amazonaws.com/8/brand_logo.png"),
            None
        );
        assert_eq!(
            file_name_under(prefix, "https://bucket.s3.amazonaws.com/7/nested/a.png"),
            None
        );
        assert_eq!(file_name_under(prefix, "https://cdn.shopify.com/s/files/logo.png"), None);
    }
}
