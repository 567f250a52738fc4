//! Stripe REST client for customers, plans, subscriptions, payment methods
//! and invoices.
//!
//! Requests are form-encoded with bearer auth, as the Stripe API expects.
//! Only the fields the backend reads are deserialized.

use std::collections::HashMap;

use async_trait::async_trait;
use mailspark_core::providers::{
    BillingProvider, Invoice, PaymentMethod, PlanProduct, ProviderError, Subscription,
};
use serde::Deserialize;

use crate::http::send_json;

const PROVIDER: &str = "stripe";

pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1";

pub struct StripeClient {
    secret_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            secret_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.secret_key)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.secret_key)
    }

    /// First active price of a product without a default price.
    async fn first_active_price(&self, product_id: &str) -> Result<Option<Price>, ProviderError> {
        let request = self.get("/prices").query(&[
            ("product", product_id),
            ("active", "true"),
            ("limit", "1"),
        ]);
        let prices: List<Price> = send_json(PROVIDER, request).await?;
        Ok(prices.data.into_iter().next())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct List<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Customer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Price {
    id: String,
    unit_amount: Option<i64>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceRef {
    Expanded(Price),
    Id(String),
}

#[derive(Debug, Deserialize)]
struct Product {
    id: String,
    name: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    default_price: Option<PriceRef>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    id: Option<String>,
    price: Price,
    current_period_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeSubscription {
    id: String,
    customer: String,
    status: String,
    items: List<SubscriptionItem>,
    current_period_end: Option<i64>,
}

impl From<StripeSubscription> for Subscription {
    fn from(sub: StripeSubscription) -> Self {
        let first_item = sub.items.data.into_iter().next();
        // Newer API versions report the period end per item.
        let item_period_end = first_item.as_ref().and_then(|item| item.current_period_end);
        Self {
            id: sub.id,
            customer_id: sub.customer,
            status: sub.status,
            price_id: first_item.map(|item| item.price.id),
            current_period_end: sub.current_period_end.or(item_period_end),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Card {
    brand: Option<String>,
    last4: Option<String>,
    exp_month: Option<u32>,
    exp_year: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StripePaymentMethod {
    id: String,
    card: Option<Card>,
}

impl From<StripePaymentMethod> for PaymentMethod {
    fn from(pm: StripePaymentMethod) -> Self {
        let (card_brand, last4, exp_month, exp_year) = match pm.card {
            Some(c) => (c.brand, c.last4, c.exp_month, c.exp_year),
            None => (None, None, None, None),
        };
        Self {
            id: pm.id,
            card_brand,
            last4,
            exp_month,
            exp_year,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeInvoice {
    id: String,
    number: Option<String>,
    status: Option<String>,
    #[serde(default)]
    amount_due: i64,
    #[serde(default)]
    amount_paid: i64,
    currency: String,
    created: i64,
    hosted_invoice_url: Option<String>,
}

impl From<StripeInvoice> for Invoice {
    fn from(inv: StripeInvoice) -> Self {
        Self {
            id: inv.id,
            number: inv.number,
            status: inv.status,
            amount_due: inv.amount_due,
            amount_paid: inv.amount_paid,
            currency: inv.currency,
            created: inv.created,
            hosted_invoice_url: inv.hosted_invoice_url,
        }
    }
}

fn plan_from(product: Product, price: Price) -> PlanProduct {
    PlanProduct {
        product_id: product.id,
        product_name: product.name,
        price_id: price.id,
        unit_amount: price.unit_amount,
        currency: price.currency,
        metadata: product.metadata,
    }
}

// ---------------------------------------------------------------------------
// BillingProvider
// ---------------------------------------------------------------------------

#[async_trait]
impl BillingProvider for StripeClient {
    async fn create_customer(&self, email: &str) -> Result<String, ProviderError> {
        let request = self.post("/customers").form(&[("email", email)]);
        let customer: Customer = send_json(PROVIDER, request).await?;
        tracing::info!(customer_id = %customer.id, "Created billing customer");
        Ok(customer.id)
    }

    async fn active_subscription(
        &self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, ProviderError> {
        let request = self.get("/subscriptions").query(&[
            ("customer", customer_id),
            ("status", "active"),
            ("limit", "1"),
        ]);
        let subscriptions: List<StripeSubscription> = send_json(PROVIDER, request).await?;
        Ok(subscriptions.data.into_iter().next().map(Subscription::from))
    }

    async fn list_plans(&self) -> Result<Vec<PlanProduct>, ProviderError> {
        let request = self.get("/products").query(&[
            ("active", "true"),
            ("limit", "100"),
            ("expand[]", "data.default_price"),
        ]);
        let products: List<Product> = send_json(PROVIDER, request).await?;

        let mut plans = Vec::with_capacity(products.data.len());
        for mut product in products.data {
            let price = match product.default_price.take() {
                Some(PriceRef::Expanded(price)) => Some(price),
                Some(PriceRef::Id(_)) | None => self.first_active_price(&product.id).await?,
            };
            match price {
                Some(price) => plans.push(plan_from(product, price)),
                None => tracing::debug!(product_id = %product.id, "Skipping product without a price"),
            }
        }
        Ok(plans)
    }

    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
        payment_method_id: &str,
    ) -> Result<Subscription, ProviderError> {
        let attach = self
            .post(&format!("/payment_methods/{payment_method_id}/attach"))
            .form(&[("customer", customer_id)]);
        let _: serde_json::Value = send_json(PROVIDER, attach).await?;

        let request = self.post("/subscriptions").form(&[
            ("customer", customer_id),
            ("items[0][price]", price_id),
            ("default_payment_method", payment_method_id),
        ]);
        let subscription: StripeSubscription = send_json(PROVIDER, request).await?;
        tracing::info!(subscription_id = %subscription.id, customer_id, "Created subscription");
        Ok(subscription.into())
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, ProviderError> {
        let request = self
            .client
            .delete(format!("{}/subscriptions/{subscription_id}", self.base_url))
            .bearer_auth(&self.secret_key);
        let subscription: StripeSubscription = send_json(PROVIDER, request).await?;
        tracing::info!(subscription_id, "Cancelled subscription");
        Ok(subscription.into())
    }

    async fn update_subscription_price(
        &self,
        subscription_id: &str,
        price_id: &str,
    ) -> Result<Subscription, ProviderError> {
        let current: StripeSubscription =
            send_json(PROVIDER, self.get(&format!("/subscriptions/{subscription_id}"))).await?;
        let item_id = current
            .items
            .data
            .into_iter()
            .find_map(|item| item.id)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: format!("subscription {subscription_id} has no items"),
            })?;

        let request = self
            .post(&format!("/subscriptions/{subscription_id}"))
            .form(&[("items[0][id]", item_id.as_str()), ("items[0][price]", price_id)]);
        let subscription: StripeSubscription = send_json(PROVIDER, request).await?;
        tracing::info!(subscription_id, price_id, "Changed subscription price");
        Ok(subscription.into())
    }

    async fn attach_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<PaymentMethod, ProviderError> {
        let attach = self
            .post(&format!("/payment_methods/{payment_method_id}/attach"))
            .form(&[("customer", customer_id)]);
        let method: StripePaymentMethod = send_json(PROVIDER, attach).await?;

        let set_default = self.post(&format!("/customers/{customer_id}")).form(&[(
            "invoice_settings[default_payment_method]",
            payment_method_id,
        )]);
        let _: Customer = send_json(PROVIDER, set_default).await?;

        tracing::info!(customer_id, payment_method_id, "Attached payment method");
        Ok(method.into())
    }

    async fn list_payment_methods(
        &self,
        customer_id: &str,
    ) -> Result<Vec<PaymentMethod>, ProviderError> {
        let request = self
            .get("/payment_methods")
            .query(&[("customer", customer_id), ("type", "card")]);
        let methods: List<StripePaymentMethod> = send_json(PROVIDER, request).await?;
        Ok(methods.data.into_iter().map(PaymentMethod::from).collect())
    }

    async fn detach_payment_method(&self, payment_method_id: &str) -> Result<(), ProviderError> {
        let request = self.post(&format!("/payment_methods/{payment_method_id}/detach"));
        let _: StripePaymentMethod = send_json(PROVIDER, request).await?;
        tracing::info!(payment_method_id, "Detached payment method");
        Ok(())
    }

    async fn list_invoices(&self, customer_id: &str) -> Result<Vec<Invoice>, ProviderError> {
        let request = self
            .get("/invoices")
            .query(&[("customer", customer_id), ("limit", "100")]);
        let invoices: List<StripeInvoice> = send_json(PROVIDER, request).await?;
        Ok(invoices.data.into_iter().map(Invoice::from).collect())
    }
}
