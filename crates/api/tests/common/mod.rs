#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use mailspark_api::auth::jwt::{generate_access_token, JwtConfig};
use mailspark_api::config::ServerConfig;
use mailspark_api::router::build_app_router;
use mailspark_api::state::AppState;
use mailspark_core::billing::{BRAND_LIMIT_KEY, CREDITS_KEY};
use mailspark_core::providers::{
    object_key, BillingProvider, ChatPrompt, CompletionProvider, Invoice, ObjectStorage,
    PaymentMethod, PlanProduct, ProviderError, Subscription,
};
use mailspark_core::types::DbId;
use mailspark_db::models::user::{CreateUser, User};
use mailspark_db::repositories::UserRepo;

pub const TEST_CUSTOMER_ID: &str = "cus_test";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-do-not-use-in-production".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

// ---------------------------------------------------------------------------
// Fake providers
// ---------------------------------------------------------------------------

/// Replays canned completions in order. Errors once the script runs out.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<usize>,
}

impl ScriptedCompletion {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(&self, _prompt: &ChatPrompt) -> Result<String, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::Request {
                provider: "scripted",
                message: "no scripted reply left".into(),
            })
    }
}

/// In-memory billing with a fixed plan list and at most one subscription.
#[derive(Default)]
pub struct FakeBilling {
    plans: Mutex<Vec<PlanProduct>>,
    subscription: Mutex<Option<Subscription>>,
    payment_methods: Mutex<Vec<PaymentMethod>>,
    invoices: Mutex<Vec<Invoice>>,
    customers_created: Mutex<Vec<String>>,
    customers_down: AtomicBool,
}

impl FakeBilling {
    pub fn new(plans: Vec<PlanProduct>, subscription: Option<Subscription>) -> Self {
        Self {
            plans: Mutex::new(plans),
            subscription: Mutex::new(subscription),
            ..Self::default()
        }
    }

    /// Make `create_customer` fail with a 503 until switched back.
    pub fn set_customers_down(&self, down: bool) {
        self.customers_down.store(down, Ordering::SeqCst);
    }

    /// Emails a customer was created for, in order.
    pub fn customers_created(&self) -> Vec<String> {
        self.customers_created.lock().unwrap().clone()
    }

    pub fn with_invoices(self, invoices: Vec<Invoice>) -> Self {
        *self.invoices.lock().unwrap() = invoices;
        self
    }

    pub fn payment_methods(&self) -> Vec<PaymentMethod> {
        self.payment_methods.lock().unwrap().clone()
    }

    /// A single plan with the given limits and an active subscription to it.
    pub fn subscribed(credits: &str, brand_limit: &str) -> Self {
        Self::new(
            vec![plan("price_test", "Test Plan", credits, brand_limit)],
            Some(active_subscription("sub_test", "price_test")),
        )
    }

    pub fn current(&self) -> Option<Subscription> {
        self.subscription.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillingProvider for FakeBilling {
    async fn create_customer(&self, email: &str) -> Result<String, ProviderError> {
        if self.customers_down.load(Ordering::SeqCst) {
            return Err(ProviderError::Api {
                provider: "fake-billing",
                status: 503,
                body: "billing unavailable".into(),
            });
        }
        self.customers_created.lock().unwrap().push(email.to_string());
        Ok(TEST_CUSTOMER_ID.to_string())
    }

    async fn active_subscription(
        &self,
        _customer_id: &str,
    ) -> Result<Option<Subscription>, ProviderError> {
        Ok(self.current())
    }

    async fn list_plans(&self) -> Result<Vec<PlanProduct>, ProviderError> {
        Ok(self.plans.lock().unwrap().clone())
    }

    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
        _payment_method_id: &str,
    ) -> Result<Subscription, ProviderError> {
        let mut subscription = active_subscription("sub_created", price_id);
        subscription.customer_id = customer_id.to_string();
        *self.subscription.lock().unwrap() = Some(subscription.clone());
        Ok(subscription)
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, ProviderError> {
        let mut current = self
            .subscription
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ProviderError::Api {
                provider: "fake-billing",
                status: 404,
                body: format!("No such subscription: {subscription_id}"),
            })?;
        current.status = "canceled".to_string();
        Ok(current)
    }

    async fn update_subscription_price(
        &self,
        subscription_id: &str,
        price_id: &str,
    ) -> Result<Subscription, ProviderError> {
        let mut guard = self.subscription.lock().unwrap();
        let current = guard
            .as_mut()
            .filter(|sub| sub.id == subscription_id)
            .ok_or_else(|| ProviderError::Api {
                provider: "fake-billing",
                status: 404,
                body: format!("No such subscription: {subscription_id}"),
            })?;
        current.price_id = Some(price_id.to_string());
        Ok(current.clone())
    }

    async fn attach_payment_method(
        &self,
        _customer_id: &str,
        payment_method_id: &str,
    ) -> Result<PaymentMethod, ProviderError> {
        let method = card(payment_method_id);
        self.payment_methods.lock().unwrap().push(method.clone());
        Ok(method)
    }

    async fn list_payment_methods(
        &self,
        _customer_id: &str,
    ) -> Result<Vec<PaymentMethod>, ProviderError> {
        Ok(self.payment_methods())
    }

    async fn detach_payment_method(&self, payment_method_id: &str) -> Result<(), ProviderError> {
        self.payment_methods
            .lock()
            .unwrap()
            .retain(|method| method.id != payment_method_id);
        Ok(())
    }

    async fn list_invoices(&self, _customer_id: &str) -> Result<Vec<Invoice>, ProviderError> {
        Ok(self.invoices.lock().unwrap().clone())
    }
}

/// Records stored and deleted keys; URLs point at a fake CDN.
#[derive(Default)]
pub struct FakeStorage {
    pub stored: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn stored(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn put_object(
        &self,
        owner: DbId,
        file_name: &str,
        _body: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, ProviderError> {
        let key = object_key(owner, file_name);
        self.stored.lock().unwrap().push(key.clone());
        Ok(format!("https://cdn.test/{key}"))
    }

    async fn delete_object(&self, owner: DbId, file_name: &str) -> Result<(), ProviderError> {
        self.deleted
            .lock()
            .unwrap()
            .push(object_key(owner, file_name));
        Ok(())
    }

    fn owner_url_prefix(&self, owner: DbId) -> String {
        format!("https://cdn.test/{owner}/")
    }
}

pub fn plan(price_id: &str, name: &str, credits: &str, brand_limit: &str) -> PlanProduct {
    PlanProduct {
        product_id: format!("prod_{price_id}"),
        product_name: name.to_string(),
        price_id: price_id.to_string(),
        unit_amount: Some(2900),
        currency: Some("usd".to_string()),
        metadata: HashMap::from([
            (CREDITS_KEY.to_string(), credits.to_string()),
            (BRAND_LIMIT_KEY.to_string(), brand_limit.to_string()),
        ]),
    }
}

pub fn card(id: &str) -> PaymentMethod {
    PaymentMethod {
        id: id.to_string(),
        card_brand: Some("visa".to_string()),
        last4: Some("4242".to_string()),
        exp_month: Some(12),
        exp_year: Some(2030),
    }
}

pub fn invoice(id: &str, amount: i64) -> Invoice {
    Invoice {
        id: id.to_string(),
        number: Some(format!("MS-{id}")),
        status: Some("paid".to_string()),
        amount_due: amount,
        amount_paid: amount,
        currency: "usd".to_string(),
        created: 1_767_225_600,
        hosted_invoice_url: None,
    }
}

pub fn active_subscription(id: &str, price_id: &str) -> Subscription {
    Subscription {
        id: id.to_string(),
        customer_id: TEST_CUSTOMER_ID.to_string(),
        status: "active".to_string(),
        price_id: Some(price_id.to_string()),
        current_period_end: Some(1_800_000_000),
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// The fakes behind a test app, kept so tests can inspect them afterwards.
#[derive(Clone)]
pub struct Fakes {
    pub completion: Arc<ScriptedCompletion>,
    pub billing: Arc<FakeBilling>,
    pub storage: Arc<FakeStorage>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            completion: Arc::new(ScriptedCompletion::default()),
            billing: Arc::new(FakeBilling::default()),
            storage: Arc::new(FakeStorage::default()),
        }
    }
}

impl Fakes {
    pub fn with_completion(mut self, completion: ScriptedCompletion) -> Self {
        self.completion = Arc::new(completion);
        self
    }

    pub fn with_billing(mut self, billing: FakeBilling) -> Self {
        self.billing = Arc::new(billing);
        self
    }
}

/// Build the full application router with default fakes.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, &Fakes::default())
}

/// Build the full application router through the same builder `main.rs`
/// uses, with the given fakes standing in for the external providers.
pub fn build_test_app_with(pool: PgPool, fakes: &Fakes) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        completion: fakes.completion.clone(),
        billing: fakes.billing.clone(),
        storage: fakes.storage.clone(),
    };
    build_app_router(state, &config)
}

/// Insert a user with a billing customer and return it with a valid token.
pub async fn create_user_with_token(pool: &PgPool, email: &str) -> (User, String) {
    insert_user_with_token(pool, email, Some(TEST_CUSTOMER_ID)).await
}

/// Insert a user with an optional billing customer and return it with a
/// valid token.
pub async fn insert_user_with_token(
    pool: &PgPool,
    email: &str,
    billing_customer_id: Option<&str>,
) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$unused".to_string(),
            phone_number: None,
            address: None,
            billing_customer_id: billing_customer_id.map(str::to_string),
        },
    )
    .await
    .expect("user creation should succeed");
    let token = generate_access_token(user.id, &test_config().jwt).expect("token should sign");
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should not fail")
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request("POST", uri, &body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("POST", uri, &body, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("PUT", uri, &body, Some(token))).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("PATCH", uri, &body, Some(token))).await
}

/// POST a multipart form with a single `file` field.
pub async fn post_file_auth(
    app: Router,
    uri: &str,
    file_name: &str,
    bytes: &[u8],
    token: &str,
) -> Response<Body> {
    let boundary = "mailspark-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request should build");
    send(app, request).await
}
