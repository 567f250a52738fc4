//! HTTP-level integration tests for `POST /ai/generate`.
//!
//! Tests cover the usage gate (allow, limit reached, no subscription,
//! unlimited), the persisted `generated` session, and failures that must
//! leave no session behind.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json_auth, FakeBilling, Fakes, ScriptedCompletion};
use mailspark_core::session_codec::SaveEntry;
use mailspark_core::style::{BrandColors, BrandFonts};
use mailspark_core::types::DbId;
use mailspark_db::models::brand::CreateBrand;
use mailspark_db::models::editor_session::{CreateEditorSession, SessionType};
use mailspark_db::models::product::CreateProduct;
use mailspark_db::repositories::{BrandRepo, EditorSessionRepo, ProductRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SELECTION: &str = r#"{"template_name": "salesTemplate"}"#;
const COPY: &str = r#"{"headline": "Summer Sale on Rocket Skates", "logo": "https://elsewhere.test/fake.png"}"#;

/// A brand with one logo and a product with one image, owned by `user_id`.
async fn seed_catalog(pool: &PgPool, user_id: DbId) -> (DbId, DbId) {
    let brand = BrandRepo::create(
        pool,
        user_id,
        &CreateBrand {
            brand_name: "Acme".to_string(),
            brand_url: None,
            logos: vec!["https://cdn.test/1/acme.png}}".to_string()],
            fonts: BrandFonts {
                primary_font: Some("Inter".to_string()),
                secondary_font: None,
            },
            colors: BrandColors {
                text_color: Some("#222222".to_string()),
                button_color: Some("#ff6600".to_string()),
                background_color: None,
            },
        },
    )
    .await
    .unwrap();
    let product = ProductRepo::create(
        pool,
        brand.id,
        &CreateProduct {
            product_name: "Rocket Skates".to_string(),
            description: Some("Fastest skates on the mesa".to_string()),
            price: Some("$99".to_string()),
            images: vec!["https://cdn.test/1/skates.png".to_string()],
            product_url: None,
        },
    )
    .await
    .unwrap();
    (brand.id, product.id)
}

async fn seed_generated_sessions(pool: &PgPool, user_id: DbId, count: usize) {
    for i in 0..count {
        let input = CreateEditorSession {
            brand_id: None,
            product_id: None,
            session_name: format!("Earlier {i}"),
            session_type: SessionType::Generated,
        };
        let entry = SaveEntry::new("{}", chrono::Utc::now()).unwrap();
        EditorSessionRepo::create(pool, user_id, &input, &[entry])
            .await
            .unwrap();
    }
}

async fn generated_count(pool: &PgPool, user_id: DbId) -> i64 {
    EditorSessionRepo::count_by_type(pool, user_id, SessionType::Generated)
        .await
        .unwrap()
}

fn generate_body(brand_id: DbId, product_id: DbId) -> serde_json::Value {
    json!({
        "brand_id": brand_id,
        "product_id": product_id,
        "prompt": "Announce our summer sale",
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_generate_creates_session_with_one_save(pool: PgPool) {
    let (user, token) = common::create_user_with_token(&pool, "gen@test.com").await;
    let (brand_id, product_id) = seed_catalog(&pool, user.id).await;
    let fakes = Fakes::default()
        .with_billing(FakeBilling::subscribed("3", "1"))
        .with_completion(ScriptedCompletion::new([SELECTION, COPY]));

    let app = common::build_test_app_with(pool.clone(), &fakes);
    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        generate_body(brand_id, product_id),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["template_name"], "salesTemplate");
    assert_eq!(data["session"]["session_type"], "generated");
    assert_eq!(data["session"]["session_name"], "Acme - Rocket Skates");
    assert_eq!(data["session"]["brand_id"], brand_id);
    assert_eq!(data["session"]["email_saves"].as_array().unwrap().len(), 1);

    let template = data["template"].to_string();
    assert!(template.contains("Summer Sale on Rocket Skates"));
    assert!(template.contains("https://cdn.test/1/acme.png"));
    assert!(!template.contains("elsewhere.test"));
    assert!(!template.contains("{{logo}}"));

    assert_eq!(fakes.completion.calls(), 2);
    assert_eq!(generated_count(&pool, user.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_saved_template_decodes_to_returned_template(pool: PgPool) {
    let (user, token) = common::create_user_with_token(&pool, "decode@test.com").await;
    let (brand_id, product_id) = seed_catalog(&pool, user.id).await;
    let fakes = Fakes::default()
        .with_billing(FakeBilling::subscribed("3", "1"))
        .with_completion(ScriptedCompletion::new([SELECTION, COPY]));

    let app = common::build_test_app_with(pool.clone(), &fakes);
    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        generate_body(brand_id, product_id),
        &token,
    )
    .await;
    let json = body_json(response).await;
    let session_id = json["data"]["session"]["id"].as_i64().unwrap();

    let session = EditorSessionRepo::find_by_id(&pool, session_id)
        .await
        .unwrap()
        .unwrap();
    let stored: serde_json::Value =
        serde_json::from_str(&session.latest_save().unwrap().decode().unwrap()).unwrap();
    assert_eq!(stored, json["data"]["template"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_generate_at_limit_is_402_without_side_effects(pool: PgPool) {
    let (user, token) = common::create_user_with_token(&pool, "full@test.com").await;
    let (brand_id, product_id) = seed_catalog(&pool, user.id).await;
    seed_generated_sessions(&pool, user.id, 2).await;
    let fakes = Fakes::default()
        .with_billing(FakeBilling::subscribed("2", "1"))
        .with_completion(ScriptedCompletion::new([SELECTION, COPY]));

    let app = common::build_test_app_with(pool.clone(), &fakes);
    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        generate_body(brand_id, product_id),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "LIMIT_REACHED");
    assert_eq!(fakes.completion.calls(), 0);
    assert_eq!(generated_count(&pool, user.id).await, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_manual_sessions_do_not_consume_credits(pool: PgPool) {
    let (user, token) = common::create_user_with_token(&pool, "manual@test.com").await;
    let (brand_id, product_id) = seed_catalog(&pool, user.id).await;
    let manual = CreateEditorSession {
        brand_id: None,
        product_id: None,
        session_name: "Hand made".to_string(),
        session_type: SessionType::Manual,
    };
    EditorSessionRepo::create(&pool, user.id, &manual, &[])
        .await
        .unwrap();
    let fakes = Fakes::default()
        .with_billing(FakeBilling::subscribed("1", "1"))
        .with_completion(ScriptedCompletion::new([SELECTION, COPY]));

    let app = common::build_test_app_with(pool, &fakes);
    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        generate_body(brand_id, product_id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_generate_without_subscription_is_402(pool: PgPool) {
    let (user, token) = common::create_user_with_token(&pool, "nosub@test.com").await;
    let (brand_id, product_id) = seed_catalog(&pool, user.id).await;
    let fakes = Fakes::default().with_completion(ScriptedCompletion::new([SELECTION, COPY]));

    let app = common::build_test_app_with(pool.clone(), &fakes);
    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        generate_body(brand_id, product_id),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NO_SUBSCRIPTION");
    assert_eq!(generated_count(&pool, user.id).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unlimited_plan_always_allows(pool: PgPool) {
    let (user, token) = common::create_user_with_token(&pool, "unlimited@test.com").await;
    let (brand_id, product_id) = seed_catalog(&pool, user.id).await;
    seed_generated_sessions(&pool, user.id, 5).await;
    let fakes = Fakes::default()
        .with_billing(FakeBilling::subscribed("Unlimited", "Unlimited"))
        .with_completion(ScriptedCompletion::new([SELECTION, COPY]));

    let app = common::build_test_app_with(pool.clone(), &fakes);
    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        generate_body(brand_id, product_id),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(generated_count(&pool, user.id).await, 6);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_json_completion_is_502_and_creates_nothing(pool: PgPool) {
    let (user, token) = common::create_user_with_token(&pool, "garbled@test.com").await;
    let (brand_id, product_id) = seed_catalog(&pool, user.id).await;
    let fakes = Fakes::default()
        .with_billing(FakeBilling::subscribed("3", "1"))
        .with_completion(ScriptedCompletion::new([
            SELECTION,
            "Sure! Here is your email copy: headline = Summer Sale",
        ]));

    let app = common::build_test_app_with(pool.clone(), &fakes);
    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        generate_body(brand_id, product_id),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "GENERATION_FAILED");
    assert_eq!(generated_count(&pool, user.id).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fenced_completion_is_accepted(pool: PgPool) {
    let (user, token) = common::create_user_with_token(&pool, "fenced@test.com").await;
    let (brand_id, product_id) = seed_catalog(&pool, user.id).await;
    let fenced = format!("```json\n{COPY}\n```");
    let fakes = Fakes::default()
        .with_billing(FakeBilling::subscribed("3", "1"))
        .with_completion(ScriptedCompletion::new([SELECTION.to_string(), fenced]));

    let app = common::build_test_app_with(pool, &fakes);
    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        generate_body(brand_id, product_id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_template_name_is_502(pool: PgPool) {
    let (user, token) = common::create_user_with_token(&pool, "unknown@test.com").await;
    let (brand_id, product_id) = seed_catalog(&pool, user.id).await;
    let fakes = Fakes::default()
        .with_billing(FakeBilling::subscribed("3", "1"))
        .with_completion(ScriptedCompletion::new([r#"{"template_name": "poster"}"#]));

    let app = common::build_test_app_with(pool.clone(), &fakes);
    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        generate_body(brand_id, product_id),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(fakes.completion.calls(), 1);
    assert_eq!(generated_count(&pool, user.id).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_generate_for_another_users_brand_is_404(pool: PgPool) {
    let (owner, _) = common::create_user_with_token(&pool, "owner@test.com").await;
    let (_intruder, token) = common::create_user_with_token(&pool, "intruder@test.com").await;
    let (brand_id, product_id) = seed_catalog(&pool, owner.id).await;
    let fakes = Fakes::default()
        .with_billing(FakeBilling::subscribed("3", "1"))
        .with_completion(ScriptedCompletion::new([SELECTION, COPY]));

    let app = common::build_test_app_with(pool, &fakes);
    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        generate_body(brand_id, product_id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(fakes.completion.calls(), 0);
}
