//! The generate-email pipeline.
//!
//! 1. Usage gate (no side effects on denial).
//! 2. Load the brand and product.
//! 3. Pick a template, pre-fill brand style, write copy.
//! 4. Persist the result as a new `generated` session holding one save.
//!
//! Any failure before step 4 leaves the database untouched.

use mailspark_core::catalog::TemplateKind;
use mailspark_core::copywriting::{select_template, write_copy, BrandFacts, CopyInput, ProductFacts};
use mailspark_core::error::CoreError;
use mailspark_core::session_codec::SaveEntry;
use mailspark_core::style::prefill;
use mailspark_core::template::TemplateNode;
use mailspark_core::types::DbId;
use mailspark_db::models::editor_session::{CreateEditorSession, EditorSession, SessionType};
use mailspark_db::repositories::EditorSessionRepo;
use serde::{Deserialize, Serialize};

use crate::engine::access::{owned_brand, owned_product, Access};
use crate::engine::usage::{check_generation_allowance, require};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const DEFAULT_DESIGN_STYLE: &str = "modern";

/// Request body for `POST /ai/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateEmailRequest {
    pub brand_id: DbId,
    pub product_id: DbId,
    /// What the email should be about.
    pub prompt: String,
    #[serde(default = "default_design_style")]
    pub design_style: String,
    pub session_name: Option<String>,
}

fn default_design_style() -> String {
    DEFAULT_DESIGN_STYLE.to_string()
}

#[derive(Debug, Serialize)]
pub struct GeneratedEmail {
    pub session: EditorSession,
    pub template_name: TemplateKind,
    /// The filled template, uncompressed.
    pub template: TemplateNode,
}

pub async fn generate_email(
    state: &AppState,
    user_id: DbId,
    request: &GenerateEmailRequest,
) -> AppResult<GeneratedEmail> {
    if request.prompt.trim().is_empty() {
        return Err(CoreError::Validation("prompt must not be empty".into()).into());
    }

    if let Err(denied) = require(check_generation_allowance(state, user_id).await?) {
        tracing::info!(user_id, "Generation denied by usage gate");
        return Err(denied);
    }

    let brand = owned_brand(&state.pool, user_id, request.brand_id, Access::Read).await?;
    let (product, _) = owned_product(&state.pool, user_id, request.product_id, Access::Read).await?;
    if product.brand_id != brand.id {
        return Err(CoreError::Validation(format!(
            "Product {} does not belong to brand {}",
            product.id, brand.id
        ))
        .into());
    }

    let completion = state.completion.as_ref();
    let kind = select_template(completion, &request.prompt, &request.design_style).await?;
    tracing::debug!(user_id, template = kind.name(), "Template selected");

    let skeleton = prefill(&kind.skeleton()?, &brand.colors.0, &brand.fonts.0);
    let input = CopyInput {
        prompt: &request.prompt,
        brand: BrandFacts {
            name: &brand.brand_name,
            logos: &brand.logos,
        },
        product: ProductFacts {
            name: &product.product_name,
            description: product.description.as_deref(),
            price: product.price.as_deref(),
            images: &product.images,
        },
    };
    let filled = write_copy(completion, &input, &skeleton).await?;

    let json = filled
        .to_pretty_json()
        .map_err(|e| AppError::InternalError(format!("Failed to serialize template: {e}")))?;
    let entry = SaveEntry::new(&json, chrono::Utc::now())?;

    let create = CreateEditorSession {
        brand_id: Some(brand.id),
        product_id: Some(product.id),
        session_name: request
            .session_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("{} - {}", brand.brand_name, product.product_name)),
        session_type: SessionType::Generated,
    };
    let session =
        EditorSessionRepo::create(&state.pool, user_id, &create, std::slice::from_ref(&entry))
            .await?;

    tracing::info!(
        user_id,
        session_id = session.id,
        template = kind.name(),
        "Generated email session"
    );

    Ok(GeneratedEmail {
        session,
        template_name: kind,
        template: filled,
    })
}
