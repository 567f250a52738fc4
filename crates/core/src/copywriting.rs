//! Copy generation: prompt composition, completion parsing and the merge
//! of generated copy into a template skeleton.
//!
//! Image placeholders never take their value from the model. `logo` and
//! [`COVER_IMAGE_KEY`] are always overridden with sanitized URLs taken from
//! the brand and product records.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::catalog::{catalog_listing, TemplateKind};
use crate::error::CoreError;
use crate::providers::{ChatPrompt, CompletionProvider, ProviderError};
use crate::template::{extract_placeholders, fill, ContentMap, TemplateNode};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Placeholder bound to the brand's first logo.
pub const LOGO_KEY: &str = "logo";

/// Placeholder bound to the chosen cover image.
pub const COVER_IMAGE_KEY: &str = "image_1";

static LEADING_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(?:```|""")(?:json|JSON)?"#).expect("valid regex"));

static TRAILING_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:```|""")$"#).expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Errors from a single generation attempt. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Completion is not a valid JSON object: {0}")]
    InvalidJson(String),

    #[error(transparent)]
    Template(#[from] CoreError),
}

/// Brand facts given to the copywriter.
#[derive(Debug, Clone, Copy)]
pub struct BrandFacts<'a> {
    pub name: &'a str,
    pub logos: &'a [String],
}

/// Product facts given to the copywriter.
#[derive(Debug, Clone, Copy)]
pub struct ProductFacts<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: Option<&'a str>,
    pub images: &'a [String],
}

#[derive(Debug, Clone, Copy)]
pub struct CopyInput<'a> {
    /// Free-text instruction from the user.
    pub prompt: &'a str,
    pub brand: BrandFacts<'a>,
    pub product: ProductFacts<'a>,
}

// ---------------------------------------------------------------------------
// Image selection
// ---------------------------------------------------------------------------

/// Strip trailing whitespace and `}` left over from malformed upstream data.
pub fn sanitize_url(url: &str) -> &str {
    url.trim_end_matches(|c: char| c.is_whitespace() || c == '}')
}

/// First product image, falling back to the first brand logo.
pub fn select_cover_image(product_images: &[String], brand_logos: &[String]) -> Option<String> {
    product_images
        .first()
        .or_else(|| brand_logos.first())
        .map(|url| sanitize_url(url).to_string())
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Prompt asking the provider to pick one of the built-in templates.
pub fn template_selection_prompt(prompt: &str, design_style: &str) -> ChatPrompt {
    let format = serde_json::json!({ "template_name": "{{name of template}}" });
    ChatPrompt {
        system: format!(
            "You are an email design specialist. Respond only with valid JSON in exactly \
             this format: {format}"
        ),
        user: format!(
            "Based on this prompt: \"{prompt}\" and the design style \"{design_style}\", \
             which email template should I use? Select one of the following templates and \
             respond with its name only.\nTemplates: {}",
            catalog_listing()
        ),
    }
}

/// Prompt asking the provider for one value per placeholder.
pub fn copy_prompt(
    input: &CopyInput<'_>,
    placeholders: &BTreeSet<String>,
    cover_image: Option<&str>,
) -> ChatPrompt {
    let schema: Map<String, Value> = placeholders
        .iter()
        .map(|key| (key.clone(), Value::String(format!("{{{{{key}}}}}"))))
        .collect();
    let keys: Vec<&str> = placeholders.iter().map(String::as_str).collect();

    let system = format!(
        "You are an email marketing specialist writing the content of an email template. \
         Respond with a single valid JSON object with exactly these keys, replacing each \
         value with the content for that placeholder: {}. The image URLs for \
         '{COVER_IMAGE_KEY}' and '{LOGO_KEY}' are supplied below.",
        Value::Object(schema)
    );

    let user = format!(
        "prompt: {}\n\
         brand name: {}\n\
         product name: {}\n\
         product description: {}\n\
         product price: {}\n\
         logos: {}\n\
         images: {}\n\
         The image selected for '{COVER_IMAGE_KEY}' is: {}\n\
         The output must include the following placeholders: {}.",
        input.prompt,
        input.brand.name,
        input.product.name,
        input.product.description.unwrap_or_default(),
        input.product.price.unwrap_or_default(),
        input.brand.logos.join(", "),
        input.product.images.join(", "),
        cover_image.unwrap_or("none"),
        keys.join(", "),
    );

    ChatPrompt { system, user }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Remove one leading and one trailing code fence (```` ``` ```` or `"""`).
fn strip_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(m) = LEADING_FENCE_RE.find(text) {
        text = &text[m.end()..];
    }
    if let Some(m) = TRAILING_FENCE_RE.find(text) {
        text = &text[..m.start()];
    }
    text.trim()
}

/// Parse a completion as a JSON object.
///
/// The raw text is tried first; if that fails a single fence strip is
/// applied and parsing is retried once.
pub fn parse_completion_json(raw: &str) -> Result<Map<String, Value>, CopyError> {
    let value = match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => value,
        Err(_) => serde_json::from_str::<Value>(strip_fence(raw))
            .map_err(|e| CopyError::InvalidJson(e.to_string()))?,
    };

    match value {
        Value::Object(object) => Ok(object),
        other => Err(CopyError::InvalidJson(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Ask the provider which built-in template suits the request.
pub async fn select_template(
    provider: &dyn CompletionProvider,
    prompt: &str,
    design_style: &str,
) -> Result<TemplateKind, CopyError> {
    let raw = provider
        .complete(&template_selection_prompt(prompt, design_style))
        .await?;
    let object = parse_completion_json(&raw)?;
    let name = object
        .get("template_name")
        .and_then(Value::as_str)
        .ok_or_else(|| CopyError::InvalidJson("missing string field 'template_name'".into()))?;
    Ok(TemplateKind::from_name(name)?)
}

/// Generated copy plus the forced image overrides.
pub fn merge_copy(
    generated: &Map<String, Value>,
    brand_logos: &[String],
    cover_image: Option<String>,
) -> ContentMap {
    let mut content = ContentMap::from_json_object(generated);
    content.remove(LOGO_KEY);
    content.remove(COVER_IMAGE_KEY);
    content.insert_opt(
        LOGO_KEY,
        brand_logos.first().map(|logo| sanitize_url(logo).to_string()),
    );
    content.insert_opt(COVER_IMAGE_KEY, cover_image);
    content
}

/// Write copy for `skeleton` with exactly one completion call and return
/// the filled template.
pub async fn write_copy(
    provider: &dyn CompletionProvider,
    input: &CopyInput<'_>,
    skeleton: &TemplateNode,
) -> Result<TemplateNode, CopyError> {
    let placeholders = extract_placeholders(skeleton);
    let cover_image = select_cover_image(input.product.images, input.brand.logos);

    tracing::debug!(
        placeholder_count = placeholders.len(),
        cover_image = cover_image.as_deref().unwrap_or("none"),
        "Requesting email copy"
    );

    let prompt = copy_prompt(input, &placeholders, cover_image.as_deref());
    let raw = provider.complete(&prompt).await?;
    let generated = parse_completion_json(&raw)?;

    let content = merge_copy(&generated, input.brand.logos, cover_image);
    Ok(fill(skeleton, &content))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
