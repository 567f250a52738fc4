//! Brand style values and the pre-fill step applied to a skeleton before
//! copy is written.

use serde::{Deserialize, Serialize};

use crate::template::{fill, ContentMap, TemplateNode};

/// Colour set stored on a brand (`brands.colors` JSONB).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColors {
    #[serde(default, alias = "textColor")]
    pub text_color: Option<String>,
    #[serde(default, alias = "buttonColor")]
    pub button_color: Option<String>,
    #[serde(default, alias = "backgroundColor")]
    pub background_color: Option<String>,
}

/// Font pair stored on a brand (`brands.fonts` JSONB).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandFonts {
    #[serde(default, alias = "primaryFont")]
    pub primary_font: Option<String>,
    #[serde(default, alias = "secondaryFont")]
    pub secondary_font: Option<String>,
}

/// Fixed style placeholders every skeleton may reference.
pub fn style_content(colors: &BrandColors, fonts: &BrandFonts) -> ContentMap {
    let mut content = ContentMap::new();
    content.insert_opt("text_color", colors.text_color.clone());
    content.insert_opt("button_color", colors.button_color.clone());
    // Button labels reuse the body text colour.
    content.insert_opt("button_text_color", colors.text_color.clone());
    content.insert_opt("background_color", colors.background_color.clone());
    content.insert_opt("font_header", fonts.primary_font.clone());
    content.insert_opt("font_text", fonts.secondary_font.clone());
    content
}

/// Resolve the style placeholders of `skeleton`, leaving copy tokens intact.
pub fn prefill(skeleton: &TemplateNode, colors: &BrandColors, fonts: &BrandFonts) -> TemplateNode {
    fill(skeleton, &style_content(colors, fonts))
}
