//! Built-in email template skeletons.
//!
//! Each variant embeds its skeleton JSON at compile time. The completion
//! provider picks a variant by name during generation.

use serde::Serialize;

use crate::error::CoreError;
use crate::template::TemplateNode;

const SALES_SKELETON: &str = include_str!("../templates/sales.json");
const DESCRIPTION_SKELETON: &str = include_str!("../templates/description.json");

/// Template variants the generator can choose between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemplateKind {
    #[serde(rename = "salesTemplate")]
    Sales,
    #[serde(rename = "descriptionTemplate")]
    Description,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [TemplateKind::Sales, TemplateKind::Description];

    /// Identifier the completion provider answers with.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sales => "salesTemplate",
            Self::Description => "descriptionTemplate",
        }
    }

    /// One-line description shown to the provider when choosing.
    pub fn description(self) -> &'static str {
        match self {
            Self::Sales => "A template to showcase many items and get sales",
            Self::Description => {
                "A template to showcase the item with a detailed description, \
                 suitable for selling one item."
            }
        }
    }

    /// Parse from the name returned by the provider (case-sensitive, trimmed).
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim() {
            "salesTemplate" => Ok(Self::Sales),
            "descriptionTemplate" => Ok(Self::Description),
            other => Err(CoreError::Validation(format!(
                "Unknown template '{other}'. Must be one of: salesTemplate, descriptionTemplate"
            ))),
        }
    }

    /// Parse the embedded skeleton.
    pub fn skeleton(self) -> Result<TemplateNode, CoreError> {
        let raw = match self {
            Self::Sales => SALES_SKELETON,
            Self::Description => DESCRIPTION_SKELETON,
        };
        TemplateNode::parse(raw)
            .map_err(|e| CoreError::Internal(format!("Embedded {} is invalid: {e}", self.name())))
    }
}

/// `name: description` pairs joined for the selection prompt.
pub fn catalog_listing() -> String {
    TemplateKind::ALL
        .iter()
        .map(|kind| format!("{}: {}", kind.name(), kind.description()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::extract_placeholders;

    #[test]
    fn every_skeleton_parses_and_has_image_tokens() {
        for kind in TemplateKind::ALL {
            let skeleton = kind.skeleton().expect("embedded skeleton must parse");
            let keys = extract_placeholders(&skeleton);
            assert!(keys.contains("logo"), "{} lacks logo", kind.name());
            assert!(keys.contains("image_1"), "{} lacks image_1", kind.name());
            assert!(keys.contains("text_color"), "{} lacks style tokens", kind.name());
        }
    }

    #[test]
    fn from_name_round_trips() {
        for kind in TemplateKind::ALL {
            assert_eq!(TemplateKind::from_name(kind.name()).unwrap(), kind);
        }
        assert_eq!(
            TemplateKind::from_name("  salesTemplate\n").unwrap(),
            TemplateKind::Sales
        );
    }

    #[test]
    fn unknown_name_rejected() {
        let err = TemplateKind::from_name("newsletterTemplate").unwrap_err();
        assert!(err.to_string().contains("Unknown template"));
    }

    #[test]
    fn listing_mentions_every_variant() {
        let listing = catalog_listing();
        assert!(listing.contains("salesTemplate: A template to showcase many items"));
        assert!(listing.contains("descriptionTemplate: "));
    }
}
