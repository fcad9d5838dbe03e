//! Product variant selection and line item identity.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A selected product color.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColorChoice {
    /// Human-readable color name (e.g., "Crimson").
    pub name: String,
    /// Hex code including the leading `#` (e.g., "#dc143c").
    pub hex: String,
}

impl ColorChoice {
    /// Create a color choice.
    #[must_use]
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
        }
    }
}

/// Identity of a cart line: product plus selected color and size.
///
/// Two lines with the same product but a different color or size are
/// distinct lines.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    /// The product.
    pub product_id: ProductId,
    /// Selected color, if the product has color variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<ColorChoice>,
    /// Selected size, if the product has size variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
}

impl LineKey {
    /// Key for a product without variant selection.
    #[must_use]
    pub const fn product(product_id: ProductId) -> Self {
        Self {
            product_id,
            selected_color: None,
            selected_size: None,
        }
    }

    /// Set the selected color.
    #[must_use]
    pub fn with_color(mut self, color: ColorChoice) -> Self {
        self.selected_color = Some(color);
        self
    }

    /// Set the selected size.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.selected_size = Some(size.into());
        self
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.product_id)?;
        match (&self.selected_color, &self.selected_size) {
            (Some(color), Some(size)) => write!(f, " ({}, {size})", color.name),
            (Some(color), None) => write!(f, " ({})", color.name),
            (None, Some(size)) => write!(f, " ({size})"),
            (None, None) => Ok(()),
        }
    }
}
