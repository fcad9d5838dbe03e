//! Catalog types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ColorChoice, ProductId};

/// A color variant of a product with its gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductColor {
    pub name: String,
    pub hex: Option<String>,
    pub images: Vec<String>,
}

impl ProductColor {
    /// The color as a cart selection. Colors without a hex code use an
    /// empty one.
    #[must_use]
    pub fn to_choice(&self) -> ColorChoice {
        ColorChoice::new(self.name.clone(), self.hex.clone().unwrap_or_default())
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    /// Product type (e.g., "t-shirt").
    pub kind: Option<String>,
    pub gender: Option<String>,
    pub description: Option<String>,
    /// List price.
    pub price: Decimal,
    /// Discounted price, when a discount applies.
    pub final_price: Option<Decimal>,
    pub colors: Vec<ProductColor>,
    pub sizes: Vec<String>,
}

impl Product {
    /// The price customers pay: the discounted price when present.
    #[must_use]
    pub fn display_price(&self) -> Decimal {
        self.final_price.unwrap_or(self.price)
    }

    /// First image of the first color.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.colors
            .first()
            .and_then(|color| color.images.first())
            .map(String::as_str)
    }

    /// Condensed form used by cards and the wishlist.
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            brand: self.brand.clone(),
            price: self.display_price(),
            image_url: self.primary_image().map(str::to_owned),
        }
    }
}

/// The fields a product card needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// Catalog listing filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductQuery {
    /// 1-based page number.
    pub page: u32,
    pub search: Option<String>,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            search: None,
            category: None,
            kind: None,
            min_price: None,
            max_price: None,
        }
    }
}

impl ProductQuery {
    /// Same filters with a new search term, back on the first page.
    /// Blank terms clear the search.
    #[must_use]
    pub fn with_search(&self, term: &str) -> Self {
        let term = term.trim();
        Self {
            page: 1,
            search: (!term.is_empty()).then(|| term.to_owned()),
            ..self.clone()
        }
    }

    /// Whether the listing is unfiltered apart from paging.
    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        self.search.is_none()
            && self.category.is_none()
            && self.kind.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// 1-based page number.
    pub page: u32,
    /// Total number of pages, at least 1.
    pub total_pages: u32,
}

impl ProductPage {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Linen Shirt".to_string(),
            brand: Some("Isband".to_string()),
            category: None,
            kind: None,
            gender: None,
            description: None,
            price: Decimal::new(1299, 0),
            final_price: Some(Decimal::new(999, 0)),
            colors: vec![ProductColor {
                name: "Sand".to_string(),
                hex: None,
                images: vec!["https://img/sand-1.jpg".to_string()],
            }],
            sizes: vec!["M".to_string()],
        }
    }

    #[test]
    fn test_summary_uses_final_price_and_first_image() {
        let summary = product().summary();
        assert_eq!(summary.price, Decimal::new(999, 0));
        assert_eq!(summary.image_url.as_deref(), Some("https://img/sand-1.jpg"));
    }

    #[test]
    fn test_with_search_resets_page() {
        let query = ProductQuery {
            page: 4,
            ..ProductQuery::default()
        };
        let searched = query.with_search("  shirt ");
        assert_eq!(searched.page, 1);
        assert_eq!(searched.search.as_deref(), Some("shirt"));
        assert!(searched.with_search("   ").is_unfiltered());
    }

    #[test]
    fn test_page_bounds() {
        let page = ProductPage {
            products: vec![],
            page: 1,
            total_pages: 1,
        };
        assert!(!page.has_previous());
        assert!(!page.has_next());
    }
}
