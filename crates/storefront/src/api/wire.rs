//! JSON shapes exchanged with the shop API.
//!
//! Every response is `{ success, message?, ...payload }`; [`Envelope`]
//! splits the common fields from the payload. Field names follow the API's
//! camelCase and Mongo-style `_id`.

use popacart_core::{ColorChoice, LineKey, ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Responses
// =============================================================================

/// The common response wrapper.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Omitted by some reads; the HTTP status decides then.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

/// Payload for responses whose body beyond the envelope is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct Nothing {}

/// Body of an error response.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CartPayload {
    #[serde(default)]
    pub cart: Option<WireCart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCart {
    #[serde(default)]
    pub products: Vec<WireCartItem>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCartItem {
    pub product_id: ProductRef,
    pub quantity: u32,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub selected_color: Option<WireSelectedColor>,
    #[serde(default)]
    pub selected_size: Option<String>,
    #[serde(default)]
    pub product: Option<WireProduct>,
}

/// A product reference that may or may not be populated.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(ProductId),
    Populated(Box<WireProduct>),
}

impl ProductRef {
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Id(id) => id,
            Self::Populated(product) => &product.id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireSelectedColor {
    #[serde(alias = "colorName")]
    pub name: String,
    #[serde(default, alias = "colorHex")]
    pub hex: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub final_price: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub colors: Vec<WireProductColor>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireProductColor {
    #[serde(alias = "colorName")]
    pub name: String,
    #[serde(default, alias = "colorHex")]
    pub hex: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListPayload {
    #[serde(default)]
    pub products: Vec<WireProduct>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    #[serde(default)]
    pub product: Option<WireProduct>,
}

#[derive(Debug, Deserialize)]
pub struct WishlistPayload {
    #[serde(default)]
    pub wishlist: Vec<ProductRef>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<WireUser>,
}

#[derive(Debug, Deserialize)]
pub struct WireUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MutationPayload {
    #[serde(default)]
    pub cart: Option<WireCart>,
}

// =============================================================================
// Requests
// =============================================================================

/// A line as the cart endpoints expect it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRef<'a> {
    pub product_id: &'a ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<&'a ColorChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<&'a str>,
}

impl<'a> LineRef<'a> {
    #[must_use]
    pub fn new(key: &'a LineKey, quantity: Option<u32>) -> Self {
        Self {
            product_id: &key.product_id,
            quantity,
            selected_color: key.selected_color.as_ref(),
            selected_size: key.selected_size.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddToCartBody<'a> {
    pub products: [LineRef<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistToggleBody<'a> {
    pub product_id: &'a ProductId,
}

#[derive(Serialize)]
pub struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// An offered size in a new listing.
#[derive(Debug, Serialize)]
pub struct SizeStock<'a> {
    pub size: &'a str,
    pub stock: u32,
}

/// An offered color in a new listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorCode<'a> {
    pub color_name: &'a str,
    pub color_code: String,
}
