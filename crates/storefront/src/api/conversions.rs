//! Conversions from wire shapes to domain types.

use popacart_core::{
    CartSnapshot, ColorChoice, LineItem, LineKey, Product, ProductColor, ProductSummary, Quantity,
    WishlistSnapshot,
};
use rust_decimal::Decimal;
use tracing::warn;

use super::wire::{ProductRef, WireCart, WireCartItem, WireProduct, WireUser};
use crate::session::CurrentUser;
use crate::store::WishlistListing;

pub fn convert_product(product: WireProduct) -> Product {
    Product {
        id: product.id,
        name: product.name,
        brand: product.brand,
        category: product.category,
        kind: product.kind,
        gender: product.gender,
        description: product.description,
        price: product.price.max(Decimal::ZERO),
        final_price: product.final_price,
        colors: product
            .colors
            .into_iter()
            .map(|color| ProductColor {
                name: color.name,
                hex: color.hex,
                images: color.images,
            })
            .collect(),
        sizes: product.sizes,
    }
}

/// Build a snapshot from the server's cart.
///
/// Lines with a zero quantity are dropped and duplicate keys merged. Line
/// prices, subtotals and the cart total are the server's; when the reported
/// total disagrees with the sum of the lines, the drift is logged.
pub fn convert_cart(cart: WireCart) -> CartSnapshot {
    let snapshot = CartSnapshot::from_server(
        cart.products.into_iter().filter_map(convert_cart_item),
        cart.total_price,
    );

    if cart.total_price.is_some() && snapshot.total_price() != snapshot.computed_total() {
        warn!(
            server_total = %snapshot.total_price(),
            computed_total = %snapshot.computed_total(),
            lines = snapshot.line_count(),
            "Cart total drift between server and recomputed totals"
        );
    }

    snapshot
}

fn convert_cart_item(item: WireCartItem) -> Option<LineItem> {
    let Ok(quantity) = Quantity::new(item.quantity) else {
        warn!(product_id = %item.product_id.id(), "Dropping cart line with zero quantity");
        return None;
    };

    let reference_id = item.product_id.id().clone();
    let product = match item.product_id {
        ProductRef::Populated(product) => Some(*product),
        ProductRef::Id(_) => item.product,
    };
    let product_id = product
        .as_ref()
        .map_or(reference_id, |product| product.id.clone());

    // Line price, then line subtotal, then the product's current price.
    let unit_price = item
        .price
        .or_else(|| item.subtotal.map(|subtotal| subtotal / Decimal::from(quantity.get())))
        .or_else(|| {
            product
                .as_ref()
                .map(|product| product.final_price.unwrap_or(product.price))
        })
        .unwrap_or(Decimal::ZERO);

    let mut key = LineKey::product(product_id);
    if let Some(color) = item.selected_color {
        key = key.with_color(ColorChoice::new(color.name, color.hex.unwrap_or_default()));
    }
    if let Some(size) = item.selected_size.filter(|size| !size.is_empty()) {
        key = key.with_size(size);
    }

    let (name, image_url) = product.map_or((None, None), |product| {
        let image = product
            .colors
            .first()
            .and_then(|color| color.images.first())
            .cloned();
        (Some(product.name), image)
    });

    let line = LineItem::new(key, quantity, unit_price).with_display(name, image_url);
    Some(match item.subtotal {
        Some(subtotal) => line.with_subtotal(subtotal),
        None => line,
    })
}

pub fn convert_wishlist(entries: Vec<ProductRef>) -> WishlistListing {
    let mut products = Vec::new();
    let ids = entries
        .into_iter()
        .map(|entry| match entry {
            ProductRef::Id(id) => id,
            ProductRef::Populated(product) => {
                let product = convert_product(*product);
                let id = product.id.clone();
                products.push(product.summary());
                id
            }
        })
        .collect::<Vec<_>>();

    WishlistListing {
        snapshot: WishlistSnapshot::from_ids(ids),
        products: dedupe_summaries(products),
    }
}

fn dedupe_summaries(products: Vec<ProductSummary>) -> Vec<ProductSummary> {
    let mut unique: Vec<ProductSummary> = Vec::with_capacity(products.len());
    for product in products {
        if !unique.iter().any(|existing| existing.id == product.id) {
            unique.push(product);
        }
    }
    unique
}

pub fn convert_user(user: WireUser) -> CurrentUser {
    CurrentUser {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::wire::Envelope;
    use crate::api::wire::{CartPayload, WishlistPayload};

    fn cart(json: &str) -> CartSnapshot {
        let envelope: Envelope<CartPayload> = serde_json::from_str(json).unwrap();
        convert_cart(envelope.payload.cart.unwrap())
    }

    #[test]
    fn test_unit_price_from_product_when_line_unpriced() {
        let snapshot = cart(
            r#"{"success": true, "cart": {"products": [
                {"productId": "p1", "quantity": 3, "product": {"_id": "p1", "name": "Tee", "price": 10,
                 "colors": [{"name": "Red", "images": ["https://img/red.jpg"]}]}}
            ], "totalPrice": 30}}"#,
        );
        let line = &snapshot.items()[0];
        assert_eq!(line.unit_price(), Decimal::new(10, 0));
        assert_eq!(line.name(), Some("Tee"));
        assert_eq!(line.image_url(), Some("https://img/red.jpg"));
        assert_eq!(snapshot.total_price(), Decimal::new(3000, 2));
    }

    #[test]
    fn test_line_price_wins_over_product_price() {
        let snapshot = cart(
            r#"{"cart": {"products": [
                {"productId": "p1", "quantity": 2, "price": 8, "subtotal": 16,
                 "product": {"_id": "p1", "name": "Tee", "price": 10}}
            ], "totalPrice": 16}}"#,
        );
        let line = &snapshot.items()[0];
        assert_eq!(line.unit_price(), Decimal::new(8, 0));
        assert_eq!(line.subtotal(), Decimal::new(1600, 2));
        assert_eq!(snapshot.total_price(), Decimal::new(1600, 2));
    }

    #[test]
    fn test_unit_price_falls_back_to_subtotal() {
        let snapshot = cart(
            r#"{"cart": {"products": [{"productId": "p1", "quantity": 4, "subtotal": 10}]}}"#,
        );
        assert_eq!(snapshot.items()[0].unit_price(), Decimal::new(25, 1));
        assert_eq!(snapshot.total_price(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_duplicate_lines_merged_and_variants_distinct() {
        let snapshot = cart(
            r#"{"cart": {"products": [
                {"productId": "p1", "quantity": 1, "price": 5, "selectedSize": "M"},
                {"productId": "p1", "quantity": 2, "price": 5, "selectedSize": "M"},
                {"productId": "p1", "quantity": 1, "price": 5, "selectedSize": "L"}
            ]}}"#,
        );
        assert_eq!(snapshot.line_count(), 2);
        assert_eq!(snapshot.items()[0].quantity().get(), 3);
    }

    #[test]
    fn test_server_total_is_copied() {
        let snapshot = cart(
            r#"{"cart": {"products": [{"productId": "p1", "quantity": 2, "price": 10}], "totalPrice": 999}}"#,
        );
        assert_eq!(snapshot.total_price(), Decimal::new(99900, 2));
        assert_eq!(snapshot.computed_total(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_server_subtotal_is_copied() {
        let snapshot = cart(
            r#"{"cart": {"products": [{"productId": "p1", "quantity": 3, "price": 10, "subtotal": 27}]}}"#,
        );
        assert_eq!(snapshot.items()[0].subtotal(), Decimal::new(2700, 2));
        assert_eq!(snapshot.total_price(), Decimal::new(2700, 2));
    }

    #[test]
    fn test_zero_quantity_line_dropped() {
        let snapshot = cart(r#"{"cart": {"products": [{"productId": "p1", "quantity": 0, "price": 10}]}}"#);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_wishlist_keeps_order_and_summaries() {
        let envelope: Envelope<WishlistPayload> = serde_json::from_str(
            r#"{"wishlist": [{"_id": "b", "name": "B", "price": 12, "finalPrice": 9}, "a"]}"#,
        )
        .unwrap();
        let listing = convert_wishlist(envelope.payload.wishlist);
        let ids: Vec<_> = listing.snapshot.ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(listing.products.len(), 1);
        assert_eq!(listing.products[0].price, Decimal::new(9, 0));
    }
}
