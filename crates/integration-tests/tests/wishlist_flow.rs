//! Favorites over the API's toggle endpoint.

use popacart_core::ProductId;
use popacart_integration_tests::{TestContext, product_json};
use popacart_storefront::views::{Navigation, Toast, WishlistPage, WishlistView};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_wishlist(ctx: &TestContext, products: Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/wishlist/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "wishlist": products })))
        .mount(&ctx.server)
        .await;
}

#[tokio::test]
async fn test_wishlist_renders_product_cards() {
    let ctx = TestContext::logged_in().await;
    mount_wishlist(&ctx, json!([product_json("p1", "Linen Shirt", 1499), "p2"])).await;

    let page = WishlistPage::new(ctx.state.wishlist());
    assert_eq!(page.mount().await, Navigation::Stay);

    let WishlistView::Items { count, cards } = page.render() else {
        panic!("expected items");
    };
    assert_eq!(count, 2);
    assert_eq!(cards[0].name, "Linen Shirt");
    // Bare ids still get a card.
    assert_eq!(cards[1].name, "p2");
}

#[tokio::test]
async fn test_add_of_present_product_sends_no_toggle() {
    let ctx = TestContext::logged_in().await;
    mount_wishlist(&ctx, json!([product_json("p1", "Linen Shirt", 1499)])).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/wishlist/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let page = WishlistPage::new(ctx.state.wishlist());
    page.mount().await;

    assert_eq!(page.add(ProductId::new("p1")).await, Navigation::Stay);
    assert_eq!(
        page.notifications().latest(),
        Some(Toast::success("Added to your favorites"))
    );
    assert!(page.coordinator().contains(&ProductId::new("p1")));
}

#[tokio::test]
async fn test_remove_toggles_once_when_present() {
    let ctx = TestContext::logged_in().await;
    // Page load and the membership check see the product; later reads don't.
    Mock::given(method("GET"))
        .and(path("/api/v1/wishlist/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"wishlist": [product_json("p1", "Linen Shirt", 1499)]})),
        )
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&ctx.server)
        .await;
    mount_wishlist(&ctx, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/wishlist/add"))
        .and(body_json(json!({"productId": "p1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "Removed from wishlist"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let page = WishlistPage::new(ctx.state.wishlist());
    page.mount().await;

    assert_eq!(page.remove(ProductId::new("p1")).await, Navigation::Stay);
    assert_eq!(page.render(), WishlistView::Empty);
    assert_eq!(
        page.notifications().latest(),
        Some(Toast::success("Removed from your favorites"))
    );
}

#[tokio::test]
async fn test_failed_add_rolls_back() {
    let ctx = TestContext::logged_in().await;
    mount_wishlist(&ctx, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/wishlist/add"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let page = WishlistPage::new(ctx.state.wishlist());
    page.mount().await;

    assert_eq!(page.toggle(ProductId::new("p1")).await, Navigation::Stay);
    assert_eq!(page.render(), WishlistView::Empty);
    assert_eq!(
        page.notifications().latest(),
        Some(Toast::error("Could not reach the store. Please try again."))
    );
}
