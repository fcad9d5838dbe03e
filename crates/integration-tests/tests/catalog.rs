//! Catalog listing, product detail and the in-memory cache.

use popacart_core::{ProductId, ProductQuery};
use popacart_integration_tests::{TestContext, product_json};
use popacart_storefront::views::catalog::{ProductDetailState, ProductListView};
use popacart_storefront::views::{Navigation, ProductDetailPage, ProductListPage};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_listing_pages_through_results() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/product"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json("p1", "Linen Shirt", 1499)],
            "totalPages": 2
        })))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/product"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json("p2", "Chinos", 1999)],
            "totalPages": 2
        })))
        .mount(&ctx.server)
        .await;

    let mut page = ProductListPage::new(ctx.client().clone(), ProductQuery::default());
    page.mount().await;
    let ProductListView::Items {
        page_label,
        has_previous,
        has_next,
        ..
    } = page.render()
    else {
        panic!("expected items");
    };
    assert_eq!(page_label, "Page 1 of 2");
    assert!(!has_previous && has_next);

    page.next().await;
    assert_eq!(page.query().page, 2);
    assert_eq!(page.open(0), Navigation::ProductDetail(ProductId::new("p2")));

    // Already on the last page.
    page.next().await;
    assert_eq!(page.query().page, 2);
}

#[tokio::test]
async fn test_search_resets_to_first_page_and_is_not_cached() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/product"))
        .and(query_param("search", "linen"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json("p1", "Linen Shirt", 1499)],
            "totalPages": 1
        })))
        .expect(2)
        .mount(&ctx.server)
        .await;

    let query = ProductQuery {
        page: 3,
        ..ProductQuery::default()
    };
    let mut page = ProductListPage::new(ctx.client().clone(), query);
    page.search("linen").await;
    assert_eq!(page.query().page, 1);
    page.search("linen").await;

    assert!(matches!(page.render(), ProductListView::Items { .. }));
}

#[tokio::test]
async fn test_price_filter_sends_range_from_first_page() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/product"))
        .and(query_param("minPrice", "500"))
        .and(query_param("maxPrice", "2000"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json("p1", "Linen Shirt", 1499)],
            "totalPages": 1
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let query = ProductQuery {
        page: 3,
        ..ProductQuery::default()
    };
    let mut page = ProductListPage::new(ctx.client().clone(), query);
    page.filter_price(Some(Decimal::new(2000, 0)), Some(Decimal::new(500, 0))).await;

    assert_eq!(page.query().page, 1);
    assert_eq!(page.query().min_price, Some(Decimal::new(500, 0)));
    assert!(matches!(page.render(), ProductListView::Items { .. }));
}

#[tokio::test]
async fn test_empty_listing() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/product"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .mount(&ctx.server)
        .await;

    let mut page = ProductListPage::new(ctx.client().clone(), ProductQuery::default());
    page.mount().await;
    assert_eq!(page.render(), ProductListView::Empty);
}

#[tokio::test]
async fn test_product_detail_is_served_from_cache() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/product/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "product": product_json("p1", "Linen Shirt", 1499)
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    for _ in 0..2 {
        let mut page = ProductDetailPage::new(ctx.client().clone(), ProductId::new("p1"));
        page.mount().await;
        let ProductDetailState::Ready(detail) = page.render() else {
            panic!("expected product");
        };
        assert_eq!(detail.name, "Linen Shirt");
        assert_eq!(detail.price, "₹1499.00");
    }
}

#[tokio::test]
async fn test_missing_product_shows_not_found() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/product/nope"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"success": false, "message": "Product not found"})),
        )
        .mount(&ctx.server)
        .await;

    let mut page = ProductDetailPage::new(ctx.client().clone(), ProductId::new("nope"));
    page.mount().await;
    assert_eq!(page.render(), ProductDetailState::NotFound);
    assert!(page.product().is_none());
}

#[tokio::test]
async fn test_server_error_shows_retryable_message() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/product/p1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&ctx.server)
        .await;

    let mut page = ProductDetailPage::new(ctx.client().clone(), ProductId::new("p1"));
    page.mount().await;
    assert_eq!(
        page.render(),
        ProductDetailState::Error {
            message: "Could not reach the store. Please try again.".to_string()
        }
    );
}
