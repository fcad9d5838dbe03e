//! New product listings.

use popacart_core::{ListingImage, ProductListing};
use popacart_integration_tests::TestContext;
use popacart_storefront::views::{Navigation, ProductListingForm, ToastKind};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn filled(ctx: &TestContext) -> ProductListingForm {
    let mut form = ProductListingForm::new(ctx.client().clone());
    form.listing = ProductListing::default();
    form.listing.name = "Linen Shirt".to_string();
    form.listing.description = "Breathable summer shirt".to_string();
    form.listing.price = Decimal::new(1499, 0);
    form.listing.category = "Men".to_string();
    form.listing.brand = "Popa".to_string();
    form.listing.kind = "Shirt".to_string();
    form.listing.material = "Linen".to_string();
    form.listing.care_instructions = "Machine wash cold".to_string();
    form.listing.gender = "Men".to_string();
    form.listing.toggle_size("M").expect("known size");
    form.listing.toggle_color("Red").expect("known color");
    form
}

fn image(name: &str) -> ListingImage {
    ListingImage {
        file_name: name.to_string(),
        content_type: Some("image/jpeg".to_string()),
        bytes: b"jpeg-bytes".to_vec(),
    }
}

#[tokio::test]
async fn test_listing_is_sent_as_multipart() {
    let ctx = TestContext::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/product/create-product"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"success": true, "message": "Product created successfully"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut form = filled(&ctx);
    form.listing
        .set_images("Red", vec![image("red-front.jpg"), image("red-back.jpg")])
        .expect("picked color");

    assert_eq!(form.submit().await, Navigation::Products);
    let response = form.response().expect("response shown");
    assert_eq!(response.kind, ToastKind::Success);
    assert_eq!(response.message, "Product created successfully");

    let requests = ctx.requests_to("POST", "/api/v1/product/create-product").await;
    let request = requests.first().expect("listing request");
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains(r#"name="type""#));
    assert!(body.contains(r#"[{"size":"M","stock":10}]"#));
    assert!(body.contains(r#"[{"colorName":"Red","colorCode":"red"}]"#));
    assert_eq!(body.matches(r#"name="images_Red""#).count(), 2);
    assert!(body.contains(r#"filename="red-back.jpg""#));
}

#[tokio::test]
async fn test_color_without_images_sends_no_request() {
    let ctx = TestContext::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/product/create-product"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let mut form = filled(&ctx);
    form.listing.toggle_color("Blue").expect("known color");
    form.listing
        .set_images("Blue", vec![image("blue.jpg")])
        .expect("picked color");

    assert_eq!(form.submit().await, Navigation::Stay);
    assert_eq!(
        form.response().map(|toast| toast.message.as_str()),
        Some("Please upload images for the following colors: Red")
    );
}

#[tokio::test]
async fn test_refused_listing_shows_server_message() {
    let ctx = TestContext::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/product/create-product"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"success": false, "message": "Only sellers can add products"})),
        )
        .mount(&ctx.server)
        .await;

    let mut form = filled(&ctx);
    form.listing.toggle_color("Red").expect("known color");

    assert_eq!(form.submit().await, Navigation::Stay);
    assert!(form.has_error());
    assert_eq!(
        form.response().map(|toast| toast.message.as_str()),
        Some("Only sellers can add products")
    );
}
