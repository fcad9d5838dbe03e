//! End-to-end tests for the storefront client.
//!
//! Each test starts a `wiremock` server standing in for the shop API and
//! drives the real `ApiClient`, coordinators and views against it.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p popacart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Bag loading, optimistic changes, rollback
//! - `wishlist_flow` - Desired-state favorites over the toggle endpoint
//! - `catalog` - Listing, detail and caching
//! - `auth` - Login, logout and session expiry
//! - `checkout` - Order placement
//! - `listing` - New product uploads

#![allow(clippy::missing_panics_doc)]

use popacart_storefront::{ApiClient, AppState, Session, StorefrontConfig};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::MockServer;

/// Token used by [`TestContext::logged_in`].
pub const TEST_TOKEN: &str = "test-token";

/// A mock shop API and the application state pointed at it.
pub struct TestContext {
    pub server: MockServer,
    pub state: AppState,
}

impl TestContext {
    /// Anonymous session.
    pub async fn new() -> Self {
        Self::with_session(Session::new()).await
    }

    /// Session already holding [`TEST_TOKEN`].
    pub async fn logged_in() -> Self {
        let session = Session::new();
        session.establish(SecretString::from(TEST_TOKEN.to_string()), None);
        Self::with_session(session).await
    }

    async fn with_session(session: Session) -> Self {
        let server = MockServer::start().await;
        let state = AppState::with_session(config_for(&server), session)
            .expect("Failed to build application state");
        Self { server, state }
    }

    pub fn client(&self) -> &ApiClient {
        self.state.client()
    }

    /// Requests the mock server received for `method` and `path`.
    pub async fn requests_to(&self, method: &str, path: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.method.as_str() == method && request.url.path() == path)
            .collect()
    }
}

/// Configuration pointed at `server`, with short timeouts.
pub fn config_for(server: &MockServer) -> StorefrontConfig {
    StorefrontConfig::from_lookup(|key| match key {
        "POPACART_REQUEST_TIMEOUT_SECS" => Some("2".to_string()),
        _ => None,
    })
    .and_then(|config| config.with_api_url(&format!("{}/api/v1/", server.uri())))
    .expect("Failed to build test configuration")
}

/// A catalog product as the API returns it.
pub fn product_json(id: &str, name: &str, price: u32) -> Value {
    json!({
        "_id": id,
        "name": name,
        "brand": "Isband",
        "price": price,
        "colors": [{"name": "Sand", "hex": "#c2b280", "images": [format!("https://img/{id}.jpg")]}],
        "sizes": ["M", "L"]
    })
}

/// A `GET /cart` body for `(product_id, quantity, unit_price)` lines.
pub fn cart_json(lines: &[(&str, u32, u32)]) -> Value {
    let products: Vec<Value> = lines
        .iter()
        .map(|&(id, quantity, price)| {
            json!({
                "productId": id,
                "quantity": quantity,
                "subtotal": quantity * price,
                "product": product_json(id, &format!("Product {id}"), price)
            })
        })
        .collect();
    let total: u32 = lines.iter().map(|&(_, quantity, price)| quantity * price).sum();

    json!({
        "success": true,
        "cart": {"products": products, "totalPrice": total}
    })
}
