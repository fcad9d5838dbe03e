//! Client for the shop's REST API.
//!
//! # Architecture
//!
//! - The remote API is the source of truth for carts, wishlists, products,
//!   users and orders; nothing is stored locally besides the session token
//! - Every call is single-attempt and carries the session cookie and an
//!   `x-request-id` header
//! - Responses are normalized into typed payloads or a [`StoreError`]
//! - Products and product listings are cached in memory via `moka`
//!
//! # Example
//!
//! ```rust,ignore
//! use popacart_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config, session)?;
//!
//! let page = client.list_products(&ProductQuery::default()).await?;
//! let cart = client.fetch_cart().await?;
//! ```

mod cache;
mod conversions;
pub mod request_id;
pub mod wire;

use std::sync::Arc;

use moka::future::Cache;
use popacart_core::listing::INITIAL_SIZE_STOCK;
use popacart_core::{
    CartIntent, CartSnapshot, Email, MutationIntent, OrderRequest, Product, ProductId,
    ProductListing, ProductPage, ProductQuery, WishlistIntent,
};
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;
use crate::session::{CurrentUser, Session};
use crate::store::{Ack, RemoteStore, StoreError, WishlistListing};

use cache::{CacheKey, CacheValue};
use conversions::{convert_cart, convert_product, convert_user, convert_wishlist};
use request_id::{REQUEST_ID_HEADER, next_request_id};
use wire::{
    AddToCartBody, CartPayload, ColorCode, Envelope, ErrorBody, LineRef, LoginBody, LoginPayload,
    MutationPayload, Nothing, ProductListPayload, ProductPayload, SizeStock, WishlistPayload,
    WishlistToggleBody,
};

/// Longest response excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the shop API.
///
/// Cheap to clone; clones share the HTTP connection pool, the catalog
/// cache and the session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    cookie_name: String,
    session: Session,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client bound to `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig, session: Session) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("popacart/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_url.clone(),
                cookie_name: config.session_cookie.clone(),
                session,
                cache,
            }),
        })
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| StoreError::Network(format!("invalid endpoint {path}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut request = self
            .inner
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, next_request_id());

        if let Some(token) = self.inner.session.token() {
            request = request.header(
                COOKIE,
                format!("{}={}", self.inner.cookie_name, token.expose_secret()),
            );
        }

        request
    }

    /// Send a request and decode the enveloped payload.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, StoreError> {
        self.execute_with_headers(request)
            .await
            .map(|(_, envelope)| envelope)
    }

    /// Like [`Self::execute`], also returning the response headers.
    async fn execute_with_headers<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(HeaderMap, Envelope<T>), StoreError> {
        let response = request.send().await?;

        let status = response.status();
        let headers = response.headers().clone();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &response_text));
        }

        let envelope: Envelope<T> = match serde_json::from_str(&response_text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %excerpt(&response_text),
                    "Failed to parse shop API response"
                );
                return Err(e.into());
            }
        };

        if envelope.success == Some(false) {
            debug!(message = ?envelope.message, "Shop API rejected request");
            return Err(StoreError::Validation(
                envelope
                    .message
                    .unwrap_or_else(|| "The request was rejected".to_string()),
            ));
        }

        Ok((headers, envelope))
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    #[instrument(skip(self), fields(request_id = tracing::field::Empty))]
    async fn get_cart(&self) -> Result<CartSnapshot, StoreError> {
        let request = self.request(Method::GET, self.endpoint("cart")?);
        let envelope: Envelope<CartPayload> = self.execute(request).await?;

        Ok(envelope
            .payload
            .cart
            .map(convert_cart)
            .unwrap_or_default())
    }

    #[instrument(skip(self), fields(request_id = tracing::field::Empty, key = ?intent.key()))]
    async fn mutate_cart(&self, intent: &CartIntent) -> Result<Ack, StoreError> {
        let request = match intent {
            CartIntent::AddItem(line) => self
                .request(Method::POST, self.endpoint("cart/add")?)
                .json(&AddToCartBody {
                    products: [LineRef::new(&line.key, Some(line.quantity.get()))],
                }),
            CartIntent::UpdateQuantity { key, quantity } => self
                .request(Method::PUT, self.endpoint("cart/update-quantity")?)
                .json(&LineRef::new(key, Some(*quantity))),
            CartIntent::RemoveItem { key } => self
                .request(Method::DELETE, self.endpoint("cart/remove-item")?)
                .json(&LineRef::new(key, None)),
            CartIntent::ClearCart => self.request(Method::DELETE, self.endpoint("cart/clear")?),
        };

        let envelope: Envelope<MutationPayload> = self.execute(request).await?;

        Ok(Ack {
            message: envelope.message,
            cart: envelope.payload.cart.map(convert_cart),
        })
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    #[instrument(skip(self), fields(request_id = tracing::field::Empty))]
    async fn get_wishlist(&self) -> Result<WishlistListing, StoreError> {
        let request = self.request(Method::GET, self.endpoint("wishlist/")?);
        let envelope: Envelope<WishlistPayload> = self.execute(request).await?;

        Ok(convert_wishlist(envelope.payload.wishlist))
    }

    /// Bring the server's membership of one product to the desired state.
    ///
    /// The API only offers a toggle, so the current membership is read first
    /// and the toggle sent only when it differs. Re-sending is harmless.
    #[instrument(skip(self), fields(request_id = tracing::field::Empty, product_id = %intent.product_id()))]
    async fn mutate_wishlist(&self, intent: &WishlistIntent) -> Result<Ack, StoreError> {
        let current = self.get_wishlist().await?;
        if current.snapshot.contains(intent.product_id()) == intent.desired_membership() {
            debug!("Wishlist already in desired state");
            return Ok(Ack::default());
        }

        let request = self
            .request(Method::POST, self.endpoint("wishlist/add")?)
            .json(&WishlistToggleBody {
                product_id: intent.product_id(),
            });
        let envelope: Envelope<Nothing> = self.execute(request).await?;

        Ok(Ack {
            message: envelope.message,
            cart: None,
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a page of products.
    ///
    /// Listings without a search term are cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(request_id = tracing::field::Empty))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, StoreError> {
        let cache_key = CacheKey::Products(query.clone());
        let cacheable = query.search.is_none();

        if cacheable
            && let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let mut params: Vec<(&str, String)> = vec![("page", query.page.to_string())];
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }
        if let Some(kind) = &query.kind {
            params.push(("type", kind.clone()));
        }
        if let Some(min_price) = query.min_price {
            params.push(("minPrice", min_price.to_string()));
        }
        if let Some(max_price) = query.max_price {
            params.push(("maxPrice", max_price.to_string()));
        }

        let request = self
            .request(Method::GET, self.endpoint("product")?)
            .query(&params);
        let envelope: Envelope<ProductListPayload> = self.execute(request).await?;

        let page = ProductPage {
            products: envelope
                .payload
                .products
                .into_iter()
                .map(convert_product)
                .collect(),
            page: query.page.max(1),
            total_pages: envelope.payload.total_pages.unwrap_or(1).max(1),
        };

        if cacheable {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Get a product by id. Returns `None` when the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(request_id = tracing::field::Empty, product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let mut url = self.endpoint("product/")?;
        url.path_segments_mut()
            .map_err(|()| StoreError::Network("API base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push(id.as_str());

        let envelope: Envelope<ProductPayload> =
            match self.execute(self.request(Method::GET, url)).await {
                Ok(envelope) => envelope,
                Err(StoreError::Validation(message)) => {
                    debug!(%message, "Product lookup rejected");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };

        let Some(product) = envelope.payload.product.map(convert_product) else {
            return Ok(None);
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    /// Upload a new product listing with its images. Returns the server's
    /// message.
    ///
    /// Sent as `multipart/form-data`; each image goes in an
    /// `images_<Color>` part. The catalog cache is emptied afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing is refused or the request fails.
    #[instrument(skip(self, listing), fields(request_id = tracing::field::Empty, name = %listing.name))]
    pub async fn create_product(
        &self,
        listing: &ProductListing,
    ) -> Result<Option<String>, StoreError> {
        let form = listing_form(listing)?;
        let request = self
            .request(Method::POST, self.endpoint("product/create-product")?)
            .multipart(form);
        let envelope: Envelope<Nothing> = self.execute(request).await?;

        self.inner.cache.invalidate_all();
        Ok(envelope.message)
    }

    // =========================================================================
    // Account Methods
    // =========================================================================

    /// Log in and store the credential in the session.
    ///
    /// The token is read from the response body, falling back to the
    /// session cookie the server sets.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are refused or the request fails.
    #[instrument(skip(self, email, password), fields(request_id = tracing::field::Empty))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Option<CurrentUser>, StoreError> {
        let request = self
            .request(Method::POST, self.endpoint("user/login")?)
            .json(&LoginBody {
                email: email.as_str(),
                password: password.expose_secret(),
            });
        let (headers, envelope): (_, Envelope<LoginPayload>) =
            self.execute_with_headers(request).await?;

        let token = envelope
            .payload
            .token
            .or_else(|| cookie_from_headers(&headers, &self.inner.cookie_name))
            .ok_or_else(|| {
                StoreError::Network("login response carried no session token".to_string())
            })?;

        let user = envelope.payload.user.map(convert_user);
        self.inner
            .session
            .establish(SecretString::from(token), user.clone());

        Ok(user)
    }

    /// Tell the server to end the session.
    ///
    /// The local session is left untouched; callers decide when to clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(request_id = tracing::field::Empty))]
    pub async fn logout(&self) -> Result<(), StoreError> {
        let request = self.request(Method::POST, self.endpoint("user/logout")?);
        let _: Envelope<Nothing> = self.execute(request).await?;
        Ok(())
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Place an order for the current cart. Returns the server's message.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is refused or the request fails.
    #[instrument(skip(self, order), fields(request_id = tracing::field::Empty, payment = %order.payment.method))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<Option<String>, StoreError> {
        let request = self
            .request(Method::POST, self.endpoint("order/create-order")?)
            .json(order);
        let envelope: Envelope<Nothing> = self.execute(request).await?;
        Ok(envelope.message)
    }
}

impl RemoteStore for ApiClient {
    async fn fetch_cart(&self) -> Result<CartSnapshot, StoreError> {
        self.get_cart().await
    }

    async fn fetch_wishlist(&self) -> Result<WishlistListing, StoreError> {
        self.get_wishlist().await
    }

    async fn mutate(&self, intent: MutationIntent) -> Result<Ack, StoreError> {
        match &intent {
            MutationIntent::Cart(intent) => self.mutate_cart(intent).await,
            MutationIntent::Wishlist(intent) => self.mutate_wishlist(intent).await,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Map a non-success HTTP status onto the error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> StoreError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StoreError::Auth(message.unwrap_or_else(|| "Please log in to continue".to_string()))
        }
        StatusCode::TOO_MANY_REQUESTS => StoreError::Network(format!("HTTP {status}")),
        status if status.is_server_error() => {
            tracing::error!(
                status = %status,
                body = %excerpt(body),
                "Shop API returned server error"
            );
            StoreError::Network(format!("HTTP {status}"))
        }
        status => StoreError::Validation(
            message.unwrap_or_else(|| format!("Request failed with status {status}")),
        ),
    }
}

/// Build the multipart body of a new listing.
fn listing_form(listing: &ProductListing) -> Result<Form, StoreError> {
    let sizes: Vec<_> = listing
        .sizes()
        .iter()
        .map(|size| SizeStock {
            size,
            stock: INITIAL_SIZE_STOCK,
        })
        .collect();
    let colors: Vec<_> = listing
        .colors()
        .iter()
        .map(|color| ColorCode {
            color_name: color.name,
            color_code: color.code(),
        })
        .collect();
    let encode = |e: serde_json::Error| StoreError::Validation(format!("invalid listing: {e}"));

    let mut form = Form::new()
        .text("name", listing.name.clone())
        .text("description", listing.description.clone())
        .text("price", listing.price.to_string())
        .text("category", listing.category.clone())
        .text("brand", listing.brand.clone())
        .text("type", listing.kind.clone())
        .text("material", listing.material.clone())
        .text("careInstructions", listing.care_instructions.clone())
        .text("gender", listing.gender.clone())
        .text("sizes", serde_json::to_string(&sizes).map_err(encode)?)
        .text("colors", serde_json::to_string(&colors).map_err(encode)?);

    for color in listing.colors() {
        for image in &color.images {
            let mut part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
            if let Some(content_type) = &image.content_type {
                part = part.mime_str(content_type)?;
            }
            form = form.part(format!("images_{}", color.name), part);
        }
    }

    Ok(form)
}

/// Extract a cookie value from `Set-Cookie` headers.
fn cookie_from_headers(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn excerpt(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn test_classify_auth() {
        let err = classify_failure(StatusCode::UNAUTHORIZED, r#"{"message": "Token expired"}"#);
        assert_eq!(err, StoreError::Auth("Token expired".to_string()));

        let err = classify_failure(StatusCode::FORBIDDEN, "");
        assert!(err.is_auth());
    }

    #[test]
    fn test_classify_retryable() {
        assert!(classify_failure(StatusCode::BAD_GATEWAY, "<html>").is_retryable());
        assert!(classify_failure(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
    }

    #[test]
    fn test_classify_validation_uses_server_message() {
        let err = classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"success": false, "message": "Only 2 left in stock"}"#,
        );
        assert_eq!(err, StoreError::Validation("Only 2 left in stock".to_string()));

        let err = classify_failure(StatusCode::NOT_FOUND, "not json");
        assert!(matches!(err, StoreError::Validation(message) if message.contains("404")));
    }

    #[test]
    fn test_cookie_from_headers() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("theme=dark; Path=/"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("token=abc.def; HttpOnly; Path=/"),
        );

        assert_eq!(cookie_from_headers(&headers, "token").as_deref(), Some("abc.def"));
        assert_eq!(cookie_from_headers(&headers, "session"), None);
    }
}
