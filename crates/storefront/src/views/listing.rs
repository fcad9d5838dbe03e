//! New product form.

use popacart_core::ProductListing;
use tracing::instrument;

use super::{Navigation, Toast, ToastKind};
use crate::api::ApiClient;
use crate::error::{AppError, add_breadcrumb};
use crate::store::StoreError;

const CREATED: &str = "Product created";
const FAILED: &str = "Failed to create product";

/// Fields, sizes, colors and images of one new product.
pub struct ProductListingForm {
    client: ApiClient,
    pub listing: ProductListing,
    response: Option<Toast>,
}

impl ProductListingForm {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            listing: ProductListing::default(),
            response: None,
        }
    }

    /// Outcome of the last submit.
    #[must_use]
    pub const fn response(&self) -> Option<&Toast> {
        self.response.as_ref()
    }

    /// Upload the listing and go to the product list. The listing is
    /// checked before any request.
    #[instrument(skip(self), fields(name = %self.listing.name))]
    pub async fn submit(&mut self) -> Navigation {
        self.response = None;

        if let Err(err) = self.listing.validate() {
            self.response = Some(Toast::error(AppError::from(err).user_message()));
            return Navigation::Stay;
        }

        add_breadcrumb(
            "listing",
            "Created product",
            Some(&[("name", self.listing.name.as_str())]),
        );

        match self.client.create_product(&self.listing).await {
            Ok(message) => {
                self.response = Some(Toast::success(message.unwrap_or_else(|| CREATED.to_string())));
                Navigation::Products
            }
            Err(err) => {
                let navigation = if err.is_auth() {
                    Navigation::Login
                } else {
                    Navigation::Stay
                };
                let message = match &err {
                    StoreError::Validation(message) | StoreError::Auth(message) => message.clone(),
                    StoreError::Network(_) => FAILED.to_string(),
                };
                AppError::from(err).report();
                self.response = Some(Toast::error(message));
                navigation
            }
        }
    }

    /// Whether the last submit failed.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.response
            .as_ref()
            .is_some_and(|toast| toast.kind == ToastKind::Error)
    }
}
