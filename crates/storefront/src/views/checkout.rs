//! Checkout form.

use popacart_core::{OrderRequest, PaymentMethod, ShippingAddress};
use tracing::instrument;

use super::{Navigation, Toast, ToastKind};
use crate::api::ApiClient;
use crate::error::{AppError, add_breadcrumb};
use crate::store::StoreError;

const PLACED: &str = "Order placed successfully";

/// Shipping address, payment method and coupon for one order.
pub struct CheckoutForm {
    client: ApiClient,
    pub address: ShippingAddress,
    pub payment: PaymentMethod,
    pub coupon: String,
    response: Option<Toast>,
    placed: bool,
}

impl CheckoutForm {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            address: ShippingAddress::default(),
            payment: PaymentMethod::default(),
            coupon: String::new(),
            response: None,
            placed: false,
        }
    }

    /// Outcome of the last submit.
    #[must_use]
    pub const fn response(&self) -> Option<&Toast> {
        self.response.as_ref()
    }

    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.placed
    }

    /// Place the order. Required fields are checked before any request.
    #[instrument(skip(self), fields(payment = %self.payment))]
    pub async fn submit(&mut self) -> Navigation {
        self.response = None;

        let order = match OrderRequest::new(self.address.clone(), self.payment, Some(&self.coupon)) {
            Ok(order) => order,
            Err(err) => {
                self.response = Some(Toast::error(AppError::from(err).user_message()));
                return Navigation::Stay;
            }
        };

        add_breadcrumb(
            "checkout",
            "Placed order",
            Some(&[("payment", self.payment.label())]),
        );

        match self.client.create_order(&order).await {
            Ok(message) => {
                self.placed = true;
                self.response = Some(Toast::success(message.unwrap_or_else(|| PLACED.to_string())));
                Navigation::Stay
            }
            Err(err) => {
                let navigation = if err.is_auth() {
                    Navigation::Login
                } else {
                    Navigation::Stay
                };
                let message = match &err {
                    StoreError::Validation(message) | StoreError::Auth(message) => message.clone(),
                    StoreError::Network(_) => "Something went wrong.".to_string(),
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::session::Session;

    #[tokio::test]
    async fn test_missing_fields_stop_before_request() {
        let config = StorefrontConfig::from_lookup(|_| None)
            .unwrap()
            .with_api_url("http://127.0.0.1:9/api/v1")
            .unwrap();
        let mut form = CheckoutForm::new(ApiClient::new(&config, Session::new()).unwrap());
        form.address.full_name = "Asha Rao".to_string();

        assert_eq!(form.submit().await, Navigation::Stay);
        assert!(form.has_error());
        assert_eq!(
            form.response().unwrap().message,
            "Please fill in all required fields."
        );
        assert!(!form.is_placed());
    }
}
