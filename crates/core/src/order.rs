//! Checkout request types.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors raised before an order is submitted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    /// One or more required shipping fields are blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    /// Unknown payment method.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}

/// Where the order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone_number: String,
    pub address_line1: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Names of required fields that are blank, in form order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("phoneNumber", &self.phone_number),
            ("addressLine1", &self.address_line1),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    #[serde(rename = "COD")]
    CashOnDelivery,
    #[serde(rename = "ONLINE")]
    Online,
}

impl PaymentMethod {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on Delivery",
            Self::Online => "Online Payment",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = OrderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" | "cash" | "cash-on-delivery" => Ok(Self::CashOnDelivery),
            "online" => Ok(Self::Online),
            other => Err(OrderValidationError::UnknownPaymentMethod(other.to_owned())),
        }
    }
}

/// Payment block of an order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
}

/// Body of the create-order call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub shipping_address: ShippingAddress,
    pub payment: Payment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

impl OrderRequest {
    /// Validate the address and build the request. A blank coupon is
    /// dropped; others are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`OrderValidationError::MissingFields`] when required
    /// shipping fields are blank.
    pub fn new(
        shipping_address: ShippingAddress,
        method: PaymentMethod,
        coupon: Option<&str>,
    ) -> Result<Self, OrderValidationError> {
        let missing = shipping_address.missing_required();
        if !missing.is_empty() {
            return Err(OrderValidationError::MissingFields(missing));
        }

        Ok(Self {
            shipping_address,
            payment: Payment { method },
            coupon: coupon
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_owned),
        })
    }
}
