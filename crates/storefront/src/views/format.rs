//! Display formatting shared by the views.

use popacart_core::{CurrencyCode, LineKey, Price};
use rust_decimal::Decimal;

/// Format an amount in the store currency (e.g. "₹19.99").
#[must_use]
pub fn money(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::default()).display()
}

/// "Red / M" style label for the variant part of a line key.
#[must_use]
pub fn variant_label(key: &LineKey) -> Option<String> {
    let parts: Vec<&str> = key
        .selected_color
        .as_ref()
        .map(|color| color.name.as_str())
        .into_iter()
        .chain(key.selected_size.as_deref())
        .filter(|part| !part.is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join(" / "))
}

#[must_use]
pub fn page_label(page: u32, total_pages: u32) -> String {
    format!("Page {page} of {total_pages}")
}
