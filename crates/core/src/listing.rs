//! New product listings submitted by sellers.
//!
//! A [`ProductListing`] is filled in field by field, then checked with
//! [`ProductListing::validate`] before upload. Sizes and colors are picked
//! from fixed menus; every picked color needs at least one image.

use rust_decimal::Decimal;

/// Sizes a listing can offer.
pub const LISTING_SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

/// Colors a listing can offer.
pub const LISTING_COLORS: [&str; 6] = ["Red", "Blue", "Green", "Black", "White", "Yellow"];

/// Stock every offered size starts with.
pub const INITIAL_SIZE_STOCK: u32 = 10;

/// Errors raised before a listing is uploaded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    /// One or more required fields are blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    /// The price is negative.
    #[error("price must not be negative")]
    NegativePrice,
    /// Not one of [`LISTING_SIZES`].
    #[error("unknown size: {0}")]
    UnknownSize(String),
    /// Not one of [`LISTING_COLORS`], or not picked yet.
    #[error("unknown color: {0}")]
    UnknownColor(String),
    /// Picked colors without images.
    #[error("Please upload images for the following colors: {}", .0.join(", "))]
    MissingImages(Vec<&'static str>),
}

/// One uploaded image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A picked color and its images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingColor {
    pub name: &'static str,
    pub images: Vec<ListingImage>,
}

impl ListingColor {
    /// Color code sent with the listing.
    #[must_use]
    pub fn code(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

/// A product listing being filled in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductListing {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub brand: String,
    pub kind: String,
    pub material: String,
    pub care_instructions: String,
    pub gender: String,
    sizes: Vec<&'static str>,
    colors: Vec<ListingColor>,
}

impl ProductListing {
    /// Picked sizes, in the order they were picked.
    #[must_use]
    pub fn sizes(&self) -> &[&'static str] {
        &self.sizes
    }

    /// Picked colors, in the order they were picked.
    #[must_use]
    pub fn colors(&self) -> &[ListingColor] {
        &self.colors
    }

    /// Pick or unpick a size. Returns whether it is now picked.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::UnknownSize`] for sizes not on the menu.
    pub fn toggle_size(&mut self, size: &str) -> Result<bool, ListingError> {
        let size = menu_entry(&LISTING_SIZES, size)
            .ok_or_else(|| ListingError::UnknownSize(size.to_owned()))?;
        if let Some(index) = self.sizes.iter().position(|picked| *picked == size) {
            self.sizes.remove(index);
            return Ok(false);
        }
        self.sizes.push(size);
        Ok(true)
    }

    /// Pick or unpick a color. Unpicking drops its images. Returns whether
    /// it is now picked.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::UnknownColor`] for colors not on the menu.
    pub fn toggle_color(&mut self, color: &str) -> Result<bool, ListingError> {
        let name = menu_entry(&LISTING_COLORS, color)
            .ok_or_else(|| ListingError::UnknownColor(color.to_owned()))?;
        if let Some(index) = self.colors.iter().position(|picked| picked.name == name) {
            self.colors.remove(index);
            return Ok(false);
        }
        self.colors.push(ListingColor {
            name,
            images: Vec::new(),
        });
        Ok(true)
    }

    /// Replace the images of a picked color.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::UnknownColor`] when the color is not picked.
    pub fn set_images(
        &mut self,
        color: &str,
        images: Vec<ListingImage>,
    ) -> Result<(), ListingError> {
        let picked = self
            .colors
            .iter_mut()
            .find(|picked| picked.name.eq_ignore_ascii_case(color.trim()))
            .ok_or_else(|| ListingError::UnknownColor(color.to_owned()))?;
        picked.images = images;
        Ok(())
    }

    /// Check the listing is complete.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::MissingFields`] when text fields are blank,
    /// [`ListingError::NegativePrice`] for a negative price and
    /// [`ListingError::MissingImages`] when a picked color has no images.
    pub fn validate(&self) -> Result<(), ListingError> {
        let missing: Vec<_> = [
            ("name", &self.name),
            ("description", &self.description),
            ("brand", &self.brand),
            ("category", &self.category),
            ("type", &self.kind),
            ("material", &self.material),
            ("careInstructions", &self.care_instructions),
            ("gender", &self.gender),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(ListingError::MissingFields(missing));
        }

        if self.price.is_sign_negative() {
            return Err(ListingError::NegativePrice);
        }

        let without_images: Vec<_> = self
            .colors
            .iter()
            .filter(|color| color.images.is_empty())
            .map(|color| color.name)
            .collect();
        if !without_images.is_empty() {
            return Err(ListingError::MissingImages(without_images));
        }

        Ok(())
    }
}

fn menu_entry(menu: &[&'static str], value: &str) -> Option<&'static str> {
    let value = value.trim();
    menu.iter()
        .copied()
        .find(|entry| entry.eq_ignore_ascii_case(value))
}
