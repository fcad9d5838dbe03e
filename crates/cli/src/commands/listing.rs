//! New product command.
//!
//! ```bash
//! popacart create-product --name "Linen Shirt" --description "Breathable" \
//!     --price 1499 --brand Popa --category Men --type Shirt --material Linen \
//!     --care "Machine wash cold" --gender Men --size M --size L \
//!     --image Red=./red-front.jpg --image Red=./red-back.jpg
//! ```

use std::path::{Path, PathBuf};

use clap::Args;
use popacart_core::{ListingImage, ProductListing};
use popacart_storefront::AppError;
use popacart_storefront::views::{Navigation, ProductListingForm};
use rust_decimal::Decimal;

use super::Context;

#[derive(Args, Debug)]
pub struct ListingArgs {
    /// Product name
    #[arg(long)]
    name: String,

    /// Product description
    #[arg(long)]
    description: String,

    /// List price
    #[arg(long)]
    price: Decimal,

    /// Brand
    #[arg(long)]
    brand: String,

    /// Category (Men, Women, Kids, Unisex)
    #[arg(long)]
    category: String,

    /// Product type (Shirt, Jeans, ...)
    #[arg(short = 't', long = "type")]
    kind: String,

    /// Material
    #[arg(long)]
    material: String,

    /// Care instructions
    #[arg(long)]
    care: String,

    /// Gender
    #[arg(long)]
    gender: String,

    /// Offered size, repeatable (XS, S, M, L, XL, XXL)
    #[arg(short, long = "size")]
    sizes: Vec<String>,

    /// Offered color, repeatable; colors named by --image are added too
    #[arg(short, long = "color")]
    colors: Vec<String>,

    /// Image for a color as COLOR=PATH, repeatable
    #[arg(short, long = "image", value_parser = parse_image)]
    images: Vec<(String, PathBuf)>,
}

/// Upload a new product.
///
/// # Errors
///
/// Returns `AppError` if an image cannot be read or the listing is refused.
pub async fn run(ctx: &Context, args: ListingArgs) -> Result<(), AppError> {
    let mut form = ProductListingForm::new(ctx.state().client().clone());
    form.listing = ProductListing::default();
    form.listing.name = args.name;
    form.listing.description = args.description;
    form.listing.price = args.price;
    form.listing.category = args.category;
    form.listing.brand = args.brand;
    form.listing.kind = args.kind;
    form.listing.material = args.material;
    form.listing.care_instructions = args.care;
    form.listing.gender = args.gender;

    for size in &args.sizes {
        if !form.listing.sizes().iter().any(|picked| picked.eq_ignore_ascii_case(size)) {
            form.listing.toggle_size(size)?;
        }
    }

    let named = args.images.iter().map(|(color, _)| color);
    for color in args.colors.iter().chain(named) {
        if !form.listing.colors().iter().any(|picked| picked.name.eq_ignore_ascii_case(color)) {
            form.listing.toggle_color(color)?;
        }
    }

    let mut by_color: Vec<(&str, Vec<ListingImage>)> = Vec::new();
    for (color, path) in &args.images {
        let image = read_image(path).await?;
        match by_color.iter_mut().find(|(known, _)| known.eq_ignore_ascii_case(color)) {
            Some((_, images)) => images.push(image),
            None => by_color.push((color.as_str(), vec![image])),
        }
    }
    for (color, images) in by_color {
        form.listing.set_images(color, images)?;
    }

    let navigation = form.submit().await;
    match form.response() {
        Some(response) if form.has_error() && navigation == Navigation::Stay => {
            return Err(AppError::Validation(response.message.clone()));
        }
        Some(response) => println!("{response}"),
        None => {}
    }
    ctx.follow(navigation).await
}

fn parse_image(value: &str) -> Result<(String, PathBuf), String> {
    let (color, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected COLOR=PATH, got {value}"))?;
    if color.trim().is_empty() || path.trim().is_empty() {
        return Err(format!("expected COLOR=PATH, got {value}"));
    }
    Ok((color.trim().to_string(), PathBuf::from(path.trim())))
}

async fn read_image(path: &Path) -> Result<ListingImage, AppError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AppError::Validation(format!("Could not read image {}: {e}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());

    Ok(ListingImage {
        content_type: content_type(path).map(str::to_owned),
        file_name,
        bytes,
    })
}

fn content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image() {
        assert_eq!(
            parse_image("Red=./shots/red.jpg").unwrap(),
            ("Red".to_string(), PathBuf::from("./shots/red.jpg"))
        );
        assert!(parse_image("red.jpg").is_err());
        assert!(parse_image("=red.jpg").is_err());
    }

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type(Path::new("a/RED.JPG")), Some("image/jpeg"));
        assert_eq!(content_type(Path::new("b.webp")), Some("image/webp"));
        assert_eq!(content_type(Path::new("notes.txt")), None);
        assert_eq!(content_type(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn test_read_image_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red-front.png");
        tokio::fs::write(&path, b"png").await.unwrap();

        let image = read_image(&path).await.unwrap();
        assert_eq!(image.file_name, "red-front.png");
        assert_eq!(image.content_type.as_deref(), Some("image/png"));
        assert_eq!(image.bytes, b"png");

        let missing = read_image(&dir.path().join("gone.jpg")).await;
        assert!(matches!(missing, Err(AppError::Validation(_))));
    }
}
