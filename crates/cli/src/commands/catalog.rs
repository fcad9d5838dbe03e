//! Catalog commands.
//!
//! ```bash
//! popacart products --search linen --category men
//! popacart products --min-price 500 --max-price 2000
//! popacart product 64f1c0
//! ```

use clap::Args;
use popacart_core::{ProductId, ProductQuery};
use popacart_storefront::AppError;
use popacart_storefront::views::catalog::{ProductDetailState, ProductListView};
use popacart_storefront::views::{ProductDetailPage, ProductListPage};

use rust_decimal::Decimal;

use super::Context;

/// Catalog listing filters.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Search term
    #[arg(short, long)]
    search: Option<String>,

    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Category filter
    #[arg(short, long)]
    category: Option<String>,

    /// Product type filter
    #[arg(short = 't', long = "type")]
    kind: Option<String>,

    /// Lowest price to list
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Highest price to list
    #[arg(long)]
    max_price: Option<Decimal>,
}

impl ListArgs {
    fn into_query(self) -> ProductQuery {
        let (min_price, max_price) = match (self.min_price, self.max_price) {
            (Some(low), Some(high)) if low > high => (Some(high), Some(low)),
            range => range,
        };
        let mut query = ProductQuery {
            category: self.category,
            kind: self.kind,
            min_price,
            max_price,
            ..ProductQuery::default()
        };
        if let Some(term) = self.search {
            query = query.with_search(&term);
        }
        query.page = self.page.max(1);
        query
    }
}

/// Print one page of the catalog.
///
/// # Errors
///
/// Returns `AppError` if the listing could not be loaded.
pub async fn list(ctx: &Context, args: ListArgs) -> Result<(), AppError> {
    let query = args.into_query();

    let mut listing = ProductListPage::new(ctx.state().client().clone(), query);
    let navigation = listing.mount().await;

    match listing.render() {
        ProductListView::Error { message } => return Err(AppError::Validation(message)),
        ProductListView::Items {
            cards,
            page_label,
            has_next,
            ..
        } => {
            for (index, card) in cards.iter().enumerate() {
                println!("{:>3}. {card}", index + 1);
            }
            println!("{page_label}");
            if has_next {
                println!("Next page: --page {}", listing.query().page + 1);
            }
        }
        view => print!("{view}"),
    }
    ctx.follow(navigation).await
}

/// Print one product.
///
/// # Errors
///
/// Returns `AppError` if the product is missing or could not be loaded.
pub async fn show(ctx: &Context, id: String) -> Result<(), AppError> {
    let mut page = ProductDetailPage::new(ctx.state().client().clone(), ProductId::new(id));
    let navigation = page.mount().await;

    match page.render() {
        ProductDetailState::NotFound => {
            return Err(AppError::NotFound("Product not found.".to_string()));
        }
        ProductDetailState::Error { message } => return Err(AppError::Validation(message)),
        state => print!("{state}"),
    }
    ctx.follow(navigation).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_is_ordered() {
        let query = ListArgs {
            page: 2,
            min_price: Some(Decimal::new(2000, 0)),
            max_price: Some(Decimal::new(500, 0)),
            ..ListArgs::default()
        }
        .into_query();
        assert_eq!(query.min_price, Some(Decimal::new(500, 0)));
        assert_eq!(query.max_price, Some(Decimal::new(2000, 0)));
        assert_eq!(query.page, 2);
    }
}
