//! Favorites commands.

use clap::Subcommand;
use popacart_core::ProductId;
use popacart_storefront::AppError;
use popacart_storefront::views::{Navigation, WishlistPage, WishlistView};

use super::{Context, print_toasts};

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Show favorites
    Show,
    /// Add a product to favorites
    Add {
        /// Product id
        product_id: String,
    },
    /// Remove a product from favorites
    Remove {
        /// Product id
        product_id: String,
    },
    /// Add the product if absent, remove it otherwise
    Toggle {
        /// Product id
        product_id: String,
    },
}

/// Run a favorites command, then print the favorites.
///
/// # Errors
///
/// Returns `AppError` if the favorites cannot be loaded.
pub async fn run(ctx: &Context, action: WishlistAction) -> Result<(), AppError> {
    let page = WishlistPage::new(ctx.state().wishlist());
    let navigation = page.mount().await;
    if navigation != Navigation::Stay {
        return ctx.follow(navigation).await;
    }
    if let WishlistView::Error { message } = page.render() {
        return Err(AppError::Validation(message));
    }

    let navigation = match action {
        WishlistAction::Show => Navigation::Stay,
        WishlistAction::Add { product_id } => page.add(ProductId::new(product_id)).await,
        WishlistAction::Remove { product_id } => page.remove(ProductId::new(product_id)).await,
        WishlistAction::Toggle { product_id } => page.toggle(ProductId::new(product_id)).await,
    };

    print_toasts(page.notifications());
    if navigation == Navigation::Stay {
        print!("{}", page.render());
    }
    ctx.follow(navigation).await
}
