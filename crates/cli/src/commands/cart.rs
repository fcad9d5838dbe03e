//! Shopping bag commands.
//!
//! Lines are addressed by their 1-based position in `popacart cart show`.

use clap::Subcommand;
use popacart_core::{LineKey, ProductId};
use popacart_storefront::views::{
    AddToCartWidget, CartPage, CartView, Header, Navigation, ProductDetailPage,
};
use popacart_storefront::{AppError, ApiClient};

use super::{Context, print_toasts};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the bag
    Show,
    /// Add a product
    Add {
        /// Product id
        product_id: String,

        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Color name, as listed on the product
        #[arg(short, long)]
        color: Option<String>,

        /// Size, as listed on the product
        #[arg(short, long)]
        size: Option<String>,
    },
    /// Set the quantity of a line
    Update {
        /// Line number
        line: usize,
        /// New quantity (at least 1)
        quantity: u32,
    },
    /// Add one to a line
    Increase {
        /// Line number
        line: usize,
    },
    /// Take one from a line
    Decrease {
        /// Line number
        line: usize,
    },
    /// Remove a line
    Remove {
        /// Line number
        line: usize,
    },
    /// Empty the bag
    Clear,
}

/// Run a bag command, then print the bag.
///
/// # Errors
///
/// Returns `AppError` if the bag cannot be loaded or the input is invalid.
pub async fn run(ctx: &Context, action: CartAction) -> Result<(), AppError> {
    let page = CartPage::new(ctx.state().cart());
    let navigation = page.mount().await;
    if navigation != Navigation::Stay {
        return ctx.follow(navigation).await;
    }
    if let CartView::Error { message } = page.render() {
        return Err(AppError::Validation(message));
    }

    let navigation = match action {
        CartAction::Show => Navigation::Stay,
        CartAction::Add {
            product_id,
            quantity,
            color,
            size,
        } => {
            add(
                ctx.state().client(),
                &page,
                ProductId::new(product_id),
                quantity,
                color.as_deref(),
                size.as_deref(),
            )
            .await?
        }
        CartAction::Update { line, quantity } => {
            let key = line_key(&page, line)?;
            page.set_quantity(&key, quantity).await
        }
        CartAction::Increase { line } => {
            let key = line_key(&page, line)?;
            page.increase(&key).await
        }
        CartAction::Decrease { line } => {
            let key = line_key(&page, line)?;
            page.decrease(&key).await
        }
        CartAction::Remove { line } => {
            let key = line_key(&page, line)?;
            page.remove(&key).await
        }
        CartAction::Clear => page.clear().await,
    };

    print_toasts(page.notifications());
    if navigation == Navigation::Stay {
        print!("{}", page.render());
        let header = Header::new(ctx.state().session().clone())
            .with_cart(page.coordinator().subscribe());
        println!("{}", header.render());
    }
    ctx.follow(navigation).await
}

async fn add(
    client: &ApiClient,
    page: &CartPage<ApiClient>,
    product_id: ProductId,
    quantity: u32,
    color: Option<&str>,
    size: Option<&str>,
) -> Result<Navigation, AppError> {
    if quantity == 0 {
        return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
    }

    let mut detail = ProductDetailPage::new(client.clone(), product_id);
    detail.mount().await;
    let Some(product) = detail.product().cloned() else {
        return Err(AppError::NotFound("Product not found.".to_string()));
    };

    let mut widget = AddToCartWidget::new(page.coordinator().clone(), product);
    for _ in 1..quantity {
        widget.increase();
    }
    if let Some(color) = color
        && !widget.select_color(color)
    {
        return Err(AppError::Validation(format!("Color {color} is not available")));
    }
    if let Some(size) = size
        && !widget.select_size(size)
    {
        return Err(AppError::Validation(format!("Size {size} is not available")));
    }

    let navigation = widget.submit().await;
    print_toasts(widget.notifications());
    Ok(navigation)
}

fn line_key(page: &CartPage<ApiClient>, line: usize) -> Result<LineKey, AppError> {
    let CartView::Items { items, .. } = page.render() else {
        return Err(AppError::Validation("Your bag is empty".to_string()));
    };
    line.checked_sub(1)
        .and_then(|index| items.into_iter().nth(index))
        .map(|item| item.key)
        .ok_or_else(|| AppError::NotFound(format!("No line {line} in your bag")))
}
