//! Checkout command.

use clap::Args;
use popacart_core::PaymentMethod;
use popacart_storefront::AppError;
use popacart_storefront::views::{CartPage, CheckoutForm, Navigation};

use super::{Context, print_toasts};

#[derive(Args)]
pub struct CheckoutArgs {
    /// Recipient name
    #[arg(long)]
    name: String,

    /// Contact phone number
    #[arg(long)]
    phone: String,

    /// First address line
    #[arg(long)]
    address: String,

    #[arg(long, default_value = "")]
    street: String,

    #[arg(long, default_value = "")]
    city: String,

    #[arg(long, default_value = "")]
    state: String,

    #[arg(long, default_value = "")]
    zip: String,

    #[arg(long, default_value = "")]
    country: String,

    /// `cod` or `online`
    #[arg(short, long, default_value = "cod")]
    payment: PaymentMethod,

    /// Coupon code
    #[arg(long)]
    coupon: Option<String>,
}

/// Place an order for the current bag.
///
/// # Errors
///
/// Returns `AppError` if the bag is empty or the order was refused.
pub async fn run(ctx: &Context, args: CheckoutArgs) -> Result<(), AppError> {
    let bag = CartPage::new(ctx.state().cart());
    let navigation = bag.mount().await;
    if navigation != Navigation::Stay {
        return ctx.follow(navigation).await;
    }
    if bag.checkout() != Navigation::Checkout {
        print_toasts(bag.notifications());
        return Ok(());
    }

    let mut form = CheckoutForm::new(ctx.state().client().clone());
    form.address.full_name = args.name;
    form.address.phone_number = args.phone;
    form.address.address_line1 = args.address;
    form.address.street = args.street;
    form.address.city = args.city;
    form.address.state = args.state;
    form.address.postal_code.clone_from(&args.zip);
    form.address.zip = args.zip;
    form.address.country = args.country;
    form.payment = args.payment;
    form.coupon = args.coupon.unwrap_or_default();

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
