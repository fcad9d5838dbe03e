//! Popacart CLI - browse the catalog, manage the bag and favorites, check out.
//!
//! # Usage
//!
//! ```bash
//! # Browse and search the catalog
//! popacart products --search shirt --page 2
//! popacart product 64f1c0
//!
//! # Log in (the password is only read from the environment)
//! POPACART_PASSWORD=secret popacart login -e asha@example.com
//!
//! # Bag
//! popacart cart add 64f1c0 --quantity 2 --color Sand --size M
//! popacart cart update 1 3
//! popacart cart show
//!
//! # Favorites
//! popacart wishlist toggle 64f1c0
//!
//! # Place a cash-on-delivery order
//! popacart checkout --name "Asha Rao" --phone 9876543210 --address "12 MG Road"
//! ```
//!
//! # Commands
//!
//! - `products` / `product` - Catalog listing and detail
//! - `cart` - Show and change the shopping bag
//! - `wishlist` - Show and change favorites
//! - `login` / `logout` - Session management
//! - `checkout` - Place an order
//! - `create-product` - Upload a new product

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use popacart_storefront::{AppError, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CartAction, CheckoutArgs, Context, ListArgs, ListingArgs, WishlistAction};

#[derive(Parser)]
#[command(name = "popacart")]
#[command(author, version, about = "Popacart storefront on the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products(ListArgs),
    /// Show one product
    Product {
        /// Product id
        id: String,
    },
    /// Show or change the shopping bag
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show or change favorites
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Log in with email and the password in `POPACART_PASSWORD`
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// End the session
    Logout,
    /// Place an order for the current bag
    Checkout(CheckoutArgs),
    /// Upload a new product with images per color
    CreateProduct(ListingArgs),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "popacart_cli=info,popacart_storefront=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        println!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let ctx = Context::open(config).await?;

    match cli.command {
        Commands::Products(args) => commands::catalog::list(&ctx, args).await?,
        Commands::Product { id } => commands::catalog::show(&ctx, id).await?,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await?,
        Commands::Wishlist { action } => commands::wishlist::run(&ctx, action).await?,
        Commands::Login { email } => {
            let password = commands::account::password_from_env()?;
            commands::account::login(&ctx, email, password).await?;
        }
        Commands::Logout => commands::account::logout(&ctx).await?,
        Commands::Checkout(args) => commands::checkout::run(&ctx, args).await?,
        Commands::CreateProduct(args) => commands::listing::run(&ctx, args).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cart_update_takes_line_and_quantity() {
        let cli = Cli::try_parse_from(["popacart", "cart", "update", "2", "5"]);
        assert!(matches!(
            cli.map(|cli| cli.command),
            Ok(Commands::Cart {
                action: CartAction::Update {
                    line: 2,
                    quantity: 5
                }
            })
        ));
    }

    #[test]
    fn test_products_accepts_price_range() {
        let cli = Cli::try_parse_from([
            "popacart",
            "products",
            "--min-price",
            "499.50",
            "--max-price",
            "2000",
        ]);
        assert!(matches!(cli.map(|cli| cli.command), Ok(Commands::Products(_))));

        let cli = Cli::try_parse_from(["popacart", "products", "--min-price", "cheap"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_create_product_takes_images_per_color() {
        let args = [
            "popacart",
            "create-product",
            "--name",
            "Linen Shirt",
            "--description",
            "Breathable",
            "--price",
            "1499",
            "--brand",
            "Popa",
            "--category",
            "Men",
            "--type",
            "Shirt",
            "--material",
            "Linen",
            "--care",
            "Machine wash cold",
            "--gender",
            "Men",
            "--size",
            "M",
            "--image",
            "Red=red.jpg",
        ];
        let cli = Cli::try_parse_from(args);
        assert!(matches!(cli.map(|cli| cli.command), Ok(Commands::CreateProduct(_))));

        let mut bad = args.to_vec();
        bad.pop();
        bad.push("red.jpg");
        assert!(Cli::try_parse_from(bad).is_err());
    }

    #[test]
    fn test_password_is_not_a_flag() {
        let cli = Cli::try_parse_from([
            "popacart",
            "login",
            "-e",
            "asha@example.com",
            "--password",
            "secret",
        ]);
        assert!(cli.is_err());

        let cli = Cli::try_parse_from(["popacart", "login", "-e", "asha@example.com"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_unknown_payment_method_is_refused() {
        let cli = Cli::try_parse_from([
            "popacart",
            "checkout",
            "--name",
            "Asha Rao",
            "--phone",
            "9876543210",
            "--address",
            "12 MG Road",
            "--payment",
            "cheque",
        ]);
        assert!(cli.is_err());
    }
}
