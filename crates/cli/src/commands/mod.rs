//! Command implementations.
//!
//! Every command drives one of the storefront view models against the real
//! API and prints what the view renders.

use popacart_storefront::session::SessionFile;
use popacart_storefront::views::{Navigation, Notifications};
use popacart_storefront::{AppError, AppState, Session, StorefrontConfig};

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod listing;
pub mod wishlist;

pub use cart::CartAction;
pub use catalog::ListArgs;
pub use checkout::CheckoutArgs;
pub use listing::ListingArgs;
pub use wishlist::WishlistAction;

/// Shared handles for one CLI invocation.
pub struct Context {
    state: AppState,
    session_file: SessionFile,
}

impl Context {
    /// Restore the saved session and build the application state.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if the session file is unreadable or the HTTP
    /// client cannot be built.
    pub async fn open(config: StorefrontConfig) -> Result<Self, AppError> {
        let session_file = SessionFile::new(config.session_file.clone());
        let session = Session::new();
        session_file.restore(&session).await?;
        if session.is_authenticated() {
            tracing::debug!(path = %session_file.path().display(), "Restored session");
        }

        let state = AppState::with_session(config, session)?;
        Ok(Self {
            state,
            session_file,
        })
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Write the current session to disk.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if the session file cannot be written.
    pub async fn persist_session(&self) -> Result<(), AppError> {
        self.session_file.save(self.state.session()).await?;
        Ok(())
    }

    /// Act on where a view wants to go next.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if the expired session cannot be removed from disk.
    pub async fn follow(&self, navigation: Navigation) -> Result<(), AppError> {
        match navigation {
            Navigation::Login => {
                self.state.session().clear();
                self.persist_session().await?;
                println!("Please log in: popacart login --email <email>");
            }
            Navigation::Checkout => println!("Ready to check out: popacart checkout --help"),
            Navigation::Cart => println!("View your bag: popacart cart show"),
            Navigation::ProductDetail(id) => println!("View the product: popacart product {id}"),
            Navigation::Stay | Navigation::Products | Navigation::Home => {}
        }
        Ok(())
    }
}

/// Print and drop the toasts a view raised.
pub fn print_toasts(notifications: &Notifications) {
    for toast in notifications.drain() {
        println!("{toast}");
    }
}
