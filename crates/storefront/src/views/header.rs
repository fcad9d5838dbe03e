//! Site header: login state and the bag badge.

use std::fmt;

use popacart_core::CartSnapshot;
use tokio::sync::watch;

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub authenticated: bool,
    pub greeting: Option<String>,
    /// Number of line items in the bag.
    pub cart_count: usize,
}

impl fmt::Display for HeaderView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.greeting {
            Some(name) => write!(f, "Hi, {name}")?,
            None if self.authenticated => f.write_str("Account")?,
            None => f.write_str("Login")?,
        }
        write!(f, " | Bag ({})", self.cart_count)
    }
}

pub struct Header {
    session: Session,
    cart: Option<watch::Receiver<CartSnapshot>>,
}

impl Header {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            cart: None,
        }
    }

    /// Follow a cart coordinator's displayed snapshot for the badge.
    #[must_use]
    pub fn with_cart(mut self, cart: watch::Receiver<CartSnapshot>) -> Self {
        self.cart = Some(cart);
        self
    }

    #[must_use]
    pub fn render(&self) -> HeaderView {
        let authenticated = self.session.is_authenticated();
        HeaderView {
            authenticated,
            greeting: authenticated
                .then(|| self.session.user())
                .flatten()
                .map(|user| user.display_name().to_owned()),
            cart_count: self
                .cart
                .as_ref()
                .map_or(0, |cart| cart.borrow().line_count()),
        }
    }
}
