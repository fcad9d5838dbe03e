//! Login form and logout.

use popacart_core::Email;
use secrecy::{ExposeSecret, SecretString};
use tracing::{instrument, warn};

use super::Navigation;
use crate::api::ApiClient;
use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::store::StoreError;

const GENERIC_FAILURE: &str = "Something went wrong";

/// Email and password login.
pub struct LoginForm {
    client: ApiClient,
    email: String,
    password: SecretString,
    error: Option<String>,
}

impl LoginForm {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            email: String::new(),
            password: SecretString::from(String::new()),
            error: None,
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password(&mut self, password: SecretString) {
        self.password = password;
    }

    /// Message from the last failed submit.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Log in. On success the session holds the token and user.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Navigation {
        self.error = None;

        let email = match Email::parse(&self.email) {
            Ok(email) => email,
            Err(err) => {
                self.error = Some(format!("Please enter a valid email address: {err}"));
                return Navigation::Stay;
            }
        };
        if self.password.expose_secret().is_empty() {
            self.error = Some("Please enter your password".to_string());
            return Navigation::Stay;
        }

        match self.client.login(&email, &self.password).await {
            Ok(user) => {
                if let Some(user) = &user {
                    set_sentry_user(&user.id, user.email.as_deref());
                }
                add_breadcrumb("auth", "Logged in", Some(&[("domain", email.domain())]));
                Navigation::Home
            }
            Err(err) => {
                self.error = Some(match &err {
                    StoreError::Validation(message) | StoreError::Auth(message) => message.clone(),
                    StoreError::Network(_) => GENERIC_FAILURE.to_string(),
                });
                AppError::from(err).report();
                Navigation::Stay
            }
        }
    }
}

/// End the session. The local session is cleared even when the server
/// cannot be told.
#[instrument(skip(client))]
pub async fn logout(client: &ApiClient) -> Navigation {
    if let Err(err) = client.logout().await {
        warn!(error = %err, "Logout request failed, clearing local session anyway");
    }
    client.session().clear();
    clear_sentry_user();
    add_breadcrumb("auth", "Logged out", None);
    Navigation::Home
}
