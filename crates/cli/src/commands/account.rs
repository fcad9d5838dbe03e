//! Login and logout.

use popacart_storefront::AppError;
use popacart_storefront::views::{LoginForm, Navigation, logout as end_session};
use secrecy::SecretString;

use super::Context;

/// Environment variable holding the login password.
pub const PASSWORD_VAR: &str = "POPACART_PASSWORD";

/// Read the login password from [`PASSWORD_VAR`].
///
/// # Errors
///
/// Returns `AppError::Validation` when the variable is unset or empty.
pub fn password_from_env() -> Result<SecretString, AppError> {
    password_from(std::env::var(PASSWORD_VAR).ok())
}

fn password_from(value: Option<String>) -> Result<SecretString, AppError> {
    value
        .filter(|password| !password.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| AppError::Validation(format!("Set {PASSWORD_VAR} to log in.")))
}

/// Log in and save the session for later commands.
///
/// # Errors
///
/// Returns `AppError` if the login was refused or the session cannot be saved.
pub async fn login(ctx: &Context, email: String, password: SecretString) -> Result<(), AppError> {
    let mut form = LoginForm::new(ctx.state().client().clone());
    form.set_email(email);
    form.set_password(password);

    if form.submit().await != Navigation::Home {
        let message = form.error().unwrap_or("Something went wrong").to_string();
        return Err(AppError::Validation(message));
    }

    ctx.persist_session().await?;
    let name = ctx
        .state()
        .session()
        .user()
        .map_or_else(String::new, |user| format!(", {}", user.display_name()));
    tracing::info!("Logged in");
    println!("Welcome back{name}");
    Ok(())
}

/// End the session here and on the server.
///
/// # Errors
///
/// Returns `AppError` if the saved session cannot be removed.
pub async fn logout(ctx: &Context) -> Result<(), AppError> {
    let navigation = end_session(ctx.state().client()).await;
    ctx.persist_session().await?;
    println!("Logged out");
    ctx.follow(navigation).await
}
