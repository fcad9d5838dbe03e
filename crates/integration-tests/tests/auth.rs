//! Login, logout and the session cookie.

use popacart_integration_tests::{TEST_TOKEN, TestContext};
use popacart_storefront::views::{Header, LoginForm, Navigation, logout};
use popacart_storefront::{Session, SessionFile};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn form(ctx: &TestContext) -> LoginForm {
    let mut form = LoginForm::new(ctx.client().clone());
    form.set_email("asha@example.com");
    form.set_password(SecretString::from("hunter22".to_string()));
    form
}

#[tokio::test]
async fn test_login_stores_token_and_sends_it_as_cookie() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/user/login"))
        .and(body_json(json!({"email": "asha@example.com", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "abc123",
            "user": {"_id": "u1", "name": "Asha", "email": "asha@example.com"}
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/cart"))
        .and(header("cookie", "token=abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "cart": null})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut form = form(&ctx);
    assert_eq!(form.submit().await, Navigation::Home);
    assert_eq!(form.error(), None);

    let session = ctx.state.session();
    assert!(session.is_authenticated());
    assert_eq!(Header::new(session.clone()).render().to_string(), "Hi, Asha | Bag (0)");

    let cart = ctx.state.cart().load().await.expect("cart loads");
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_login_falls_back_to_set_cookie() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/user/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "token=from-cookie; Path=/; HttpOnly")
                .set_body_json(json!({"success": true})),
        )
        .mount(&ctx.server)
        .await;

    let mut form = form(&ctx);
    assert_eq!(form.submit().await, Navigation::Home);

    let token = ctx.state.session().token().expect("token stored");
    assert_eq!(token.expose_secret(), "from-cookie");
}

#[tokio::test]
async fn test_refused_login_shows_server_message() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/user/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "message": "Invalid email or password"})),
        )
        .mount(&ctx.server)
        .await;

    let mut form = form(&ctx);
    assert_eq!(form.submit().await, Navigation::Stay);
    assert_eq!(form.error(), Some("Invalid email or password"));
    assert!(!ctx.state.session().is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_session_even_when_server_fails() {
    let ctx = TestContext::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/user/logout"))
        .and(header("cookie", format!("token={TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&ctx.server)
        .await;

    assert!(ctx.state.session().is_authenticated());
    assert_eq!(logout(ctx.client()).await, Navigation::Home);
    assert!(!ctx.state.session().is_authenticated());
}

#[tokio::test]
async fn test_session_survives_restart_through_session_file() {
    let ctx = TestContext::logged_in().await;
    let dir = tempfile::tempdir().expect("temp dir");
    let file = SessionFile::new(dir.path().join("session.json"));

    file.save(ctx.state.session()).await.expect("saved");

    let restored = Session::new();
    file.restore(&restored).await.expect("restored");
    let token = restored.token().expect("token restored");
    assert_eq!(token.expose_secret(), TEST_TOKEN);

    restored.clear();
    file.save(&restored).await.expect("saved");
    assert!(!file.path().exists());
}
