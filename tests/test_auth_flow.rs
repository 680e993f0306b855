//! End-to-end login, logout and signup flows through the real router.

mod common;

use axum::http::{header, StatusCode};
use common::{TestClient, EMAIL, PASSWORD};

#[tokio::test]
async fn anonymous_visitor_is_sent_to_login() {
    let mut client = TestClient::new().await;

    let response = client.get("/snippet/create").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/user/login");
}

#[tokio::test]
async fn login_rotates_the_session_token() {
    let mut client = TestClient::with_user().await;
    client.get("/user/login").await;
    let before = client.cookie.clone().expect("login page starts a session");

    let response = client.login(EMAIL, PASSWORD).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/snippet/create");
    let after = client.cookie.clone().expect("login issues a cookie");
    assert_ne!(before, after);

    // The new token is authenticated
    let page = client.get("/snippet/create").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.headers[header::CACHE_CONTROL], "no-store");

    // The pre-login token no longer names any session
    client.cookie = Some(before);
    let stale = client.get("/snippet/create").await;
    assert_eq!(stale.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn session_cookie_is_locked_down() {
    let mut client = TestClient::with_user().await;

    let response = client.login(EMAIL, PASSWORD).await;

    let cookie = response.session_cookie().expect("session cookie");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.max_age(), Some(time::Duration::hours(12)));
}

#[tokio::test]
async fn wrong_password_keeps_the_visitor_anonymous() {
    let mut client = TestClient::with_user().await;

    let response = client.login(EMAIL, "wrong-password").await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Email or password is incorrect"));
    assert!(response.body.contains(EMAIL));
    assert!(!response.body.contains("wrong-password"));
    assert_eq!(client.get("/snippet/create").await.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn unknown_email_fails_like_a_wrong_password() {
    let mut client = TestClient::with_user().await;

    let response = client.login("bob@example.com", PASSWORD).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Email or password is incorrect"));
}

#[tokio::test]
async fn logout_rotates_and_deauthenticates() {
    let mut client = TestClient::with_user().await;
    client.login(EMAIL, PASSWORD).await;
    let page = client.get("/snippet/create").await;
    let logged_in = client.cookie.clone().unwrap();

    let response = client
        .post_form("/user/logout", &[("csrf_token", page.csrf_token().as_str())])
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/");
    assert_ne!(client.cookie.as_deref(), Some(logged_in.as_str()));

    let home = client.get("/").await;
    assert!(home.body.contains("You&#x27;ve been logged out successfully!"));
    assert!(home.body.contains("/user/login"));
    assert_eq!(client.get("/snippet/create").await.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_requires_login() {
    let mut client = TestClient::new().await;
    let token = client.get("/user/login").await.csrf_token();

    let response = client
        .post_form("/user/logout", &[("csrf_token", token.as_str())])
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/user/login");
}

#[tokio::test]
async fn signup_then_login() {
    let mut client = TestClient::new().await;
    let token = client.get("/user/signup").await.csrf_token();

    let response = client
        .post_form(
            "/user/signup",
            &[
                ("name", "Bob"),
                ("email", "bob@example.com"),
                ("password", "correct horse"),
                ("csrf_token", token.as_str()),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/user/login");

    let login_page = client.get("/user/login").await;
    assert!(login_page
        .body
        .contains("Your signup was successful. Please log in."));

    let response = client.login("bob@example.com", "correct horse").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn duplicate_email_is_a_form_error() {
    let mut client = TestClient::with_user().await;
    let token = client.get("/user/signup").await.csrf_token();

    let response = client
        .post_form(
            "/user/signup",
            &[
                ("name", "Alice Again"),
                ("email", EMAIL),
                ("password", "another-pass"),
                ("csrf_token", token.as_str()),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Email address is already in use"));
}

#[tokio::test]
async fn invalid_signup_is_rerendered() {
    let mut client = TestClient::new().await;
    let token = client.get("/user/signup").await.csrf_token();

    let response = client
        .post_form(
            "/user/signup",
            &[
                ("name", "Bob"),
                ("email", "bob"),
                ("password", "short"),
                ("csrf_token", token.as_str()),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("This field must be a valid email address"));
    assert!(response
        .body
        .contains("This field must be at least 8 characters long"));
}
