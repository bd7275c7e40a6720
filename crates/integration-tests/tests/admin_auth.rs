//! Sign-in, sign-out and route protection.

use mahardika_integration_tests::{ADMIN_EMAIL, TestServer, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let server = TestServer::start().await;

    for path in ["/dashboard", "/policies", "/settings", "/policies/POL001/edit"] {
        let resp = server.get(path).await;
        assert_eq!(location(&resp), "/", "GET {path}");
    }
}

#[tokio::test]
async fn test_api_requires_session() {
    let server = TestServer::start().await;

    let resp = server.get("/api/vehicles").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_page_lists_sample_accounts() {
    let server = TestServer::start().await;
    let body = server.page("/").await;

    assert!(body.contains(ADMIN_EMAIL));
    assert!(body.contains("staff@mahardika.co"));
    // Customers cannot sign in
    assert!(!body.contains("ali@example.com"));
}

#[tokio::test]
async fn test_login_rejects_unknown_and_customer_accounts() {
    let server = TestServer::start().await;

    for email in ["nobody@mahardika.co", "ali@example.com"] {
        let resp = server
            .post_form("/login", &[("email", email), ("password", "password")])
            .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.text().await.unwrap().contains("Invalid email or password."));
    }
}

#[tokio::test]
async fn test_login_requires_password() {
    let server = TestServer::start().await;

    let resp = server
        .post_form("/login", &[("email", ADMIN_EMAIL), ("password", "")])
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_welcomes_operator_once() {
    let server = TestServer::signed_in().await;

    let dashboard = server.page("/dashboard").await;
    assert!(dashboard.contains("Login Successful"));

    // Toasts are shown once
    let again = server.page("/dashboard").await;
    assert!(!again.contains("Login Successful"));

    // Signed-in operators skip the login page
    assert_eq!(location(&server.get("/").await), "/dashboard");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = TestServer::signed_in().await;

    let resp = server.post_form("/logout", &[]).await;
    assert_eq!(location(&resp), "/");

    assert_eq!(location(&server.get("/dashboard").await), "/");
}

#[tokio::test]
async fn test_health_is_public() {
    let server = TestServer::start().await;
    assert_eq!(server.get("/health").await.status(), StatusCode::OK);
}
