//! Policy, user and settings forms over HTTP.

use mahardika_integration_tests::{TestServer, location, row_ids};
use reqwest::StatusCode;

fn policy_form<'a>(owner: &'a str, vehicle: &'a str, end: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("owner_uid", owner),
        ("vehicle_id", vehicle),
        ("policy_type", "Comprehensive"),
        ("start_date", "2025-01-01"),
        ("end_date", end),
        ("total_price", "1250.50"),
        ("pdf_url", ""),
    ]
}

// ============================================================================
// Policies
// ============================================================================

#[tokio::test]
async fn test_create_policy_gets_next_id() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form("/policies/new", &policy_form("CUST002", "VEH002", "2099-12-31"))
        .await;
    assert_eq!(location(&resp), "/policies");

    let body = server.page("/policies").await;
    assert!(body.contains("Policy POL006 has been successfully created."));

    let page = server.api("policies?filter=POL006").await;
    assert_eq!(row_ids(&page), ["POL006"]);
}

#[tokio::test]
async fn test_create_policy_rejects_unknown_references() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form("/policies/new", &policy_form("CUST999", "VEH002", "2099-12-31"))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(server.api("policies").await["total_scope"], 5);
}

#[tokio::test]
async fn test_create_policy_rejects_reversed_dates() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form("/policies/new", &policy_form("CUST002", "VEH002", "2024-01-01"))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("End date cannot be before the start date.")
    );
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let server = TestServer::signed_in().await;

    let body = server.page("/policies/POL001/edit").await;
    assert!(body.contains("POL001"));
    assert!(body.contains("dummy.pdf"));
}

#[tokio::test]
async fn test_edit_unknown_policy_is_not_found() {
    let server = TestServer::signed_in().await;

    let resp = server.get("/policies/POL404/edit").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.unwrap().contains("POL404"));
}

#[tokio::test]
async fn test_update_policy_keeps_id() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form("/policies/POL003/edit", &policy_form("CUST003", "VEH003", "2099-06-30"))
        .await;
    assert_eq!(location(&resp), "/policies");

    let body = server.page("/policies").await;
    assert!(body.contains("Policy POL003 has been successfully updated."));
    assert_eq!(server.api("policies").await["total_scope"], 5);
}

#[tokio::test]
async fn test_export_downloads_json() {
    let server = TestServer::signed_in().await;

    let resp = server.get("/policies/export").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("policies.json"));

    let policies: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(policies.as_array().map(Vec::len), Some(5));
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_invite_staff_member() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form(
            "/users/new",
            &[
                ("display_name", "Nora Aziz"),
                ("email", "nora@mahardika.co"),
                ("role", "staff"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/staff");

    let body = server.page("/staff").await;
    assert!(body.contains("An invitation has been sent to nora@mahardika.co"));

    let page = server.api("staff?filter=nora").await;
    assert_eq!(page["total_matches"], 1);
}

#[tokio::test]
async fn test_invite_with_taken_email_conflicts() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form(
            "/users/new",
            &[
                ("display_name", "Someone Else"),
                ("email", "staff@mahardika.co"),
                ("role", "staff"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("A user with this email already exists.")
    );
}

#[tokio::test]
async fn test_invite_rejects_invalid_email() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form(
            "/users/new",
            &[("display_name", "Nora"), ("email", "not-an-email"), ("role", "staff")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_settings_save_is_remembered() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form(
            "/settings",
            &[
                ("display_name", "Chief Admin"),
                ("email", "chief@mahardika.co"),
                ("bio", "Runs the agency."),
                ("avatar_url", ""),
                ("email_notifications", "on"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/settings");

    let body = server.page("/settings").await;
    assert!(body.contains("Settings Saved"));
    assert!(body.contains("Chief Admin"));
}

#[tokio::test]
async fn test_settings_reject_bad_avatar_url() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form(
            "/settings",
            &[
                ("display_name", "Chief Admin"),
                ("email", "chief@mahardika.co"),
                ("avatar_url", "not a url"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("Please enter a valid URL."));
}
