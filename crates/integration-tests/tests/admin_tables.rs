//! Table browsing, row selection and row actions over HTTP.

use mahardika_admin::db::Fixtures;
use mahardika_integration_tests::{TestServer, location, row_ids};
use reqwest::StatusCode;

// ============================================================================
// Browsing
// ============================================================================

#[tokio::test]
async fn test_admin_search_by_role_and_text() {
    let server = TestServer::signed_in().await;

    let page = server.api("admins?role=admin&filter=super").await;

    assert_eq!(row_ids(&page), ["ADMIN001"]);
    assert_eq!(page["total_matches"], 1);
    assert_eq!(page["state"], "loaded");
}

#[tokio::test]
async fn test_policies_sort_and_page() {
    let server = TestServer::signed_in().await;

    let first = server.api("policies?sort=id&dir=desc").await;
    assert_eq!(row_ids(&first).first().map(String::as_str), Some("POL005"));
    assert_eq!(first["page_count"], 1);

    let beyond = server.api("policies?page=9").await;
    assert_eq!(beyond["page"], 1);
}

#[tokio::test]
async fn test_unknown_column_is_a_bad_request() {
    let server = TestServer::signed_in().await;

    let resp = server.get("/api/policies?sort=nonexistent").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_table_is_not_found() {
    let server = TestServer::signed_in().await;

    let resp = server.get("/api/invoices").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filter_without_matches_shows_no_results() {
    let server = TestServer::signed_in().await;

    let body = server.page("/customers?filter=zzz-nothing").await;
    assert!(body.contains("No results."));
}

// ============================================================================
// Selection
// ============================================================================

#[tokio::test]
async fn test_selection_survives_navigation() {
    let server = TestServer::signed_in().await;
    // The customers table lists every account
    let accounts = Fixtures::builtin().unwrap().users.len();

    let resp = server
        .post_form(
            "/customers/selection",
            &[("op", "toggle"), ("id", "CUST002"), ("return_to", "/customers")],
        )
        .await;
    assert_eq!(location(&resp), "/customers");

    let body = server.page("/customers").await;
    assert!(body.contains(&format!("1 of {accounts} row(s) selected.")));

    server
        .post_form("/customers/selection", &[("op", "clear"), ("return_to", "/customers")])
        .await;
    let body = server.page("/customers").await;
    assert!(body.contains(&format!("0 of {accounts} row(s) selected.")));
}

#[tokio::test]
async fn test_select_all_covers_the_rendered_page_only() {
    let server = TestServer::signed_in().await;

    // Ids posted by the client are ignored; the page is rebuilt from return_to
    server
        .post_form(
            "/policies/selection",
            &[
                ("op", "toggle_all"),
                ("page_ids", "POL001,POL999"),
                ("return_to", "/policies?filter=POL003"),
            ],
        )
        .await;
    let body = server.page("/policies?filter=POL003").await;
    assert!(body.contains("1 of 5 row(s) selected."));

    // A second select-all on the same page clears the selection
    server
        .post_form(
            "/policies/selection",
            &[("op", "toggle_all"), ("return_to", "/policies?filter=POL003")],
        )
        .await;
    let body = server.page("/policies").await;
    assert!(body.contains("0 of 5 row(s) selected."));
}

#[tokio::test]
async fn test_reports_have_no_selection() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form("/reports/selection", &[("op", "clear"), ("return_to", "/reports")])
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Row actions
// ============================================================================

#[tokio::test]
async fn test_archive_hides_vehicle_until_unarchived() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form(
            "/vehicles/VEH001/actions",
            &[("action", "toggle_archive"), ("return_to", "/vehicles")],
        )
        .await;
    assert_eq!(location(&resp), "/vehicles");

    let body = server.page("/vehicles").await;
    assert!(body.contains("Vehicle VEH001 has been archived."));

    let active = server.api("vehicles").await;
    assert!(!row_ids(&active).contains(&"VEH001".to_string()));
    let all = server.api("vehicles?status=all").await;
    assert!(row_ids(&all).contains(&"VEH001".to_string()));

    server
        .post_form("/vehicles/VEH001/actions", &[("action", "toggle_archive")])
        .await;
    let active = server.api("vehicles").await;
    assert!(row_ids(&active).contains(&"VEH001".to_string()));
}

#[tokio::test]
async fn test_delete_policy_requires_confirmation() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form("/policies/POL002/actions", &[("action", "delete")])
        .await;
    assert_eq!(location(&resp), "/policies");

    // Nothing deleted yet; the confirmation prompt is pending
    let body = server.page("/policies").await;
    assert!(body.contains("permanently delete the policy POL002"));
    assert_eq!(server.api("policies").await["total_scope"], 5);

    let resp = server
        .post_form(
            "/policies/POL002/actions",
            &[("action", "delete"), ("confirmed", "true")],
        )
        .await;
    assert_eq!(location(&resp), "/policies");

    let page = server.api("policies").await;
    assert_eq!(page["total_scope"], 4);
    assert!(!row_ids(&page).contains(&"POL002".to_string()));
}

#[tokio::test]
async fn test_super_admin_role_change_is_disabled() {
    let server = TestServer::signed_in().await;

    server
        .post_form("/admins/ADMIN001/actions", &[("action", "change_role")])
        .await;

    let body = server.page("/admins").await;
    assert!(body.contains("role cannot be changed"));
}

#[tokio::test]
async fn test_action_on_unknown_row_is_not_found() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form("/vehicles/VEH999/actions", &[("action", "toggle_archive")])
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_policy_action_opens_form() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form("/policies/POL001/actions", &[("action", "edit")])
        .await;
    assert_eq!(location(&resp), "/policies/POL001/edit");
}
