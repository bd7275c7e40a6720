//! Policy and report documents, served by a local stub.

use axum::Router;
use axum::http::{StatusCode as StubStatus, header};
use axum::routing::get;
use mahardika_admin::db::Fixtures;
use mahardika_core::DocumentUrl;
use mahardika_integration_tests::{TestServer, location, serve_stub};
use reqwest::StatusCode;

const PDF_BYTES: &[u8] = b"%PDF-1.4 stub";

fn stub() -> Router {
    Router::new()
        .route(
            "/files/policy-001.pdf",
            get(|| async { ([(header::CONTENT_TYPE, "application/pdf")], PDF_BYTES) }),
        )
        .route("/files/gone.pdf", get(|| async { StubStatus::NOT_FOUND }))
}

/// Sample data with POL001 served by the stub and POL002 pointing at a
/// document the stub refuses.
async fn server_with_stub() -> TestServer {
    let base = serve_stub(stub()).await;

    let mut fixtures = Fixtures::builtin().unwrap();
    for policy in &mut fixtures.policies {
        match policy.id.as_str() {
            "POL001" => {
                policy.pdf_url =
                    Some(DocumentUrl::parse(&format!("{base}/files/policy-001.pdf")).unwrap());
            }
            "POL002" => {
                policy.pdf_url = Some(DocumentUrl::parse(&format!("{base}/files/gone.pdf")).unwrap());
            }
            _ => {}
        }
    }

    let server = TestServer::with_fixtures(&fixtures).await;
    server.login().await;
    server
}

#[tokio::test]
async fn test_download_streams_attachment() {
    let server = server_with_stub().await;

    let resp = server.get("/policies/POL001/document/download").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
    assert_eq!(disposition, "attachment; filename=\"policy-001.pdf\"");
    assert_eq!(resp.headers()["content-type"], "application/pdf");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), PDF_BYTES);
}

#[tokio::test]
async fn test_failed_download_returns_to_list_with_toast() {
    let server = server_with_stub().await;

    let resp = server.get("/policies/POL002/document/download").await;
    assert_eq!(location(&resp), "/policies");

    let body = server.page("/policies").await;
    assert!(body.contains("Download Failed"));
}

#[tokio::test]
async fn test_view_redirects_to_document() {
    let server = server_with_stub().await;

    let resp = server.get("/policies/POL001/document").await;
    assert!(location(&resp).ends_with("/files/policy-001.pdf"));
}

#[tokio::test]
async fn test_missing_pdf_shows_toast() {
    let server = TestServer::signed_in().await;

    let resp = server.get("/policies/POL004/document").await;
    assert_eq!(location(&resp), "/policies");

    let body = server.page("/policies").await;
    assert!(body.contains("PDF document is not available for this policy."));
}

#[tokio::test]
async fn test_missing_pdf_menu_item_is_disabled() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form("/policies/POL005/actions", &[("action", "download_document")])
        .await;
    assert_eq!(location(&resp), "/policies");

    let body = server.page("/policies").await;
    assert!(body.contains("No PDF"));
}

#[tokio::test]
async fn test_unknown_report_is_not_found() {
    let server = TestServer::signed_in().await;

    let resp = server.get("/reports/REP999/document").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_download_action_announces_file() {
    let server = TestServer::signed_in().await;

    let resp = server
        .post_form("/reports/REP001/actions", &[("action", "download_document")])
        .await;
    assert_eq!(location(&resp), "/reports/REP001/document/download");
}
