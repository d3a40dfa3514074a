//! Router wiring.

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/does-not-exist", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_method_is_rejected() {
    let app = TestApp::new();

    let response = app.request("DELETE", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}
