//! Bearer token enforcement on protected endpoints.

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn protected_endpoints_require_a_token() {
    let app = TestApp::new();

    for (method, uri) in [
        ("GET", "/api/auth/me"),
        ("GET", "/api/users/profile"),
        ("GET", "/api/notifications"),
        ("GET", "/api/notifications/unread-count"),
        ("PUT", "/api/notifications/read-all"),
        ("GET", "/api/journeys"),
        ("GET", "/api/route-planning/saved"),
        ("POST", "/api/posts/00000000-0000-0000-0000-000000000000/like"),
    ] {
        let response = app.request(method, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(response.body["error"], "UNAUTHORIZED", "{method} {uri}");
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/notifications", None, Some("not.a.jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid token");
}

#[tokio::test]
async fn register_validates_before_touching_the_database() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "name": "Ada",
                "email": "not-an-email",
                "password": "secret1",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert!(response.body["details"]["email"].is_array());
}
