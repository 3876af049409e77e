//! Integration tests for language and theme preferences.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use diwan_integration_tests::TestClient;

fn with_color_scheme(uri: &str, method: Method, scheme: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("sec-ch-prefers-color-scheme", scheme)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_defaults_and_client_hint_headers() {
    let mut client = TestClient::new();

    let resp = client.get("/api/preferences").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.headers.get("accept-ch").unwrap(),
        "Sec-CH-Prefers-Color-Scheme"
    );

    let body = resp.json();
    assert_eq!(body["language"], "en");
    assert_eq!(body["theme"], "light");
    assert_eq!(body["direction"], "ltr");
    assert_eq!(body["dark"], false);
}

#[tokio::test]
async fn test_system_theme_applies_until_chosen() {
    let mut client = TestClient::new();

    let body = client
        .send(with_color_scheme("/api/preferences", Method::GET, "dark"))
        .await
        .json();
    assert_eq!(body["theme"], "dark");
    assert_eq!(body["dark"], true);

    // Toggling from the system dark theme stores an explicit light choice
    let body = client
        .send(with_color_scheme(
            "/api/preferences/theme/toggle",
            Method::POST,
            "dark",
        ))
        .await
        .json();
    assert_eq!(body["theme"], "light");

    let body = client
        .send(with_color_scheme("/api/preferences", Method::GET, "dark"))
        .await
        .json();
    assert_eq!(body["theme"], "light");
}

#[tokio::test]
async fn test_language_toggle_persists() {
    let mut client = TestClient::new();

    let body = client.post("/api/preferences/language/toggle").await.json();
    assert_eq!(body["language"], "ar");
    assert_eq!(body["direction"], "rtl");

    let body = client.get("/api/preferences").await.json();
    assert_eq!(body["language"], "ar");

    let body = client.get("/api/products").await.json();
    assert_eq!(body["language"], "ar");

    let body = client.post("/api/preferences/language/toggle").await.json();
    assert_eq!(body["language"], "en");
    assert_eq!(body["direction"], "ltr");
}

#[tokio::test]
async fn test_theme_toggle_persists() {
    let mut client = TestClient::new();

    let body = client.post("/api/preferences/theme/toggle").await.json();
    assert_eq!(body["theme"], "dark");
    assert_eq!(body["dark"], true);

    let body = client.get("/api/preferences").await.json();
    assert_eq!(body["theme"], "dark");

    let mut stranger = client.new_visitor();
    let body = stranger.get("/api/preferences").await.json();
    assert_eq!(body["theme"], "light");
}
