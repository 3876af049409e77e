//! Integration tests for the catalog listing and product routes.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use diwan_integration_tests::{TestClient, product_ids};
use serde_json::json;
use url::form_urlencoded;

fn listing_uri(params: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("/api/products?{query}")
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_default_listing_is_featured_first() {
    let mut client = TestClient::new();

    let resp = client.get("/api/products").await;
    assert_eq!(resp.status, StatusCode::OK);

    let body = resp.json();
    assert_eq!(body["total"], 6);
    assert_eq!(body["language"], "en");
    assert_eq!(body["query"], "");
    assert_eq!(product_ids(&body["products"]), vec!["1", "2", "3", "5", "4", "6"]);
}

#[tokio::test]
async fn test_price_range_is_inclusive_and_keeps_featured_order() {
    let mut client = TestClient::new();

    let body = client
        .get("/api/products?minPrice=1000&maxPrice=2000")
        .await
        .json();

    assert_eq!(body["total"], 3);
    assert_eq!(product_ids(&body["products"]), vec!["2", "5", "4"]);
    assert_eq!(body["query"], "minPrice=1000&maxPrice=2000");
}

#[tokio::test]
async fn test_flags_and_multi_category() {
    let mut client = TestClient::new();

    let body = client.get("/api/products?inStock=true").await.json();
    assert_eq!(product_ids(&body["products"]), vec!["1", "2", "3", "5", "6"]);

    let body = client
        .get(&listing_uri(&[("category", "Chairs,Outdoor"), ("sort", "price-desc")]))
        .await
        .json();
    assert_eq!(product_ids(&body["products"]), vec!["6", "1"]);

    let body = client.get("/api/products?new=true&sort=price-asc").await.json();
    assert_eq!(product_ids(&body["products"]), vec!["1", "6", "3"]);
}

#[tokio::test]
async fn test_malformed_params_degrade_to_defaults() {
    let mut client = TestClient::new();

    let resp = client
        .get("/api/products?sort=newest&sort=price-asc&utm_source=mail")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(product_ids(&body["products"]), vec!["1", "3", "6", "2", "4", "5"]);
    assert_eq!(body["query"], "sort=newest");

    let body = client
        .get("/api/products?sort=cheapest&minPrice=abc&new=yes")
        .await
        .json();
    assert_eq!(body["total"], 6);
    assert_eq!(body["query"], "");
}

#[tokio::test]
async fn test_search_matches_english_case_insensitively() {
    let mut client = TestClient::new();

    let body = client.get("/api/products?search=MOROCCAN").await.json();
    assert_eq!(product_ids(&body["products"]), vec!["2", "5"]);

    // Matched as typed, spaces included
    let body = client.get("/api/products?search=%20bookshelf").await.json();
    assert_eq!(product_ids(&body["products"]), vec!["5"]);

    let body = client.get("/api/products?search=%20%20").await.json();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_categories_follow_active_language() {
    let mut client = TestClient::new();

    let body = client.get("/api/products/categories").await.json();
    assert_eq!(body["categories"][0], "Chairs");

    client.post("/api/preferences/language/toggle").await;

    let body = client.get("/api/products/categories").await.json();
    assert_eq!(body["language"], "ar");
    assert_eq!(body["categories"][0], "كراسي");

    let body = client.get(&listing_uri(&[("category", "كراسي")])).await.json();
    assert_eq!(product_ids(&body["products"]), vec!["1"]);

    // English labels do not match while browsing in Arabic
    let body = client.get("/api/products?category=Chairs").await.json();
    assert_eq!(body["total"], 0);

    let body = client.get(&listing_uri(&[("search", "دمشق")])).await.json();
    assert_eq!(product_ids(&body["products"]), vec!["4"]);
}

// ============================================================================
// Home & Detail
// ============================================================================

#[tokio::test]
async fn test_home_rails() {
    let mut client = TestClient::new();

    let body = client.get("/api/products/home").await.json();
    assert_eq!(product_ids(&body["featured"]), vec!["1", "2", "3"]);
    assert_eq!(product_ids(&body["newArrivals"]), vec!["1", "3", "6"]);
}

#[tokio::test]
async fn test_product_detail_reflects_wishlist() {
    let mut client = TestClient::new();

    let body = client.get("/api/products/4").await.json();
    assert_eq!(body["product"]["name"]["en"], "Damascus Bed Frame");
    assert_eq!(body["inWishlist"], false);
    assert_eq!(body["related"], json!([]));

    client
        .post_json("/api/wishlist/add", &json!({ "productId": "4" }))
        .await;

    let body = client.get("/api/products/4").await.json();
    assert_eq!(body["inWishlist"], true);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mut client = TestClient::new();

    let resp = client.get("/api/products/404").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.json()["error"].as_str().unwrap().contains("404"));
}
