//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (record store)
//!
//! # Products
//! GET  /api/products                  - Filtered listing (category, new, inStock,
//!                                       sort, search, minPrice, maxPrice)
//! GET  /api/products/categories       - Category labels (active language)
//! GET  /api/products/home             - Featured and new arrival rails
//! GET  /api/products/{id}             - Product detail with related products
//!
//! # Cart
//! GET  /api/cart                      - Cart with total and item count
//! POST /api/cart/add                  - {productId, quantity?}
//! POST /api/cart/update               - {productId, quantity}
//! POST /api/cart/remove               - {productId}
//! POST /api/cart/clear
//!
//! # Wishlist
//! GET  /api/wishlist
//! POST /api/wishlist/add              - {productId}
//! POST /api/wishlist/remove           - {productId}
//! POST /api/wishlist/move-to-cart     - {productId}
//!
//! # Preferences
//! GET  /api/preferences
//! POST /api/preferences/language/toggle
//! POST /api/preferences/theme/toggle
//!
//! # Contact (rate limited)
//! POST /api/contact                   - {name, email, subject, message}
//! ```

pub mod cart;
pub mod contact;
pub mod health;
pub mod preferences;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::contact_rate_limiter;
use crate::state::AppState;

/// Create the health check router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/categories", get(products::categories))
        .route("/home", get(products::home))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/move-to-cart", post(wishlist::move_to_cart))
}

/// Create the preference routes router.
pub fn preference_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(preferences::show))
        .route("/language/toggle", post(preferences::toggle_language))
        .route("/theme/toggle", post(preferences::toggle_theme))
}

/// Create the contact routes router.
pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(contact::submit))
        .layer(contact_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .nest("/api/preferences", preference_routes())
        .nest("/api/contact", contact_routes())
}
