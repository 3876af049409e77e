//! Diwan storefront library.
//!
//! Bilingual (English/Arabic) furniture storefront: product catalog with
//! search, filters, and sort; per-visitor cart, wishlist, and preferences
//! kept in the session; and a contact form backed by `PostgreSQL`.
//!
//! The crate is a library so the router can be driven in-process by the
//! integration tests; `main.rs` only wires configuration and I/O.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod stores;

use axum::{Router, extract::Request};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use state::AppState;

/// Build the application router.
///
/// Layers, outermost first: request tracing, request ID, per-session lock,
/// sessions. The lock wraps the session layer so it is held until the
/// session record is saved.
/// Sentry layers are added by the binary.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer =
        middleware::create_session_layer(session_store, state.config().secure_cookies());

    routes::routes()
        .layer(session_layer)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_lock_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
