//! Integration tests for the Diwan storefront.
//!
//! The full router (sessions, request IDs, tracing, rate limiting) is driven
//! in-process with `tower::ServiceExt::oneshot`. Sessions use the in-memory
//! store and contact messages go to [`MemoryContactRecords`], so no database
//! is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p diwan-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Listing filters, sort, query sync, product detail
//! - `shop` - Cart and wishlist persistence across requests
//! - `preferences` - Language and theme toggles
//! - `contact` - Contact form validation and record store failures

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use diwan_storefront::catalog::Catalog;
use diwan_storefront::config::{SentryConfig, StorefrontConfig};
use diwan_storefront::db::MemoryContactRecords;
use diwan_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::session::{Id, Record};
use tower_sessions::{MemoryStore, SessionStore, session_store};
use url::Url;

/// Upper bound on response bodies read by the helpers.
const BODY_LIMIT: usize = 1024 * 1024;

/// Configuration for an in-process storefront.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/diwan_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: Url::parse("http://localhost:3000").unwrap(),
        catalog_path: None,
        sentry: SentryConfig::default(),
    }
}

/// In-memory session store that pauses before every load.
///
/// Widens the window between a request reading its session and saving it,
/// so overlapping requests on one session actually overlap.
#[derive(Debug, Clone, Default)]
pub struct SlowLoadStore {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowLoadStore {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::default(),
            delay,
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for SlowLoadStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        self.inner.create(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.inner.save(record).await
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        tokio::time::sleep(self.delay).await;
        self.inner.load(session_id).await
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.inner.delete(session_id).await
    }
}

/// A response with its status, headers, and raw body.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// The body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

/// One visitor talking to a fresh storefront.
///
/// The session cookie from each response is replayed on the next request,
/// the way a browser would.
pub struct TestClient {
    router: Router,
    records: Arc<MemoryContactRecords>,
    cookie: Option<String>,
}

impl TestClient {
    /// Storefront with the bundled sample catalog and an empty record store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_session_store(MemoryStore::default())
    }

    /// Storefront with the sample catalog over the given session store.
    #[must_use]
    pub fn with_session_store<S: SessionStore + Clone>(session_store: S) -> Self {
        let records = Arc::new(MemoryContactRecords::new());
        let state = AppState::new(test_config(), Catalog::sample().unwrap(), records.clone());
        let router = diwan_storefront::app(state, session_store);

        Self {
            router,
            records,
            cookie: None,
        }
    }

    /// The record store behind the contact form.
    #[must_use]
    pub fn records(&self) -> &MemoryContactRecords {
        &self.records
    }

    /// A second visitor on the same storefront (no session cookie).
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            records: self.records.clone(),
            cookie: None,
        }
    }

    /// Send a request, replaying and capturing the session cookie.
    pub async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.dispatch(request).await;

        if let Some(set_cookie) = response.headers.get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_owned());
        }

        response
    }

    /// `POST uri` with a JSON body, replaying the session cookie without
    /// capturing a new one. Lets one visitor run requests concurrently.
    pub async fn post_json_shared(&self, uri: &str, body: &Value) -> TestResponse {
        self.dispatch(json_request(uri, body)).await
    }

    async fn dispatch(&self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET uri`.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// `POST uri` with no body.
    pub async fn post(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// `POST uri` with a JSON body.
    pub async fn post_json(&mut self, uri: &str, body: &Value) -> TestResponse {
        self.send(json_request(uri, body)).await
    }
}

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Product ids in a JSON product array, in order.
#[must_use]
pub fn product_ids(products: &Value) -> Vec<String> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|product| product["id"].as_str().unwrap().to_owned())
        .collect()
}

/// Decode a serialized price.
#[must_use]
pub fn price(value: &Value) -> diwan_core::Price {
    serde_json::from_value(value.clone()).unwrap()
}
