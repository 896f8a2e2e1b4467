//! Integration tests for Threadline.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p threadline-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_consistency` - several cart managers sharing one durable store
//! - `http_cart` - cart, page and catalog routes through the full router
//!
//! Everything runs in-process against the in-memory cart store and catalog;
//! no server or database is needed.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::{Map, Value, json};
use tower::ServiceExt;

use threadline_core::ProductRecord;
use threadline_storefront::catalog::ProductCatalog;
use threadline_storefront::config::StorefrontConfig;
use threadline_storefront::content::{ContentStore, parse_page};
use threadline_storefront::state::AppState;
use threadline_storefront::store::MemoryStore;

/// Shipping page fixture.
pub const SHIPPING_PAGE: &str =
    "---\ntitle: Shipping\ndescription: Delivery options\n---\nOrders ship within **2 days**.\n";

/// A response with its body read into a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// A header value as a string, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// One running storefront plus the backends behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub carts: Arc<MemoryStore>,
}

impl TestApp {
    /// Storefront with the shipping page and a small two-gender catalog.
    #[must_use]
    pub fn new() -> Self {
        let config = StorefrontConfig::from_lookup(|_| None).unwrap();
        let carts = Arc::new(MemoryStore::new());
        let content = ContentStore::from_pages([parse_page("shipping", SHIPPING_PAGE).unwrap()]);
        let state = AppState::new(config, carts.clone(), content, sample_catalog());
        Self {
            router: threadline_storefront::app(state.clone()),
            state,
            carts,
        }
    }

    /// A browser with its own cookie jar.
    #[must_use]
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends requests through the router, replaying the session cookie.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, Body::empty()).await
    }

    pub async fn post_json(&mut self, uri: &str, body: &Value) -> TestResponse {
        self.send(
            Method::POST,
            uri,
            Some("application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    pub async fn put_json(&mut self, uri: &str, body: &Value) -> TestResponse {
        self.send(
            Method::PUT,
            uri,
            Some("application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        self.send(
            Method::POST,
            uri,
            Some("application/x-www-form-urlencoded"),
            Body::from(form.to_string()),
        )
        .await
    }

    async fn send(
        &mut self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: Body,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(pair) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

/// Catalog fixture: two women's dresses, one women's top, one men's shirt.
#[must_use]
pub fn sample_catalog() -> ProductCatalog {
    ProductCatalog::in_memory(vec![
        product("d1", &json!({"name": "Wrap Dress", "gender": "women", "subcategory": "dresses"})),
        product("d2", &json!({"name": "Slip Dress", "gender": "women", "subcategory": "dresses"})),
        product("t1", &json!({"name": "Boxy Tee", "gender": "women", "subcategory": "tops"})),
        product("s1", &json!({"name": "Oxford Shirt", "gender": "men", "subcategory": "shirts"})),
    ])
}

fn product(id: &str, fields: &Value) -> ProductRecord {
    let fields: Map<String, Value> = fields.as_object().cloned().unwrap_or_default();
    ProductRecord::from_document(id, fields)
}
