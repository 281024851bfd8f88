//! Integration tests for Cartwheel.
//!
//! The storefront router is driven in-process with `tower::ServiceExt`, so no
//! server or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartwheel-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart view controls (HTMX routes)
//! - `storefront_api` - JSON API and middleware

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header::CONTENT_TYPE},
};
use cartwheel_storefront::{app, config::StorefrontConfig, state::AppState};
use tower::ServiceExt;

/// A response with its body collected.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is JSON")
    }

    /// Value of a response header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// In-process storefront with a fresh, empty cart.
pub struct TestContext {
    pub router: Router,
    pub state: AppState,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Storefront with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StorefrontConfig::default())
    }

    /// Storefront with the given configuration.
    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        let state = AppState::new(config);
        Self {
            router: app(state.clone()),
            state,
        }
    }

    /// Send a request and collect the response.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    #[allow(clippy::expect_used)]
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// GET `uri`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    #[allow(clippy::expect_used)]
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::get(uri).body(Body::empty()).expect("request");
        self.send(request).await
    }

    /// POST a urlencoded form to `uri`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    #[allow(clippy::expect_used)]
    pub async fn post_form(&self, uri: &str, form: &str) -> TestResponse {
        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("request");
        self.send(request).await
    }

    /// POST a JSON body to `uri`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    #[allow(clippy::expect_used)]
    pub async fn post_json(&self, uri: &str, body: &serde_json::Value) -> TestResponse {
        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        self.send(request).await
    }

    /// Add one unit of a product through the catalog form route.
    pub async fn add(&self, id: i32, name: &str, unit_cost: &str) -> TestResponse {
        let form = format!(
            "id={id}&name={name}&unit_cost={unit_cost}&image=https%3A%2F%2Fcdn.example.com%2F{id}.jpg"
        );
        self.post_form("/cart/add", &form).await
    }
}
