//! Integration tests for Farmstand.
//!
//! The tests drive the assembled storefront router in-process with
//! `tower::ServiceExt::oneshot`; no socket is opened. [`TestClient`] keeps
//! the session cookie between requests so a test behaves like one browser.
//!
//! ```bash
//! cargo test -p farmstand-integration-tests
//! ```

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use farmstand_core::catalog::Catalog;
use farmstand_storefront::config::{StorefrontConfig, TimingConfig};
use farmstand_storefront::state::AppState;
use tower::ServiceExt;

/// Largest response body a test will read.
const BODY_LIMIT: usize = 1024 * 1024;

/// Delay used in place of the three-second confirmation close.
pub const TEST_CLOSE_DELAY: Duration = Duration::from_millis(50);

/// A response with its body already read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    /// Whether the body shows `text`, allowing for HTML escaping of quotes
    /// and ampersands.
    #[must_use]
    pub fn shows(&self, text: &str) -> bool {
        let escaped = text.replace('&', "&amp;");
        ["&#x27;", "&#39;", "'"].iter().any(|apostrophe| {
            let candidate = escaped.replace('\'', apostrophe);
            self.body.contains(&candidate)
        })
    }

    /// Value of a response header as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A single browser talking to an in-process storefront.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Storefront with the embedded catalog and short test delays.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalog fails to load.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Storefront with a specific configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalog fails to load.
    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        #[allow(clippy::expect_used)]
        let catalog = Catalog::embedded().expect("embedded catalog loads");
        Self {
            app: farmstand_storefront::app(AppState::new(config, catalog)),
            cookie: None,
        }
    }

    /// Another browser against the same server, with no cookie.
    #[must_use]
    pub fn fresh_browser(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: None,
        }
    }

    /// Send a GET request.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::get(path);
        self.send(request, Body::empty()).await
    }

    /// Send a form-encoded POST request.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(path).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(request, Body::from(body)).await
    }

    #[allow(clippy::expect_used)]
    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = request.body(body).expect("valid request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
        {
            self.cookie = Some(cookie.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("body readable");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Default configuration with the delays shortened for tests.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        timing: TimingConfig {
            checkout_close_delay: TEST_CLOSE_DELAY,
            sign_in_delay: Duration::ZERO,
        },
        ..StorefrontConfig::default()
    }
}

/// Percent-encode a form value.
fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                char::from(b).to_string()
            }
            b' ' => "+".to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

/// A filled-in shipping form.
#[must_use]
pub fn shipping_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("first_name", "Ada"),
        ("last_name", "Lovelace"),
        ("email", "ada@example.com"),
        ("address", "12 Orchard Lane"),
        ("city", "Burlington"),
        ("state", "VT"),
        ("zip_code", "05401"),
        ("phone", "555-0100"),
    ]
}

/// A filled-in payment form.
#[must_use]
pub fn payment_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("card_number", "4242 4242 4242 4242"),
        ("expiry", "12/30"),
        ("cvc", "123"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_form_values() {
        assert_eq!(encode("ada@example.com"), "ada%40example.com");
        assert_eq!(encode("12 Orchard Lane"), "12+Orchard+Lane");
    }
}
