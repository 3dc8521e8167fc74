//! Client for the remote rendering service.
//!
//! The service loads a page in a browser, runs its scripts and answers with
//! the resulting document. One call is a `POST {endpoint}/render.json`:
//!
//! ```json
//! {"url": "https://example.com/", "http_method": "GET", "cookies": [],
//!  "wait": 0.5, "timeout": 30.0}
//! ```
//!
//! answered by
//!
//! ```json
//! {"url": "https://example.com/", "http_status": 200, "html": "<html>..</html>",
//!  "cookies": [{"name": "sid", "value": "1", "domain": "example.com"}],
//!  "headers": [{"name": "Cache-Control", "value": "max-age=60"}]}
//! ```

use pagefetch_core::HttpMethod;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::cookies::Cookie;
use crate::error::RenderError;

/// Path of the render call, relative to the endpoint.
const RENDER_PATH: &str = "render.json";

/// Longest service error body kept in [`RenderError::Service`].
const MAX_ERROR_CHARS: usize = 200;

// ============================================================================
// Wire Types
// ============================================================================

/// Body of a render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Page to load.
    pub url: String,
    /// Method the browser uses for the page.
    pub http_method: HttpMethod,
    /// Encoded form body for POST pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Cookies to install before loading.
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    /// Seconds to wait after the page loads.
    pub wait: f64,
    /// Seconds the service may spend on the page.
    pub timeout: f64,
    /// Opaque caller token, passed through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
}

/// One response header of the rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderHeader {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// Answer of a render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
    /// Final page URL after redirects.
    pub url: String,
    /// Status of the page's main document.
    pub http_status: u16,
    /// Document after scripts ran.
    pub html: String,
    /// Cookies present after the page ran.
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    /// Response headers of the main document.
    #[serde(default)]
    pub headers: Vec<RenderHeader>,
}

impl RenderResponse {
    /// Converts the reported headers into a [`HeaderMap`], skipping any that
    /// are not valid HTTP.
    pub fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for header in &self.headers {
            let name = HeaderName::from_bytes(header.name.as_bytes());
            let value = HeaderValue::from_str(&header.value);
            match (name, value) {
                (Ok(name), Ok(value)) => {
                    map.append(name, value);
                }
                _ => warn!(header = %header.name, "Skipping invalid header from render service"),
            }
        }
        map
    }
}

// ============================================================================
// Render Service
// ============================================================================

/// Connection to a rendering service.
#[derive(Debug, Clone)]
pub struct RenderService {
    client: Client,
    render_url: Url,
    wait: f64,
    timeout: f64,
}

impl RenderService {
    /// Creates a service client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Endpoint`] unless `endpoint` is an absolute
    /// http(s) URL.
    pub fn new(client: Client, endpoint: &str, wait: f64, timeout: f64) -> Result<Self, RenderError> {
        Ok(Self {
            client,
            render_url: render_url(endpoint)?,
            wait,
            timeout,
        })
    }

    /// Returns the URL render calls are posted to.
    pub fn render_url(&self) -> &Url {
        &self.render_url
    }

    /// Starts a render call for `url` with this service's timing.
    pub fn request(&self, url: &Url, method: HttpMethod) -> RenderRequest {
        RenderRequest {
            url: url.to_string(),
            http_method: method,
            body: None,
            cookies: Vec::new(),
            wait: self.wait,
            timeout: self.timeout,
            user_token: None,
        }
    }

    /// Performs a render call.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the service is unreachable, answers
    /// with a non-success status or sends a payload that does not decode.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderResponse, RenderError> {
        debug!(service = %self.render_url, cookies = request.cookies.len(), "Render call");

        let response = self
            .client
            .post(self.render_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RenderError::Service {
                status: status.as_u16(),
                message: text.chars().take(MAX_ERROR_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await?;
        let rendered: RenderResponse =
            serde_json::from_slice(&bytes).map_err(|e| RenderError::Decode(e.to_string()))?;

        debug!(
            status = rendered.http_status,
            cookies = rendered.cookies.len(),
            "Render call complete"
        );
        Ok(rendered)
    }
}

/// Resolves the render call URL under `endpoint`, keeping any base path.
fn render_url(endpoint: &str) -> Result<Url, RenderError> {
    let mut base = Url::parse(endpoint)
        .map_err(|e| RenderError::Endpoint(format!("{}: {}", endpoint, e)))?;

    if !matches!(base.scheme(), "http" | "https") {
        return Err(RenderError::Endpoint(format!(
            "{}: scheme must be http or https",
            endpoint
        )));
    }

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(RENDER_PATH)
        .map_err(|e| RenderError::Endpoint(format!("{}: {}", endpoint, e)))
}

// ============================================================================
// Tests
// ============================================================================
