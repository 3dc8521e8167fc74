//! Direct HTTP fetch strategy.
//!
//! Sends the request straight to the origin with `reqwest`. The cookie jar
//! is installed as the client's cookie provider, so `Set-Cookie` headers on
//! every hop (redirects included) land in the jar and later requests carry
//! them back.

use std::sync::Arc;

use async_trait::async_trait;
use pagefetch_core::{FORM_CONTENT_TYPE, FetchRequest, FetcherType, HttpMethod};
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{debug, instrument};
use url::Url;

use crate::classify::check_status;
use crate::context::FetchSettings;
use crate::cookies::{CookieJar, JarSlot};
use crate::error::FetchError;
use crate::hooks::DirectHooks;
use crate::host::HttpClient;
use crate::response::{Body, FetchResponse, ResponseHead};
use crate::strategy::Fetcher;

// ============================================================================
// Direct Fetcher
// ============================================================================

/// Fetches pages over plain HTTP.
#[derive(Debug)]
pub struct DirectFetcher {
    client: Client,
    jar: Arc<JarSlot>,
    hooks: DirectHooks,
}

impl DirectFetcher {
    /// Creates a fetcher with an empty cookie jar and no hooks.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        Self::with_hooks(settings, DirectHooks::default())
    }

    /// Creates a fetcher with an empty cookie jar and the given hooks.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be built.
    pub fn with_hooks(settings: &FetchSettings, hooks: DirectHooks) -> Result<Self, FetchError> {
        let jar = Arc::new(JarSlot::new(CookieJar::shared()));
        let client = HttpClient::builder(settings)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self { client, jar, hooks })
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The installed hooks.
    pub fn hooks(&self) -> &DirectHooks {
        &self.hooks
    }

    /// Builds the wire request for `request`.
    ///
    /// With form data the request is always a POST carrying the re-encoded
    /// form and explicit `Content-Type`/`Content-Length`. Without it, no body
    /// is sent.
    fn build_request(&self, request: &FetchRequest, url: Url) -> Result<reqwest::Request, FetchError> {
        let mut builder = match request.effective_method() {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };

        if request.has_form_data() {
            let body = request.form_data.encode();
            builder = builder
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .header(CONTENT_LENGTH, body.len())
                .body(body);
        }

        builder.build().map_err(|e| FetchError::BadRequest {
            url: request.url.clone(),
            reason: e.to_string(),
            status: None,
        })
    }
}

#[async_trait]
impl Fetcher for DirectFetcher {
    fn kind(&self) -> FetcherType {
        FetcherType::Direct
    }

    async fn prepare(&self) -> Result<(), FetchError> {
        let Some(hook) = &self.hooks.prepare_client else {
            return Ok(());
        };

        debug!("Running prepare_client hook");
        hook(self.client.clone())
            .await
            .map_err(|e| FetchError::hook("prepare_client", e))
    }

    #[instrument(skip(self, request), fields(url = %request.url, backend = "direct"))]
    async fn response(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let url = request.parsed_url()?;
        let method = request.effective_method();

        let mut wire = self.build_request(request, url)?;
        if let Some(hook) = &self.hooks.prepare_request {
            hook(&mut wire).map_err(|e| FetchError::hook("prepare_request", e))?;
        }
        let request_headers = wire.headers().clone();

        debug!(method = %method, "Sending request");
        let response = self
            .client
            .execute(wire)
            .await
            .map_err(|source| FetchError::Transport {
                url: request.url.clone(),
                source,
            })?;

        debug!(status = %response.status(), final_url = %response.url(), "Response received");
        check_status(response.status(), &request.url)?;

        let head = ResponseHead::from_response(&response);
        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: request.url.clone(),
                source,
            })?;

        let fetched = FetchResponse::new(head.clone(), Body::from(bytes), method, &request_headers);
        if let Some(hook) = &self.hooks.process_response {
            hook(&head).map_err(|e| FetchError::hook("process_response", e))?;
        }

        debug!(
            bytes = fetched.body().len(),
            cacheable = fetched.is_cacheable(),
            "Fetch complete"
        );
        Ok(fetched)
    }

    async fn close(&self) {
        debug!("Direct fetcher closed");
    }

    fn cookie_jar(&self) -> Arc<CookieJar> {
        self.jar.get()
    }

    fn set_cookie_jar(&self, jar: Arc<CookieJar>) {
        self.jar.replace(jar);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;

    fn fetcher() -> DirectFetcher {
        DirectFetcher::new(&FetchSettings::default()).unwrap()
    }

    fn build(request: &FetchRequest) -> reqwest::Request {
        let f = fetcher();
        let url = request.parsed_url().unwrap();
        f.build_request(request, url).unwrap()
    }

    #[test]
    fn test_form_request_shape() {
        let request = FetchRequest::new("http://example.com/login").with_form_data("user=a&pass=b");
        let wire = build(&request);

        assert_eq!(wire.method(), reqwest::Method::POST);
        assert_eq!(wire.headers()[CONTENT_TYPE], FORM_CONTENT_TYPE);
        assert_eq!(wire.headers()[CONTENT_LENGTH], "13");
        let body = wire.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(body, b"user=a&pass=b");
    }

    #[test]
    fn test_form_is_reencoded() {
        let request = FetchRequest::new("http://example.com/search").with_form_data("q=a%20b&x");
        let wire = build(&request);

        let body = wire.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(body, b"q=a+b&x=");
        assert_eq!(wire.headers()[CONTENT_LENGTH], "8");
    }

    #[test]
    fn test_get_has_no_body() {
        let wire = build(&FetchRequest::new("http://example.com/"));
        assert_eq!(wire.method(), reqwest::Method::GET);
        assert!(wire.body().is_none());
        assert!(wire.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_set_cookie_jar_swaps() {
        let f = fetcher();
        let jar = CookieJar::shared();
        f.set_cookie_jar(Arc::clone(&jar));
        assert!(Arc::ptr_eq(&f.cookie_jar(), &jar));
    }

    #[tokio::test]
    async fn test_prepare_without_hook() {
        assert!(fetcher().prepare().await.is_ok());
    }

    #[tokio::test]
    async fn test_prepare_hook_failure() {
        let hooks = DirectHooks::new()
            .prepare_client(|_client| async { Err::<(), HookError>("login failed".into()) });
        let f = DirectFetcher::with_hooks(&FetchSettings::default(), hooks).unwrap();

        let err = f.prepare().await.unwrap_err();
        assert!(matches!(err, FetchError::Hook { hook: "prepare_client", .. }));
    }

    #[tokio::test]
    async fn test_malformed_url_is_bad_request() {
        let err = fetcher()
            .response(&FetchRequest::new("not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::BadRequest { status: None, .. }));
    }
}
