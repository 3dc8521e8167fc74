//! The fetcher trait shared by both backends.
//!
//! A fetcher is one backend strategy bound to one cookie session. Callers
//! pick the backend once, through the [`FetcherFactory`](crate::FetcherFactory),
//! and then use the same calls whichever it is.

use std::sync::Arc;

use async_trait::async_trait;
use pagefetch_core::{FetchRequest, FetcherType};

use crate::cookies::CookieJar;
use crate::error::FetchError;
use crate::response::{Body, FetchResponse};

// ============================================================================
// Fetcher Trait
// ============================================================================

/// A backend strategy for fetching pages.
///
/// ## Concurrency
///
/// Fetchers are `Send + Sync` and calls may overlap; the HTTP client and
/// the [`CookieJar`] are both safe to share. Cookie updates from one call
/// are visible to calls that start after it returns. Overlapping calls see
/// each other's cookies in no particular order.
///
/// ## Session
///
/// [`prepare`](Fetcher::prepare) runs once-per-session setup and is meant
/// to be called before the first fetch. It is not enforced: fetching
/// without it just skips the setup.
///
/// ```ignore
/// let fetcher = new_fetcher(FetcherType::Direct)?;
/// fetcher.prepare().await?;
/// let page = fetcher.response(&FetchRequest::new("https://example.com/")).await?;
/// println!("{} {}", page.status_text(), page.body().text());
/// fetcher.close().await;
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// The backend this fetcher implements.
    fn kind(&self) -> FetcherType;

    /// Runs the session preparation hook, if any.
    async fn prepare(&self) -> Result<(), FetchError>;

    /// Fetches `request` and returns the full response.
    ///
    /// Only a 200 produces a response; every other status is reported as
    /// the matching [`FetchError`].
    async fn response(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError>;

    /// Fetches `request` and returns just the body.
    async fn fetch(&self, request: &FetchRequest) -> Result<Body, FetchError> {
        self.response(request).await.map(FetchResponse::into_body)
    }

    /// Releases anything the fetcher holds. Safe to call repeatedly.
    async fn close(&self);

    /// Returns the cookie jar in use.
    fn cookie_jar(&self) -> Arc<CookieJar>;

    /// Replaces the cookie jar for subsequent requests.
    fn set_cookie_jar(&self, jar: Arc<CookieJar>);
}
