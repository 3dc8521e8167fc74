//! Normalized fetch responses.
//!
//! Both strategies produce a [`FetchResponse`]: final URL, status, headers,
//! body, and the cache policy evaluated from those headers. The cache policy
//! is computed in the constructor, so a response never exists without it.

use std::borrow::Cow;
use std::io::Read;

use bytes::{Buf, Bytes};
use chrono::{DateTime, Utc};
use pagefetch_core::HttpMethod;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::cache::{CacheInfo, CacheReason};

// ============================================================================
// Body
// ============================================================================

/// The fetched document.
///
/// Owns the bytes outright; the connection it came from has already been
/// released by the time a caller sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body(Bytes);

impl Body {
    /// Returns the raw bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the body, returning the bytes.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Returns a reader over the body.
    pub fn reader(self) -> impl Read {
        self.0.reader()
    }

    /// Returns the body length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self(Bytes::from(text))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self(Bytes::from_static(text.as_bytes()))
    }
}

impl AsRef<[u8]> for Body {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// Response Head
// ============================================================================

/// Status line and headers of a transport response, without the body.
///
/// This is what the post-response hook sees.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    /// Final URL after redirects.
    pub url: String,
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
}

impl ResponseHead {
    /// Captures the head of a reqwest response.
    pub fn from_response(response: &reqwest::Response) -> Self {
        Self {
            url: response.url().to_string(),
            status: response.status(),
            headers: response.headers().clone(),
        }
    }
}

// ============================================================================
// Fetch Response
// ============================================================================

/// A successful fetch, normalized across backends.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    url: String,
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
    cache: CacheInfo,
}

impl FetchResponse {
    /// Builds a response and evaluates its cache policy.
    ///
    /// `method` and `request_headers` describe the request that was sent;
    /// they feed the cache evaluation alongside the response head.
    pub fn new(
        head: ResponseHead,
        body: Body,
        method: HttpMethod,
        request_headers: &HeaderMap,
    ) -> Self {
        let cache = CacheInfo::evaluate(
            method,
            head.status,
            request_headers,
            &head.headers,
            Utc::now(),
        );

        Self {
            url: head.url,
            status: head.status,
            headers: head.headers,
            body,
            cache,
        }
    }

    /// Final URL after all redirects.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Status line text, e.g. `200 OK`.
    pub fn status_text(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {}", self.status.as_u16(), reason),
            None => self.status.as_u16().to_string(),
        }
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The document.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Consumes the response, returning the document.
    pub fn into_body(self) -> Body {
        self.body
    }

    /// When the response stops being fresh, if it says.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.cache.expires
    }

    /// Reasons a shared cache must not keep this response.
    pub fn reasons_not_to_cache(&self) -> &[CacheReason] {
        &self.cache.reasons
    }

    /// The full cache evaluation.
    pub fn cache_info(&self) -> &CacheInfo {
        &self.cache
    }

    /// Returns true if nothing forbids caching.
    pub fn is_cacheable(&self) -> bool {
        self.cache.is_cacheable()
    }
}

// ============================================================================
// Tests
// ============================================================================
