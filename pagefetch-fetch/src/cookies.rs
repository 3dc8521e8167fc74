//! Session cookie store shared by both strategies.
//!
//! A [`CookieJar`] holds every cookie a fetcher has seen, keyed by domain
//! and path. The direct strategy plugs it into its HTTP client so cookies
//! flow on every hop, redirects included; the render strategy reads and
//! merges it explicitly around each service call.
//!
//! The jar is internally locked and can be shared across fetchers as an
//! `Arc<CookieJar>`. Each mutation is atomic on its own, but there is no
//! ordering between concurrent fetches through different fetchers.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use cookie_store::{CookieDomain, CookieExpiration, CookieStore, RawCookie};
use reqwest::cookie::CookieStore as HttpCookieStore;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, trace, warn};
use url::Url;

// ============================================================================
// Cookie
// ============================================================================

/// A cookie as exchanged with the rendering service and handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie belongs to.
    ///
    /// Empty, or the request host itself, makes a host-only cookie. A leading
    /// dot, or any other domain, makes a domain cookie sent to subdomains too.
    #[serde(default)]
    pub domain: String,
    /// Path the cookie is valid for.
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiration time; `None` for session cookies.
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    /// Whether the cookie requires HTTPS.
    #[serde(default)]
    pub secure: bool,
    /// Whether the cookie is HTTP-only.
    #[serde(default)]
    pub http_only: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl Cookie {
    /// Creates a session cookie valid for the whole site.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: default_path(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Builds the store's cookie for one received while loading `url`.
    fn to_raw(&self, url: &Url) -> RawCookie<'static> {
        let mut builder = RawCookie::build((self.name.clone(), self.value.clone()))
            .secure(self.secure)
            .http_only(self.http_only);
        if !self.path.is_empty() {
            builder = builder.path(self.path.clone());
        }
        if let Some(domain) = self.domain_attribute(url) {
            builder = builder.domain(domain.to_string());
        }
        if let Some(at) = self
            .expires
            .and_then(|at| at.timestamp_nanos_opt())
            .and_then(|nanos| OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos)).ok())
        {
            builder = builder.expires(at);
        }
        builder.build()
    }

    fn domain_attribute(&self, url: &Url) -> Option<&str> {
        if self.domain.is_empty() {
            return None;
        }
        match self.domain.strip_prefix('.') {
            Some(suffix) => Some(suffix),
            None if url
                .host_str()
                .is_some_and(|host| host.eq_ignore_ascii_case(&self.domain)) =>
            {
                None
            }
            None => Some(&self.domain),
        }
    }

    fn from_stored(stored: &cookie_store::Cookie<'_>) -> Self {
        let domain = match &stored.domain {
            CookieDomain::HostOnly(d) => d.clone(),
            CookieDomain::Suffix(d) => format!(".{d}"),
            CookieDomain::NotPresent | CookieDomain::Empty => String::new(),
        };
        let expires = match &stored.expires {
            CookieExpiration::AtUtc(at) => {
                DateTime::from_timestamp(at.unix_timestamp(), at.nanosecond())
            }
            CookieExpiration::SessionEnd => None,
        };

        Self {
            name: stored.name().to_string(),
            value: stored.value().to_string(),
            domain,
            path: String::from(&stored.path),
            expires,
            secure: stored.secure().unwrap_or(false),
            http_only: stored.http_only().unwrap_or(false),
        }
    }
}

fn is_removal(raw: &RawCookie<'_>) -> bool {
    let now = Utc::now().timestamp();
    raw.max_age().is_some_and(|age| age.whole_seconds() <= 0)
        || raw
            .expires_datetime()
            .is_some_and(|at| at.unix_timestamp() <= now)
}

fn insert(store: &mut CookieStore, raw: &RawCookie<'_>, url: &Url) -> bool {
    match store.insert_raw(raw, url) {
        Ok(_) => true,
        // An already-expired cookie is how servers delete one.
        Err(_) if is_removal(raw) => {
            trace!(url = %url, cookie = %raw.name(), "Cookie removed");
            false
        }
        Err(e) => {
            warn!(url = %url, cookie = %raw.name(), error = %e, "Cookie rejected");
            false
        }
    }
}

// ============================================================================
// Cookie Jar
// ============================================================================

/// Thread-safe cookie store for one fetch session.
#[derive(Debug, Default)]
pub struct CookieJar {
    store: RwLock<CookieStore>,
}

impl CookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty jar ready to share.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> RwLockReadGuard<'_, CookieStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CookieStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns every unexpired cookie.
    pub fn all(&self) -> Vec<Cookie> {
        self.read().iter_unexpired().map(Cookie::from_stored).collect()
    }

    /// Returns every unexpired cookie a request to `url` would carry.
    pub fn cookies_for(&self, url: &Url) -> Vec<Cookie> {
        self.read()
            .iter_unexpired()
            .filter(|c| c.matches(url))
            .map(Cookie::from_stored)
            .collect()
    }

    /// Returns the `Cookie` header a request to `url` would carry.
    pub fn header_value(&self, url: &Url) -> Option<String> {
        let store = self.read();
        let header = store
            .get_request_values(url)
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        (!header.is_empty()).then_some(header)
    }

    /// Stores the cookies from raw `Set-Cookie` header values received for `url`.
    pub fn store_set_cookie_headers<'a, I>(&self, url: &Url, headers: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut store = self.write();
        let mut stored = 0;
        for header in headers {
            match RawCookie::parse(header.to_string()) {
                Ok(raw) => stored += usize::from(insert(&mut store, &raw, url)),
                Err(e) => warn!(url = %url, error = %e, "Unparsable Set-Cookie header"),
            }
        }
        trace!(url = %url, stored, "Stored response cookies");
        stored
    }

    /// Merges structured cookies set while loading `url`.
    ///
    /// Existing cookies with the same domain, path and name are replaced;
    /// everything else is kept.
    pub fn merge(&self, url: &Url, cookies: &[Cookie]) -> usize {
        let mut store = self.write();
        let stored = cookies
            .iter()
            .filter(|cookie| insert(&mut store, &cookie.to_raw(url), url))
            .count();
        drop(store);
        debug!(url = %url, received = cookies.len(), stored, "Merged cookies");
        stored
    }

    /// Returns the number of unexpired cookies.
    pub fn len(&self) -> usize {
        self.read().iter_unexpired().count()
    }

    /// Returns true if the jar holds no unexpired cookies.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HttpCookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let headers: Vec<&str> = cookie_headers.filter_map(|v| v.to_str().ok()).collect();
        self.store_set_cookie_headers(url, headers);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.header_value(url)
            .and_then(|h| HeaderValue::from_str(&h).ok())
    }
}

// ============================================================================
// Jar Slot
// ============================================================================

/// Cookie provider installed in the direct strategy's client.
///
/// The client is built once, so it holds this slot rather than a jar; the
/// jar inside can be swapped between requests. A request that already
/// started keeps talking to the jar it read.
#[derive(Debug)]
pub(crate) struct JarSlot {
    current: RwLock<Arc<CookieJar>>,
}

impl JarSlot {
    pub(crate) fn new(jar: Arc<CookieJar>) -> Self {
        Self {
            current: RwLock::new(jar),
        }
    }

    pub(crate) fn get(&self) -> Arc<CookieJar> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn replace(&self, jar: Arc<CookieJar>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = jar;
    }
}

impl HttpCookieStore for JarSlot {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.get().set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.get().cookies(url)
    }
}

// ============================================================================
// Tests
// ============================================================================
