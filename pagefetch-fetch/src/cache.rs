//! Cache-policy evaluation.
//!
//! Computes, from a request/response pair, when the response goes stale and
//! why a shared cache must not keep it. Freshness and storability come from
//! [`http_cache_semantics`] in shared-cache mode; this module names the
//! reasons. [`CacheInfo::evaluate`] is a pure function of its inputs: the
//! clock is passed in.

use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};
use http_cache_semantics::{CacheOptions, CachePolicy};
use pagefetch_core::HttpMethod;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// Cache Reason
// ============================================================================

/// Why a response must not be served from a shared cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheReason {
    /// The request was a POST.
    RequestMethodPost,
    /// The request carried `Cache-Control: no-store`.
    RequestNoStore,
    /// The request was authenticated and the response did not opt in.
    RequestAuthorizationHeader,
    /// The response carried `Cache-Control: no-store`.
    ResponseNoStore,
    /// The response carried `Cache-Control: private`.
    ResponsePrivate,
    /// The status is not cacheable without explicit freshness.
    ResponseUncachableByDefault,
}

impl CacheReason {
    /// Returns a stable short code for this reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequestMethodPost => "request-method-post",
            Self::RequestNoStore => "request-no-store",
            Self::RequestAuthorizationHeader => "request-authorization",
            Self::ResponseNoStore => "no-store",
            Self::ResponsePrivate => "private",
            Self::ResponseUncachableByDefault => "uncachable-by-default",
        }
    }
}

impl fmt::Display for CacheReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Directives
// ============================================================================

/// The `Cache-Control` directives that name a reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Directives {
    no_store: bool,
    private: bool,
    public: bool,
    must_revalidate: bool,
    s_maxage: bool,
}

impl Directives {
    fn parse(headers: &HeaderMap) -> Self {
        let mut directives = Self::default();

        for value in headers.get_all(CACHE_CONTROL) {
            let Ok(value) = value.to_str() else {
                warn!("Ignoring non-ASCII Cache-Control header");
                continue;
            };

            for token in value.split(',') {
                let name = token.split('=').next().unwrap_or_default().trim();
                match name.to_ascii_lowercase().as_str() {
                    "no-store" => directives.no_store = true,
                    "private" => directives.private = true,
                    "public" => directives.public = true,
                    "must-revalidate" => directives.must_revalidate = true,
                    "s-maxage" => directives.s_maxage = true,
                    _ => {}
                }
            }
        }

        directives
    }
}

// ============================================================================
// Cache Info
// ============================================================================

/// Freshness and storability of one response.
///
/// An empty `reasons` list means the response is cacheable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheInfo {
    /// When the response stops being fresh, if it says.
    pub expires: Option<DateTime<Utc>>,
    /// Reasons not to cache, in evaluation order.
    pub reasons: Vec<CacheReason>,
}

impl CacheInfo {
    /// Evaluates the cache policy of a response received at `now`.
    ///
    /// `expires` is set only while the response is still fresh; a response
    /// that is stale on arrival or not storable has none.
    pub fn evaluate(
        method: HttpMethod,
        status: StatusCode,
        request_headers: &HeaderMap,
        response_headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Self {
        let policy = Self::policy(method, status, request_headers, response_headers, now);
        let req = Directives::parse(request_headers);
        let resp = Directives::parse(response_headers);

        let mut reasons = Vec::new();

        if method == HttpMethod::Post {
            reasons.push(CacheReason::RequestMethodPost);
        }
        if req.no_store {
            reasons.push(CacheReason::RequestNoStore);
        }
        if request_headers.contains_key(AUTHORIZATION)
            && !(resp.public || resp.must_revalidate || resp.s_maxage)
        {
            reasons.push(CacheReason::RequestAuthorizationHeader);
        }
        if resp.no_store {
            reasons.push(CacheReason::ResponseNoStore);
        }
        if resp.private {
            reasons.push(CacheReason::ResponsePrivate);
        }
        if reasons.is_empty() && !policy.is_storable() {
            reasons.push(CacheReason::ResponseUncachableByDefault);
        }

        let ttl = policy.time_to_live(SystemTime::from(now));
        let expires = if policy.is_storable() && !ttl.is_zero() {
            Duration::from_std(ttl)
                .ok()
                .and_then(|ttl| now.checked_add_signed(ttl))
        } else {
            None
        };

        Self { expires, reasons }
    }

    fn policy(
        method: HttpMethod,
        status: StatusCode,
        request_headers: &HeaderMap,
        response_headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> CachePolicy {
        let mut request = http::Request::new(());
        *request.method_mut() = match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
        };
        *request.headers_mut() = request_headers.clone();

        let mut response = http::Response::new(());
        *response.status_mut() = status;
        *response.headers_mut() = response_headers.clone();

        let options = CacheOptions {
            shared: true,
            ..CacheOptions::default()
        };
        CachePolicy::new_options(&request, &response, SystemTime::from(now), options)
    }

    /// Returns true if nothing forbids caching.
    pub fn is_cacheable(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Returns true if `reason` is among the reasons.
    pub fn has_reason(&self, reason: CacheReason) -> bool {
        self.reasons.contains(&reason)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap()
    }

    fn eval(method: HttpMethod, status: u16, req: &HeaderMap, resp: &HeaderMap) -> CacheInfo {
        let status = StatusCode::from_u16(status).unwrap();
        CacheInfo::evaluate(method, status, req, resp, now())
    }

    fn expires_for(value: &'static str) -> Option<DateTime<Utc>> {
        let resp = headers(&[("expires", value)]);
        eval(HttpMethod::Get, 200, &HeaderMap::new(), &resp).expires
    }

    #[test]
    fn test_no_store() {
        let resp = headers(&[("cache-control", "no-store, max-age=60")]);
        let info = eval(HttpMethod::Get, 200, &HeaderMap::new(), &resp);

        assert_eq!(info.reasons, vec![CacheReason::ResponseNoStore]);
        assert_eq!(info.reasons[0].code(), "no-store");
        assert!(info.expires.is_none());
    }

    #[test]
    fn test_plain_ok_is_cacheable() {
        let info = eval(HttpMethod::Get, 200, &HeaderMap::new(), &HeaderMap::new());
        assert!(info.is_cacheable());
        assert!(info.expires.is_none());
    }

    #[test]
    fn test_max_age() {
        let resp = headers(&[
            ("date", "Wed, 21 Oct 2015 07:28:00 GMT"),
            ("cache-control", "public, max-age=3600"),
        ]);
        let info = eval(HttpMethod::Get, 200, &HeaderMap::new(), &resp);

        assert_eq!(
            info.expires,
            Some(Utc.with_ymd_and_hms(2015, 10, 21, 8, 28, 0).unwrap())
        );
        assert!(info.is_cacheable());
    }

    #[test]
    fn test_s_maxage_wins_over_max_age() {
        let resp = headers(&[("cache-control", "max-age=10, s-maxage=100")]);
        let info = eval(HttpMethod::Get, 200, &HeaderMap::new(), &resp);
        assert_eq!(info.expires, Some(now() + Duration::seconds(100)));
    }

    #[test]
    fn test_expires_accepts_every_http_date_form() {
        let expected = Some(Utc.with_ymd_and_hms(2015, 10, 22, 7, 28, 0).unwrap());

        assert_eq!(expires_for("Thu, 22 Oct 2015 07:28:00 GMT"), expected);
        assert_eq!(expires_for("Thursday, 22-Oct-15 07:28:00 GMT"), expected);
        assert_eq!(expires_for("Thu Oct 22 07:28:00 2015"), expected);
    }

    #[test]
    fn test_past_or_invalid_expires_is_stale() {
        assert_eq!(expires_for("0"), None);
        assert_eq!(expires_for("Tue, 20 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_last_modified_heuristic() {
        let resp = headers(&[
            ("date", "Wed, 21 Oct 2015 07:28:00 GMT"),
            ("last-modified", "Sun, 11 Oct 2015 07:28:00 GMT"),
        ]);
        let info = eval(HttpMethod::Get, 200, &HeaderMap::new(), &resp);

        let drift = info.expires.unwrap() - (now() + Duration::days(1));
        assert!(drift.num_seconds().abs() <= 1, "drift {drift}");
    }

    #[test]
    fn test_last_modified_in_asctime_form() {
        let resp = headers(&[
            ("date", "Wednesday, 21-Oct-15 07:28:00 GMT"),
            ("last-modified", "Sun Oct 11 07:28:00 2015"),
        ]);
        let info = eval(HttpMethod::Get, 200, &HeaderMap::new(), &resp);
        assert!(info.expires.is_some_and(|at| at > now()));
    }

    #[test]
    fn test_post_and_private() {
        let resp = headers(&[("cache-control", "private")]);
        let info = eval(HttpMethod::Post, 200, &HeaderMap::new(), &resp);
        assert_eq!(
            info.reasons,
            vec![CacheReason::RequestMethodPost, CacheReason::ResponsePrivate]
        );
        assert!(info.expires.is_none());
    }

    #[test]
    fn test_authorization_requires_opt_in() {
        let req = headers(&[("authorization", "Bearer t")]);
        let info = eval(HttpMethod::Get, 200, &req, &HeaderMap::new());
        assert!(info.has_reason(CacheReason::RequestAuthorizationHeader));

        let resp = headers(&[("cache-control", "must-revalidate")]);
        let info = eval(HttpMethod::Get, 200, &req, &resp);
        assert!(!info.has_reason(CacheReason::RequestAuthorizationHeader));
    }

    #[test]
    fn test_request_no_store() {
        let req = headers(&[("cache-control", "no-store")]);
        let info = eval(HttpMethod::Get, 200, &req, &HeaderMap::new());
        assert_eq!(info.reasons, vec![CacheReason::RequestNoStore]);
    }

    #[test]
    fn test_uncachable_status() {
        let info = eval(HttpMethod::Get, 302, &HeaderMap::new(), &HeaderMap::new());
        assert_eq!(info.reasons, vec![CacheReason::ResponseUncachableByDefault]);

        let resp = headers(&[("cache-control", "max-age=5")]);
        let info = eval(HttpMethod::Get, 302, &HeaderMap::new(), &resp);
        assert!(info.is_cacheable());
    }

    #[test]
    fn test_malformed_max_age_gives_no_expiry() {
        let resp = headers(&[("cache-control", "max-age=soon")]);
        let info = eval(HttpMethod::Get, 200, &HeaderMap::new(), &resp);
        assert!(info.expires.is_none());
    }

    #[test]
    fn test_evaluation_is_pure() {
        let req = headers(&[("authorization", "Basic x")]);
        let resp = headers(&[
            ("cache-control", "private, max-age=30"),
            ("date", "Wed, 21 Oct 2015 07:00:00 GMT"),
        ]);
        let first = eval(HttpMethod::Post, 200, &req, &resp);
        let second = eval(HttpMethod::Post, 200, &req, &resp);
        assert_eq!(first, second);
    }
}
