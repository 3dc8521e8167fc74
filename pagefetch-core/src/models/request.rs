//! Fetch request types.
//!
//! - [`FetchRequest`] - A single page fetch
//! - [`HttpMethod`] - Request method
//! - [`FetcherType`] - Backend that serves the request

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use super::form::FormData;
use crate::error::CoreError;

// ============================================================================
// HTTP Method
// ============================================================================

/// Request method. Only the two a page fetch needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Plain document retrieval.
    #[default]
    Get,
    /// Form submission.
    Post,
}

impl HttpMethod {
    /// Returns the wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(CoreError::UnsupportedMethod(s.to_string())),
        }
    }
}

// ============================================================================
// Fetcher Type
// ============================================================================

/// The backend strategy that serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetcherType {
    /// Plain HTTP client; returns the document as served.
    #[default]
    Direct,
    /// Remote rendering service; returns the document after page scripts ran.
    Render,
}

impl FetcherType {
    /// Returns the display name for this type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Render => "Render",
        }
    }

    /// Returns the lowercase name used in config files and on the command line.
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Render => "render",
        }
    }

    /// Returns all fetcher types.
    pub fn all() -> &'static [FetcherType] {
        &[Self::Direct, Self::Render]
    }
}

impl fmt::Display for FetcherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for FetcherType {
    type Err = CoreError;

    /// Accepts `direct`/`base` and `render`/`splash`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "base" => Ok(Self::Direct),
            "render" | "splash" => Ok(Self::Render),
            _ => Err(CoreError::UnsupportedType(s.to_string())),
        }
    }
}

// ============================================================================
// Fetch Request
// ============================================================================

/// A single page fetch.
///
/// A non-empty `form_data` always turns the request into a POST, whatever
/// `method` says; see [`FetchRequest::effective_method`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Target URL.
    pub url: String,
    /// Requested method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Form payload, empty for plain retrieval.
    #[serde(default, skip_serializing_if = "FormData::is_empty")]
    pub form_data: FormData,
    /// Backend that must serve this request.
    #[serde(default, rename = "type")]
    pub fetcher_type: FetcherType,
    /// Opaque token identifying the caller, forwarded to the rendering service.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_token: String,
}

impl FetchRequest {
    /// Creates a GET request served by the direct backend.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            form_data: FormData::new(),
            fetcher_type: FetcherType::Direct,
            user_token: String::new(),
        }
    }

    /// Sets the requested method.
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the form payload.
    pub fn with_form_data(mut self, form_data: impl Into<FormData>) -> Self {
        self.form_data = form_data.into();
        self
    }

    /// Sets the backend.
    pub fn with_fetcher_type(mut self, fetcher_type: FetcherType) -> Self {
        self.fetcher_type = fetcher_type;
        self
    }

    /// Sets the caller token.
    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        self.user_token = token.into();
        self
    }

    /// Returns true if the request carries a form payload.
    pub fn has_form_data(&self) -> bool {
        !self.form_data.is_empty()
    }

    /// The method that goes on the wire: POST whenever there is form data.
    pub fn effective_method(&self) -> HttpMethod {
        if self.has_form_data() {
            HttpMethod::Post
        } else {
            self.method
        }
    }

    /// Parses and validates the target URL.
    ///
    /// Only absolute `http`/`https` URLs with a host are accepted.
    pub fn parsed_url(&self) -> Result<Url, CoreError> {
        let raw = self.url.trim();
        let url = Url::parse(raw).map_err(|e| CoreError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(CoreError::InvalidUrl {
                url: self.url.clone(),
                reason: "missing host".to_string(),
            });
        }

        Ok(url)
    }

    /// Returns the host of the target URL.
    pub fn host(&self) -> Result<String, CoreError> {
        let url = self.parsed_url()?;
        // parsed_url guarantees a host
        Ok(url.host_str().unwrap_or_default().to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_data_forces_post() {
        let req = FetchRequest::new("http://example.com/login").with_form_data("user=a&pass=b");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.effective_method(), HttpMethod::Post);
    }

    #[test]
    fn test_no_form_data_keeps_method() {
        let req = FetchRequest::new("http://example.com/").with_method(HttpMethod::Post);
        assert_eq!(req.effective_method(), HttpMethod::Post);

        let req = FetchRequest::new("http://example.com/");
        assert_eq!(req.effective_method(), HttpMethod::Get);
    }

    #[test]
    fn test_parsed_url_rejects_garbage() {
        let req = FetchRequest::new("not a url");
        assert!(matches!(req.parsed_url(), Err(CoreError::InvalidUrl { .. })));

        let req = FetchRequest::new("ftp://example.com/file");
        assert!(req.parsed_url().is_err());
    }

    #[test]
    fn test_parsed_url_trims_whitespace() {
        let req = FetchRequest::new("  https://example.com/a  ");
        assert_eq!(req.parsed_url().unwrap().as_str(), "https://example.com/a");
        assert_eq!(req.host().unwrap(), "example.com");
    }

    #[test]
    fn test_fetcher_type_from_str() {
        assert_eq!("direct".parse::<FetcherType>().unwrap(), FetcherType::Direct);
        assert_eq!("Base".parse::<FetcherType>().unwrap(), FetcherType::Direct);
        assert_eq!("SPLASH".parse::<FetcherType>().unwrap(), FetcherType::Render);
        assert!(matches!(
            "chrome".parse::<FetcherType>(),
            Err(CoreError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert!("DELETE".parse::<HttpMethod>().is_err());
    }
}
