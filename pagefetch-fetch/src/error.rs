//! Fetch error types.
//!
//! [`FetchError`] is the closed taxonomy every strategy reports; callers
//! branch on [`FetchError::kind`] rather than on message text.

use std::fmt;

use pagefetch_core::CoreError;
use thiserror::Error;

/// Error returned by customization hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Malformed request URL, or the server answered 400.
    #[error("Bad request for {url}: {reason}")]
    BadRequest {
        /// The requested URL.
        url: String,
        /// What was wrong.
        reason: String,
        /// HTTP status, when the server produced one.
        status: Option<u16>,
    },

    /// Server answered 401.
    #[error("Unauthorized: {url}")]
    Unauthorized {
        /// The requested URL.
        url: String,
    },

    /// Server answered 403.
    #[error("Forbidden: {url}")]
    Forbidden {
        /// The requested URL.
        url: String,
    },

    /// Server answered 404.
    #[error("Not found: {url}")]
    NotFound {
        /// The requested URL.
        url: String,
    },

    /// Server answered 500.
    #[error("Internal server error: {url}")]
    InternalServerError {
        /// The requested URL.
        url: String,
    },

    /// Server answered 504.
    #[error("Gateway timeout: {url}")]
    GatewayTimeout {
        /// The requested URL.
        url: String,
    },

    /// Any other non-200 status.
    #[error("Unexpected status {status} for {url}")]
    Unknown {
        /// The requested URL.
        url: String,
        /// The status the server returned.
        status: u16,
    },

    /// The request never got a status: DNS, connect, TLS, timeout, or a
    /// body that broke off mid-read.
    #[error("Transport error for {url}: {source}")]
    Transport {
        /// The requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// A customization hook rejected the operation.
    #[error("Hook '{hook}' failed: {source}")]
    Hook {
        /// Hook slot name.
        hook: &'static str,
        /// Error returned by the hook.
        #[source]
        source: HookError,
    },

    /// The rendering service call failed.
    #[error("Render service error: {0}")]
    Render(#[from] RenderError),

    /// Fetcher type name not recognized.
    #[error("Unsupported fetcher type: {0}")]
    UnsupportedType(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl FetchError {
    /// Returns the semantic kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InternalServerError { .. } => ErrorKind::InternalServerError,
            Self::GatewayTimeout { .. } => ErrorKind::GatewayTimeout,
            Self::Unknown { .. } => ErrorKind::Unknown,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Hook { .. } => ErrorKind::Hook,
            Self::Render(_) => ErrorKind::Render,
            Self::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Self::ClientBuild(_) => ErrorKind::ClientBuild,
        }
    }

    /// Returns the offending URL, if the error concerns one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::BadRequest { url, .. }
            | Self::Unauthorized { url }
            | Self::Forbidden { url }
            | Self::NotFound { url }
            | Self::InternalServerError { url }
            | Self::GatewayTimeout { url }
            | Self::Unknown { url, .. }
            | Self::Transport { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Returns the HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { status, .. } => *status,
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::InternalServerError { .. } => Some(500),
            Self::GatewayTimeout { .. } => Some(504),
            Self::Unknown { status, .. } => Some(*status),
            Self::Render(RenderError::Service { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Creates a hook failure for the named slot.
    pub fn hook(hook: &'static str, source: HookError) -> Self {
        Self::Hook { hook, source }
    }

    /// Creates a bad-request error for a URL that failed validation.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadRequest {
            url: url.into(),
            reason: reason.into(),
            status: None,
        }
    }
}

impl From<CoreError> for FetchError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedType(name) => Self::UnsupportedType(name),
            CoreError::InvalidUrl { url, reason } => Self::invalid_url(url, reason),
            CoreError::UnsupportedMethod(method) => Self::BadRequest {
                url: String::new(),
                reason: format!("Unsupported method: {method}"),
                status: None,
            },
        }
    }
}

// ============================================================================
// Error Kind
// ============================================================================

/// The closed set of fetch failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or HTTP 400.
    BadRequest,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// HTTP 500.
    InternalServerError,
    /// HTTP 504.
    GatewayTimeout,
    /// Other non-200 status.
    Unknown,
    /// No status was received.
    Transport,
    /// A hook failed.
    Hook,
    /// The rendering service failed.
    Render,
    /// Unknown fetcher type.
    UnsupportedType,
    /// HTTP client construction failed.
    ClientBuild,
}

impl ErrorKind {
    /// Returns a stable identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::InternalServerError => "internal_server_error",
            Self::GatewayTimeout => "gateway_timeout",
            Self::Unknown => "unknown",
            Self::Transport => "transport",
            Self::Hook => "hook",
            Self::Render => "render",
            Self::UnsupportedType => "unsupported_type",
            Self::ClientBuild => "client_build",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Render Error
// ============================================================================

/// Error talking to the rendering service.
///
/// These are the service's own failures, reported as-is; the status of the
/// rendered page goes through the regular classifier instead.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The service could not be reached or the exchange broke off.
    #[error("Render service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Render service returned HTTP {status}: {message}")]
    Service {
        /// Service status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },

    /// The service answered but the payload was not understood.
    #[error("Invalid render service response: {0}")]
    Decode(String),

    /// The configured endpoint is not a usable URL.
    #[error("Invalid render endpoint: {0}")]
    Endpoint(String),
}

// ============================================================================
// Tests
// ============================================================================
