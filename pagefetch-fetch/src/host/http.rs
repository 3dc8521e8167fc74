//! HTTP client construction.
//!
//! Both strategies talk HTTP through a [`reqwest::Client`] built here, so
//! timeouts, redirects and the user agent come from one place.

use std::sync::Arc;

use reqwest::{Client, ClientBuilder, redirect};
use tracing::debug;

use crate::context::FetchSettings;
use crate::error::FetchError;

// ============================================================================
// HTTP Client
// ============================================================================

/// Builder for the shared [`reqwest::Client`].
#[derive(Debug)]
pub struct HttpClient<'a> {
    settings: &'a FetchSettings,
    inner: ClientBuilder,
}

impl<'a> HttpClient<'a> {
    /// Starts a client configured from `settings`.
    pub fn builder(settings: &'a FetchSettings) -> Self {
        let inner = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.as_str());

        Self { settings, inner }
    }

    /// Attaches a cookie provider the client reads and writes on every request.
    pub fn cookie_provider<C>(mut self, store: Arc<C>) -> Self
    where
        C: reqwest::cookie::CookieStore + 'static,
    {
        self.inner = self.inner.cookie_provider(store);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the TLS backend cannot be
    /// initialised.
    pub fn build(self) -> Result<Client, FetchError> {
        let policy = if self.settings.max_redirects > 0 {
            redirect::Policy::limited(self.settings.max_redirects)
        } else {
            redirect::Policy::none()
        };

        let client = self
            .inner
            .redirect(policy)
            .build()
            .map_err(FetchError::ClientBuild)?;
        debug!(
            timeout = ?self.settings.timeout,
            max_redirects = self.settings.max_redirects,
            "HTTP client built"
        );
        Ok(client)
    }
}

// ============================================================================
// Tests
// ============================================================================
