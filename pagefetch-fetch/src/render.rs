//! Rendering-service fetch strategy.
//!
//! Hands the page to a remote rendering service that loads it in a browser
//! and runs its scripts. Cookies travel explicitly: the jar's cookies for
//! the target host go out with the call, and the cookies the service reports
//! come back into the jar.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use pagefetch_core::{FetchRequest, FetcherType};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use tracing::{debug, instrument};

use crate::classify::check_status;
use crate::context::FetchSettings;
use crate::cookies::CookieJar;
use crate::error::{FetchError, RenderError};
use crate::hooks::RenderHooks;
use crate::host::{HttpClient, RenderService};
use crate::response::{Body, FetchResponse, ResponseHead};
use crate::strategy::Fetcher;

// ============================================================================
// Render Fetcher
// ============================================================================

/// Fetches pages through a rendering service.
#[derive(Debug)]
pub struct RenderFetcher {
    service: RenderService,
    jar: RwLock<Arc<CookieJar>>,
    hooks: RenderHooks,
}

impl RenderFetcher {
    /// Creates a fetcher for the service at `settings.render_endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Render`] if the endpoint is not a usable URL, or
    /// [`FetchError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        Self::with_hooks(settings, RenderHooks::default())
    }

    /// Creates a fetcher with the given hooks.
    ///
    /// # Errors
    ///
    /// Same as [`RenderFetcher::new`].
    pub fn with_hooks(settings: &FetchSettings, hooks: RenderHooks) -> Result<Self, FetchError> {
        // The service itself may take render_timeout + wait before answering.
        let service_time =
            Duration::try_from_secs_f64(settings.render_timeout + settings.render_wait)
                .unwrap_or_default();
        let client_settings = settings
            .clone()
            .with_timeout(settings.timeout.saturating_add(service_time));
        let client = HttpClient::builder(&client_settings).build()?;

        let service = RenderService::new(
            client,
            &settings.render_endpoint,
            settings.render_wait,
            settings.render_timeout,
        )?;
        debug!(endpoint = %service.render_url(), "Render fetcher created");

        Ok(Self {
            service,
            jar: RwLock::new(CookieJar::shared()),
            hooks,
        })
    }

    /// The service connection.
    pub fn service(&self) -> &RenderService {
        &self.service
    }

    /// The installed hooks.
    pub fn hooks(&self) -> &RenderHooks {
        &self.hooks
    }
}

#[async_trait]
impl Fetcher for RenderFetcher {
    fn kind(&self) -> FetcherType {
        FetcherType::Render
    }

    async fn prepare(&self) -> Result<(), FetchError> {
        let Some(hook) = &self.hooks.prepare else {
            return Ok(());
        };

        debug!("Running prepare hook");
        hook().await.map_err(|e| FetchError::hook("prepare", e))
    }

    #[instrument(skip(self, request), fields(url = %request.url, backend = "render"))]
    async fn response(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let url = request.parsed_url()?;
        let method = request.effective_method();
        let jar = self.cookie_jar();

        let mut call = self.service.request(&url, method);
        call.cookies = jar.cookies_for(&url);
        if request.has_form_data() {
            call.body = Some(request.form_data.encode());
        }
        if !request.user_token.is_empty() {
            call.user_token = Some(request.user_token.clone());
        }
        if let Some(hook) = &self.hooks.prepare_request {
            hook(&mut call).map_err(|e| FetchError::hook("prepare_request", e))?;
        }

        let rendered = self.service.render(&call).await?;
        jar.merge(&url, &rendered.cookies);

        let status = StatusCode::from_u16(rendered.http_status).map_err(|_| {
            RenderError::Decode(format!("invalid http_status {}", rendered.http_status))
        })?;
        check_status(status, &request.url)?;

        let headers = rendered.header_map();
        let final_url = if rendered.url.is_empty() {
            url.to_string()
        } else {
            rendered.url
        };
        let head = ResponseHead {
            url: final_url,
            status,
            headers,
        };

        // The page request is the service's; none of ours reach the origin.
        let fetched = FetchResponse::new(head, Body::from(rendered.html), method, &HeaderMap::new());
        debug!(
            bytes = fetched.body().len(),
            cacheable = fetched.is_cacheable(),
            "Render complete"
        );
        Ok(fetched)
    }

    async fn close(&self) {
        debug!("Render fetcher closed");
    }

    fn cookie_jar(&self) -> Arc<CookieJar> {
        Arc::clone(&self.jar.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn set_cookie_jar(&self, jar: Arc<CookieJar>) {
        *self.jar.write().unwrap_or_else(PoisonError::into_inner) = jar;
    }
}

// ============================================================================
// Tests
// ============================================================================
