//! Fetcher construction.

use tracing::debug;

use pagefetch_core::FetcherType;

use crate::context::FetchSettings;
use crate::direct::DirectFetcher;
use crate::error::FetchError;
use crate::hooks::{DirectHooks, RenderHooks};
use crate::render::RenderFetcher;
use crate::strategy::Fetcher;

/// Creates fetchers from shared settings.
///
/// Every fetcher it creates starts with its own empty cookie jar.
#[derive(Debug, Clone, Default)]
pub struct FetcherFactory {
    settings: FetchSettings,
    direct_hooks: DirectHooks,
    render_hooks: RenderHooks,
}

impl FetcherFactory {
    /// Creates a factory using `settings`.
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Installs hooks on every direct fetcher created from now on.
    pub fn with_direct_hooks(mut self, hooks: DirectHooks) -> Self {
        self.direct_hooks = hooks;
        self
    }

    /// Installs hooks on every render fetcher created from now on.
    pub fn with_render_hooks(mut self, hooks: RenderHooks) -> Self {
        self.render_hooks = hooks;
        self
    }

    /// The settings new fetchers get.
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Creates a fetcher for `fetcher_type`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend's client cannot be constructed, e.g.
    /// an unusable render endpoint.
    pub fn create(&self, fetcher_type: FetcherType) -> Result<Box<dyn Fetcher>, FetchError> {
        debug!(backend = %fetcher_type, "Creating fetcher");
        let fetcher: Box<dyn Fetcher> = match fetcher_type {
            FetcherType::Direct => Box::new(DirectFetcher::with_hooks(
                &self.settings,
                self.direct_hooks.clone(),
            )?),
            FetcherType::Render => Box::new(RenderFetcher::with_hooks(
                &self.settings,
                self.render_hooks.clone(),
            )?),
        };
        Ok(fetcher)
    }

    /// Creates a fetcher from a backend name such as `"direct"` or `"render"`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnsupportedType`] for an unknown name.
    pub fn create_by_name(&self, name: &str) -> Result<Box<dyn Fetcher>, FetchError> {
        let fetcher_type: FetcherType = name.parse()?;
        self.create(fetcher_type)
    }
}

/// Creates a fetcher for `fetcher_type` with default settings.
///
/// # Errors
///
/// See [`FetcherFactory::create`].
pub fn new_fetcher(fetcher_type: FetcherType) -> Result<Box<dyn Fetcher>, FetchError> {
    FetcherFactory::default().create(fetcher_type)
}

// ============================================================================
// Tests
// ============================================================================
