//! Customization hooks for the fetch strategies.
//!
//! Each strategy carries a small struct of optional, named hook slots that
//! run at fixed points of a fetch. A hook returning `Err` aborts the whole
//! operation with [`FetchError::Hook`](crate::FetchError::Hook).
//!
//! ```ignore
//! let hooks = DirectHooks::new()
//!     .prepare_client(|client| async move {
//!         client.post("https://example.com/login").send().await?;
//!         Ok(())
//!     })
//!     .prepare_request(|req| {
//!         req.headers_mut().insert("x-trace", "1".parse()?);
//!         Ok(())
//!     });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::error::HookError;
use crate::host::renderer::RenderRequest;
use crate::response::ResponseHead;

/// Once-per-session client setup, e.g. logging in.
pub type PrepareClientFn =
    Arc<dyn Fn(reqwest::Client) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync>;

/// Per-request mutation before sending, e.g. header injection.
pub type PrepareRequestFn = Arc<dyn Fn(&mut reqwest::Request) -> Result<(), HookError> + Send + Sync>;

/// Inspection of each successful transport response.
pub type ProcessResponseFn = Arc<dyn Fn(&ResponseHead) -> Result<(), HookError> + Send + Sync>;

/// Once-per-session setup of the rendering backend.
pub type PrepareFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), HookError>> + Send + Sync>;

/// Per-request mutation of the rendering service call.
pub type PrepareRenderFn = Arc<dyn Fn(&mut RenderRequest) -> Result<(), HookError> + Send + Sync>;

// ============================================================================
// Direct Hooks
// ============================================================================

/// Hook slots of the direct strategy.
#[derive(Clone, Default)]
pub struct DirectHooks {
    /// Runs from `prepare()` against the strategy's client. Requests made
    /// here share the fetcher's cookie jar but skip `prepare_request`.
    pub prepare_client: Option<PrepareClientFn>,
    /// Runs on every request after it is built and before it is sent.
    pub prepare_request: Option<PrepareRequestFn>,
    /// Runs on every 200 response after the body is read and the cache
    /// policy evaluated.
    pub process_response: Option<ProcessResponseFn>,
}

impl DirectHooks {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the client preparation hook.
    pub fn prepare_client<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(reqwest::Client) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.prepare_client = Some(Arc::new(move |client| hook(client).boxed()));
        self
    }

    /// Sets the request preparation hook.
    pub fn prepare_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut reqwest::Request) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.prepare_request = Some(Arc::new(hook));
        self
    }

    /// Sets the response processing hook.
    pub fn process_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ResponseHead) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.process_response = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for DirectHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectHooks")
            .field("prepare_client", &self.prepare_client.is_some())
            .field("prepare_request", &self.prepare_request.is_some())
            .field("process_response", &self.process_response.is_some())
            .finish()
    }
}

// ============================================================================
// Render Hooks
// ============================================================================

/// Hook slots of the render strategy.
#[derive(Clone, Default)]
pub struct RenderHooks {
    /// Runs from `prepare()`. Unused by default.
    pub prepare: Option<PrepareFn>,
    /// Runs on every service call after it is built and before it is sent.
    pub prepare_request: Option<PrepareRenderFn>,
}

impl RenderHooks {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the preparation hook.
    pub fn prepare<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.prepare = Some(Arc::new(move || hook().boxed()));
        self
    }

    /// Sets the service call preparation hook.
    pub fn prepare_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RenderRequest) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.prepare_request = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for RenderHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderHooks")
            .field("prepare", &self.prepare.is_some())
            .field("prepare_request", &self.prepare_request.is_some())
            .finish()
    }
}
