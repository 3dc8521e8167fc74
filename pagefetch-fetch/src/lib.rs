// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Pagefetch Fetch
//!
//! Backend strategies for fetching web pages, and the pieces they share.
//!
//! ## Strategies
//!
//! Both implement [`Fetcher`]:
//!
//! - [`DirectFetcher`] - plain HTTP straight to the origin
//! - [`RenderFetcher`] - through a remote rendering service that runs the
//!   page's scripts first
//!
//! ## Shared Pieces
//!
//! - [`cookies`] - the per-session [`CookieJar`]
//! - [`cache`] - cache policy evaluation for every successful response
//! - [`classify`] - status code to [`FetchError`] mapping
//! - [`hooks`] - customization points around each fetch
//! - [`host`] - HTTP client construction and the rendering service client
//!
//! ## Example
//!
//! ```ignore
//! use pagefetch_core::{FetchRequest, FetcherType};
//! use pagefetch_fetch::{FetchSettings, FetcherFactory};
//!
//! let factory = FetcherFactory::new(FetchSettings::default());
//! let fetcher = factory.create(FetcherType::Direct)?;
//! fetcher.prepare().await?;
//!
//! let page = fetcher
//!     .response(&FetchRequest::new("https://example.com/login").with_form_data("user=a&pass=b"))
//!     .await?;
//! println!("{} expires {:?}", page.status_text(), page.expires());
//! ```

// Core modules
pub mod cache;
pub mod classify;
pub mod context;
pub mod cookies;
pub mod direct;
pub mod error;
pub mod factory;
pub mod hooks;
pub mod host;
pub mod render;
pub mod response;
pub mod strategy;

// Re-export key types at crate root

// Errors
pub use error::{ErrorKind, FetchError, HookError, RenderError};

// Strategies
pub use direct::DirectFetcher;
pub use factory::{FetcherFactory, new_fetcher};
pub use render::RenderFetcher;
pub use strategy::Fetcher;

// Shared pieces
pub use cache::{CacheInfo, CacheReason};
pub use classify::{check_status, classify_status};
pub use context::FetchSettings;
pub use cookies::{Cookie, CookieJar};
pub use hooks::{DirectHooks, RenderHooks};
pub use response::{Body, FetchResponse, ResponseHead};

// Transport types that appear in the public API
pub use reqwest::StatusCode;
pub use reqwest::header::HeaderMap;
