// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `pagefetch` Core
//!
//! Request types shared by every `pagefetch` crate.
//!
//! ## Key Types
//!
//! - [`FetchRequest`] - What to fetch: URL, method, form payload, backend
//! - [`HttpMethod`] - GET or POST
//! - [`FetcherType`] - Which backend strategy serves the request
//! - [`FormData`] - Ordered `key=value` form pairs
//! - [`CoreError`] - Errors raised while building or parsing requests

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{FORM_CONTENT_TYPE, FetchRequest, FetcherType, FormData, HttpMethod};
