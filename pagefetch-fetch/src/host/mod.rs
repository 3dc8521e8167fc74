//! Host APIs for the fetch strategies.
//!
//! - [`http`] - builds the shared HTTP client
//! - [`renderer`] - talks to the remote rendering service

pub mod http;
pub mod renderer;

pub use http::HttpClient;
pub use renderer::{RenderHeader, RenderRequest, RenderResponse, RenderService};
