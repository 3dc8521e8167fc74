//! Domain models for `pagefetch`.
//!
//! ## Submodules
//!
//! - [`request`] - Request types (`FetchRequest`, `HttpMethod`, `FetcherType`)
//! - [`form`] - Form payload parsing and encoding (`FormData`)

mod form;
mod request;

pub use form::{FORM_CONTENT_TYPE, FormData};
pub use request::{FetchRequest, FetcherType, HttpMethod};
