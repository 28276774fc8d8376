//! # Resource Implementations
//!
//! Concrete [`LoadableResource`](crate::core::LoadableResource) types.
//!
//! - **`url_resource`**: remote HTTP(S) data through a blocking `reqwest` client,
//!   with a local fallback file and an on-disk cache of the last good payload.

/// HTTP(S) resource with fallback file and cache.
pub mod url_resource;

pub use url_resource::{UrlResource, DEFAULT_TIMEOUT};
