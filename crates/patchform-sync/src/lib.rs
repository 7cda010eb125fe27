//! Sync layer: pulls patch fields from the sockpuppet session API.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{FetchError, PATCHES_PATH, PatchClient};
