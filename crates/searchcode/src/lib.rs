//! searchcode.com backend for `search-core`.

mod client;
mod wire;

pub use client::{DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT, SearchCodeClient};
