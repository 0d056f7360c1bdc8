//! Cache-related MCP tools.
//!
//! This module provides tools for reading, writing and inspecting the page cache.

pub mod clear;
pub mod get;
pub mod invalidate;
pub mod set;
pub mod stats;

pub use clear::clear_impl;
pub use get::{CacheGetParams, get_impl};
pub use invalidate::{CacheInvalidateParams, invalidate_impl};
pub use set::{CacheSetParams, set_impl};
pub use stats::stats_impl;

use pagecache_core::Error;

fn require_url(url: &str) -> Result<(), Error> {
    if url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()));
    }
    Ok(())
}
