//! cache_stats tool implementation.

use pagecache_core::PageCache;
use rmcp::{ErrorData as McpError, model::CallToolResult};

use crate::tools::json_result;

/// Implementation of the cache_stats tool.
pub async fn stats_impl(cache: &PageCache) -> Result<CallToolResult, McpError> {
    json_result(&cache.stats().await)
}
