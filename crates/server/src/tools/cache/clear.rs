//! cache_clear tool implementation.

use pagecache_core::PageCache;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearOutput {
    /// Number of entries dropped.
    pub cleared: usize,
}

/// Implementation of the cache_clear tool.
pub async fn clear_impl(cache: &PageCache) -> Result<CallToolResult, McpError> {
    let cleared = cache.len().await;
    cache.clear().await;
    json_result(&CacheClearOutput { cleared })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{cache, output, page};
    use pagecache_core::CacheOptions;

    #[tokio::test]
    async fn test_clear_impl() {
        let cache = cache();
        cache.set("https://example.com/a", page("A"), &CacheOptions::default()).await;

        let value = output(&clear_impl(&cache).await.unwrap());
        assert_eq!(value["cleared"], 1);
        assert!(cache.is_empty().await);
    }
}
