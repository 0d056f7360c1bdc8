//! cache_invalidate tool implementation.
//!
//! Removes every entry whose original URL matches a regular expression.

use pagecache_core::{Error, PageCache};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateParams {
    /// Regular expression matched against each entry's original URL.
    pub pattern: String,
}

/// Output from the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateOutput {
    /// Number of entries removed.
    pub removed: usize,
}

/// Implementation of the cache_invalidate tool.
pub async fn invalidate_impl(cache: &PageCache, params: CacheInvalidateParams) -> Result<CallToolResult, McpError> {
    if params.pattern.is_empty() {
        return Err(Error::InvalidInput("pattern cannot be empty; use cache_clear to drop everything".into()).into());
    }

    let removed = cache.invalidate(&params.pattern).await?;
    json_result(&CacheInvalidateOutput { removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{cache, output, page};
    use pagecache_core::CacheOptions;

    #[tokio::test]
    async fn test_invalidate_by_domain() {
        let cache = cache();
        let opts = CacheOptions::default();
        cache.set("https://example.com/page1", page("One"), &opts).await;
        cache.set("https://example.com/page2", page("Two"), &opts).await;
        cache.set("https://other.com/page1", page("Three"), &opts).await;

        let params = CacheInvalidateParams { pattern: r"^https://example\.com/".to_string() };
        let value = output(&invalidate_impl(&cache, params).await.unwrap());
        assert_eq!(value["removed"], 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalidate_bad_pattern() {
        let cache = cache();
        let params = CacheInvalidateParams { pattern: "[unclosed".to_string() };
        let err = invalidate_impl(&cache, params).await.unwrap_err();
        assert!(err.message.starts_with("INVALID_PATTERN"));
    }

    #[tokio::test]
    async fn test_invalidate_empty_pattern() {
        let cache = cache();
        let params = CacheInvalidateParams { pattern: String::new() };
        let err = invalidate_impl(&cache, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
