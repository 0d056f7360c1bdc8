//! cache_get tool implementation.
//!
//! Looks up cached content for a URL and request options.

use pagecache_core::{CacheOptions, CachedContent, PageCache};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::require_url;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// The page URL as originally requested.
    pub url: String,

    /// Request options that were used when the content was cached.
    #[serde(default)]
    pub options: CacheOptions,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// Whether a live entry was found.
    pub hit: bool,

    /// The cached content, when `hit` is true.
    pub content: Option<CachedContent>,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &PageCache, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    require_url(&params.url)?;

    let content = cache.get(&params.url, &params.options).await;
    json_result(&CacheGetOutput { hit: content.is_some(), content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{cache, output, page};

    #[tokio::test]
    async fn test_get_impl_miss() {
        let cache = cache();
        let params = CacheGetParams { url: "https://example.com".to_string(), options: CacheOptions::default() };

        let result = get_impl(&cache, params).await.unwrap();
        let value = output(&result);
        assert_eq!(value["hit"], false);
        assert!(value["content"].is_null());
    }

    #[tokio::test]
    async fn test_get_impl_hit() {
        let cache = cache();
        cache.set("https://example.com/post", page("Example"), &CacheOptions::default()).await;

        let params = CacheGetParams { url: "https://example.com/post".to_string(), options: CacheOptions::default() };
        let value = output(&get_impl(&cache, params).await.unwrap());
        assert_eq!(value["hit"], true);
        assert_eq!(value["content"]["title"], "Example");
        assert_eq!(value["content"]["_fromCache"], true);
        assert_eq!(value["content"]["_accessCount"], 1);
    }

    #[tokio::test]
    async fn test_get_impl_empty_url() {
        let cache = cache();
        let params = CacheGetParams { url: " ".to_string(), options: CacheOptions::default() };
        let err = get_impl(&cache, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
