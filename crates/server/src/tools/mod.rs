//! MCP tool implementations.
//!
//! This module contains all tools exposed by the page-cache server.

pub mod cache;

use pagecache_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Render a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use pagecache_core::{CacheConfig, MemoryStore, PageCache, PageContent};
    use rmcp::model::CallToolResult;

    pub fn cache() -> PageCache {
        PageCache::new(CacheConfig::default(), Arc::new(MemoryStore::new()))
    }

    pub fn page(title: &str) -> PageContent {
        PageContent::new(title, "Readable body text for the cached page. ".repeat(5))
    }

    /// Parse the JSON text of the first content block.
    pub fn output(result: &CallToolResult) -> serde_json::Value {
        let content = serde_json::to_value(&result.content[0]).unwrap();
        let text = content.get("text").and_then(|v| v.as_str()).expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
