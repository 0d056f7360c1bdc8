//! cache_set tool implementation.
//!
//! Stores extracted page content, subject to admission control.

use pagecache_core::{CacheOptions, PageCache, PageContent, RejectReason, SetOutcome};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::require_url;
use crate::tools::json_result;

/// Parameters for the cache_set tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSetParams {
    /// The page URL as originally requested.
    pub url: String,

    /// The extracted page content.
    pub content: PageContent,

    /// Request options; `ttlMs` overrides the category TTL.
    #[serde(default)]
    pub options: CacheOptions,
}

/// Output from the cache_set tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSetOutput {
    /// Whether the content is now cached.
    pub cached: bool,

    /// "stored", "refreshed" or "skipped".
    pub outcome: String,

    /// Why the write was skipped, if it was.
    pub reason: Option<RejectReason>,
}

impl From<SetOutcome> for CacheSetOutput {
    fn from(outcome: SetOutcome) -> Self {
        match outcome {
            SetOutcome::Stored => Self { cached: true, outcome: "stored".into(), reason: None },
            SetOutcome::Refreshed => Self { cached: true, outcome: "refreshed".into(), reason: None },
            SetOutcome::Skipped(reason) => Self { cached: false, outcome: "skipped".into(), reason: Some(reason) },
        }
    }
}

/// Implementation of the cache_set tool.
pub async fn set_impl(cache: &PageCache, params: CacheSetParams) -> Result<CallToolResult, McpError> {
    require_url(&params.url)?;

    let outcome = cache.put(&params.url, params.content, &params.options).await;
    json_result(&CacheSetOutput::from(outcome))
}
