//! Page content payloads and request options.
//!
//! The cache never interprets [`PageContent`] beyond admission checks and
//! fingerprinting; the shape is fixed here so that anything crossing the
//! cache boundary is validated by deserialization.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Content extracted from a web page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    /// Document title.
    #[serde(default)]
    pub title: String,

    /// Main readable text of the page.
    #[serde(default)]
    pub main_content: String,

    /// Text the user had selected when the page was extracted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,

    /// Name of the extractor that produced this content (e.g. "dom", "shadow-dom").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<String>,

    /// Page URL as seen by the extractor, if it differs from the request URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Free-form extraction metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl PageContent {
    pub fn new(title: impl Into<String>, main_content: impl Into<String>) -> Self {
        Self { title: title.into(), main_content: main_content.into(), ..Default::default() }
    }

    pub fn with_selection(mut self, selected: impl Into<String>) -> Self {
        self.selected_text = Some(selected.into());
        self
    }
}

/// Options that participate in the cache key, plus an optional TTL override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheOptions {
    /// Extraction mode (e.g. "readable", "full").
    #[serde(default)]
    pub mode: Option<String>,

    /// Whether the extraction included page metadata.
    #[serde(default)]
    pub include_metadata: bool,

    /// User agent of the requesting context; only a digest enters the key.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Explicit TTL in milliseconds, overriding the category policy.
    #[serde(default, alias = "ttl")]
    pub ttl_ms: Option<u64>,
}

impl CacheOptions {
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_metadata(mut self) -> Self {
        self.include_metadata = true;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }
}

/// Content returned to callers, annotated with cache bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CachedContent {
    #[serde(flatten)]
    pub content: PageContent,

    /// True when served from the cache rather than freshly extracted.
    #[serde(rename = "_fromCache")]
    pub from_cache: bool,

    /// Creation time of the serving entry (ms since epoch).
    #[serde(rename = "_cachedAt")]
    pub cached_at: i64,

    /// Access count after this hit.
    #[serde(rename = "_accessCount")]
    pub access_count: u64,
}

impl CachedContent {
    /// Wrap freshly extracted content that did not come from the cache.
    pub fn fresh(content: PageContent, now_ms: i64) -> Self {
        Self { content, from_cache: false, cached_at: now_ms, access_count: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_content_camel_case() {
        let content: PageContent = serde_json::from_str(
            r#"{"title":"Docs","mainContent":"body","selectedText":"sel","extractionMethod":"dom"}"#,
        )
        .unwrap();
        assert_eq!(content.title, "Docs");
        assert_eq!(content.main_content, "body");
        assert_eq!(content.selected_text.as_deref(), Some("sel"));
        assert_eq!(content.extraction_method.as_deref(), Some("dom"));
    }

    #[test]
    fn test_page_content_missing_fields_default() {
        let content: PageContent = serde_json::from_str(r#"{"mainContent":"x"}"#).unwrap();
        assert!(content.title.is_empty());
        assert!(content.metadata.is_empty());
    }

    #[test]
    fn test_cache_options_ttl_alias() {
        let options: CacheOptions = serde_json::from_str(r#"{"mode":"readable","ttl":1000}"#).unwrap();
        assert_eq!(options.ttl_ms, Some(1000));
        assert_eq!(options.mode.as_deref(), Some("readable"));
        assert!(!options.include_metadata);
    }

    #[test]
    fn test_cached_content_annotations() {
        let cached = CachedContent {
            content: PageContent::new("T", "body"),
            from_cache: true,
            cached_at: 42,
            access_count: 3,
        };
        let value = serde_json::to_value(&cached).unwrap();
        assert_eq!(value["_fromCache"], true);
        assert_eq!(value["_cachedAt"], 42);
        assert_eq!(value["_accessCount"], 3);
        assert_eq!(value["mainContent"], "body");
    }
}
