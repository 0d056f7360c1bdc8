//! Content classification and TTL policy.
//!
//! Pages are labelled with one [`ContentCategory`] from URL, title and a
//! content prefix using ordered substring rules; the first matching rule
//! wins. [`TtlPolicy`] then maps the category to a time-to-live.

use std::fmt;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{CacheConfig, PageContent};

/// Number of leading content characters inspected by the classifier.
const CLASSIFY_PREFIX_CHARS: usize = 500;

/// Closed set of content categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    News,
    Social,
    Documentation,
    Ecommerce,
    Static,
    General,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 6] = [
        ContentCategory::News,
        ContentCategory::Social,
        ContentCategory::Documentation,
        ContentCategory::Ecommerce,
        ContentCategory::Static,
        ContentCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Social => "social",
            Self::Documentation => "documentation",
            Self::Ecommerce => "ecommerce",
            Self::Static => "static",
            Self::General => "general",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased text the rules match against.
struct Signals {
    url: String,
    title: String,
    body: String,
}

impl Signals {
    fn new(url: &str, content: &PageContent) -> Self {
        let body: String = content.main_content.chars().take(CLASSIFY_PREFIX_CHARS).collect();
        Self { url: url_signal(url), title: content.title.to_lowercase(), body: body.to_lowercase() }
    }

    fn url_has(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.url.contains(n))
    }

    fn title_has(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.title.contains(n))
    }

    fn body_has(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.body.contains(n))
    }
}

/// Lowercased host plus path; query and fragment never influence the category.
fn url_signal(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => format!("{}{}", parsed.host_str().unwrap_or_default(), parsed.path()).to_lowercase(),
        Err(_) => url.to_lowercase(),
    }
}

const NEWS_URL: &[&str] = &["/news", "/article", "/press", "/breaking", "news."];
const NEWS_TITLE: &[&str] = &["breaking", "news", "live updates"];

const DOCS_URL: &[&str] = &["/docs", "/documentation", "/api/", "/reference", "/guide", "/manual", "/tutorial", "docs."];
const DOCS_TITLE: &[&str] = &["documentation", "api reference", "guide", "tutorial"];

const SOCIAL_URL: &[&str] = &[
    "twitter.com",
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "reddit.com",
    "tiktok.com",
    "threads.net",
    "mastodon.",
    "/status/",
];

const ECOMMERCE_URL: &[&str] = &["/product", "/shop", "/cart", "/checkout", "/item/", "/store"];
const ECOMMERCE_BODY: &[&str] = &["add to cart", "add to basket", "buy now"];

const STATIC_URL: &[&str] = &["/about", "/contact", "/privacy", "/terms", "/faq", "/legal"];

/// Assign exactly one category to a page.
pub fn classify(url: &str, content: &PageContent) -> ContentCategory {
    let signals = Signals::new(url, content);

    if signals.url_has(NEWS_URL) || signals.title_has(NEWS_TITLE) {
        ContentCategory::News
    } else if signals.url_has(DOCS_URL) || signals.title_has(DOCS_TITLE) {
        ContentCategory::Documentation
    } else if signals.url_has(SOCIAL_URL) {
        ContentCategory::Social
    } else if signals.url_has(ECOMMERCE_URL) || signals.body_has(ECOMMERCE_BODY) {
        ContentCategory::Ecommerce
    } else if signals.url_has(STATIC_URL) {
        ContentCategory::Static
    } else {
        ContentCategory::General
    }
}

/// Category to TTL mapping built from three configurable bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub default: Duration,
    pub short: Duration,
    pub long: Duration,
}

impl TtlPolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            default: Duration::from_millis(config.default_ttl_ms),
            short: Duration::from_millis(config.short_ttl_ms),
            long: Duration::from_millis(config.long_ttl_ms),
        }
    }

    pub fn ttl_for(&self, category: ContentCategory) -> Duration {
        match category {
            ContentCategory::News => self.short,
            ContentCategory::Social => self.short / 2,
            ContentCategory::Documentation => self.long,
            ContentCategory::Static => self.long * 2,
            ContentCategory::Ecommerce | ContentCategory::General => self.default,
        }
    }

    /// TTL to apply to a write: a non-zero explicit override wins over the policy.
    pub fn resolve(&self, category: ContentCategory, override_ms: Option<u64>) -> Duration {
        match override_ms {
            Some(ms) if ms > 0 => Duration::from_millis(ms),
            _ => self.ttl_for(category),
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
