//! Admission control: which pages are worth caching at all.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::PageContent;

/// Path fragments marking authentication pages.
const AUTH_PATHS: &[&str] = &["/login", "/auth", "/signin"];

/// Why a write was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// No main content at all.
    MissingContent,
    /// Main content shorter than the configured minimum.
    ContentTooShort { chars: usize, min: usize },
    /// Title looks like an error page.
    ErrorPage,
    /// URL points at a login or auth flow.
    AuthPage,
    /// Entry alone exceeds the cache's byte budget.
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContent => write!(f, "missing main content"),
            Self::ContentTooShort { chars, min } => write!(f, "main content too short ({chars} < {min} chars)"),
            Self::ErrorPage => write!(f, "error page"),
            Self::AuthPage => write!(f, "authentication page"),
            Self::TooLarge { size_bytes, max_bytes } => {
                write!(f, "entry of {size_bytes} bytes exceeds budget of {max_bytes} bytes")
            }
        }
    }
}

/// Content-based admission rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub min_content_chars: usize,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self { min_content_chars: 100 }
    }
}

impl AdmissionPolicy {
    /// Decide whether `(url, content)` may be cached.
    pub fn check(&self, url: &str, content: &PageContent) -> Result<(), RejectReason> {
        if content.main_content.is_empty() {
            return Err(RejectReason::MissingContent);
        }

        let chars = content.main_content.chars().count();
        if chars < self.min_content_chars {
            return Err(RejectReason::ContentTooShort { chars, min: self.min_content_chars });
        }

        if content.title.to_lowercase().contains("error") {
            return Err(RejectReason::ErrorPage);
        }

        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_lowercase(),
            Err(_) => url.to_lowercase(),
        };
        if AUTH_PATHS.iter().any(|p| path.contains(p)) {
            return Err(RejectReason::AuthPage);
        }

        Ok(())
    }

    pub fn should_cache(&self, url: &str, content: &PageContent) -> bool {
        self.check(url, content).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(len: usize) -> String {
        "x".repeat(len)
    }

    #[test]
    fn test_length_boundary() {
        let policy = AdmissionPolicy::default();
        let short = PageContent::new("Title", body(99));
        let exact = PageContent::new("Title", body(100));
        assert_eq!(
            policy.check("https://a.com/p", &short),
            Err(RejectReason::ContentTooShort { chars: 99, min: 100 })
        );
        assert!(policy.should_cache("https://a.com/p", &exact));
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let policy = AdmissionPolicy::default();
        let content = PageContent::new("Title", "é".repeat(99));
        assert!(!policy.should_cache("https://a.com/p", &content));
    }

    #[test]
    fn test_missing_content() {
        let policy = AdmissionPolicy::default();
        let content = PageContent::new("Title", "");
        assert_eq!(policy.check("https://a.com/p", &content), Err(RejectReason::MissingContent));
    }

    #[test]
    fn test_error_title_case_insensitive() {
        let policy = AdmissionPolicy::default();
        let content = PageContent::new("404 ERROR - Not Found", body(500));
        assert_eq!(policy.check("https://a.com/p", &content), Err(RejectReason::ErrorPage));
    }

    #[test]
    fn test_auth_paths() {
        let policy = AdmissionPolicy::default();
        let content = PageContent::new("", body(500));
        for url in ["https://a.com/login", "https://a.com/oauth/authorize", "https://a.com/user/signin?next=/"] {
            assert_eq!(policy.check(url, &content), Err(RejectReason::AuthPage), "{url}");
        }
    }

    #[test]
    fn test_auth_marker_in_query_is_ignored() {
        let policy = AdmissionPolicy::default();
        let content = PageContent::new("", body(500));
        assert!(policy.should_cache("https://a.com/blog?from=/login", &content));
    }

    #[test]
    fn test_unparseable_url_checks_raw_string() {
        let policy = AdmissionPolicy::default();
        let content = PageContent::new("", body(500));
        assert!(!policy.should_cache("a.com/login", &content));
        assert!(policy.should_cache("a.com/home", &content));
    }
}
