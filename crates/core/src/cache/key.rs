//! Cache key normalization.
//!
//! Keys are derived from the request URL and options only, never from
//! content. Normalization steps:
//! 1. Parse the URL (on failure the raw string is used verbatim)
//! 2. Drop tracking query parameters (`utm_*`, `fbclid`, `gclid`, ...)
//! 3. Drop the fragment unless it looks like an in-page anchor
//! 4. Append pipe-separated option tags (`mode:`, `meta:true`, `ua:`)

use url::Url;

use super::hash::user_agent_tag;
use crate::CacheOptions;

/// Query parameters that never affect page content.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "ref", "source", "campaign", "_ga", "_gid", "mc_cid", "mc_eid"];

fn is_tracking_param(name: &str) -> bool {
    name.starts_with("utm_") || TRACKING_PARAMS.contains(&name)
}

/// Anchors such as `#section-2`, `#chapter3` or `#heading` address a part of
/// the document and are kept; hash routes (`#/inbox`) and bare `#` are not.
fn is_important_fragment(fragment: &str) -> bool {
    fragment.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Canonicalize a URL so that requests differing only in tracking noise collapse.
///
/// Never fails: an unparseable input is returned unchanged.
pub fn normalize_url(input: &str) -> String {
    let mut parsed = match Url::parse(input) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(url = input, error = %e, "unparseable URL, using raw string as key");
            return input.to_string();
        }
    };

    // The query is always re-serialized so equivalent encodings (`%20`, `+`) collapse.
    if parsed.query().is_some() {
        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(name, _)| !is_tracking_param(name))
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    if !parsed.fragment().is_some_and(is_important_fragment) {
        parsed.set_fragment(None);
    }

    parsed.into()
}

/// Derive the cache key for a request.
pub fn cache_key(url: &str, options: &CacheOptions) -> String {
    let mut key = normalize_url(url);

    if let Some(mode) = options.mode.as_deref().filter(|m| !m.is_empty()) {
        key.push_str("|mode:");
        key.push_str(mode);
    }
    if options.include_metadata {
        key.push_str("|meta:true");
    }
    if let Some(user_agent) = options.user_agent.as_deref().filter(|ua| !ua.is_empty()) {
        key.push_str("|ua:");
        key.push_str(&user_agent_tag(user_agent));
    }

    key
}
