//! SHA-256 digests used for key tags and content fingerprints.

use sha2::{Digest, Sha256};

use crate::PageContent;

/// Number of leading characters of the main content that enter the fingerprint.
pub const FINGERPRINT_PREFIX_CHARS: usize = 1000;

/// Short digest of a user agent string, used as the `ua:` key tag.
pub fn user_agent_tag(user_agent: &str) -> String {
    let digest = Sha256::digest(user_agent.as_bytes());
    hex::encode(&digest[..4])
}

/// Fingerprint of a page's title and content prefix.
///
/// Two payloads with the same title and the same first
/// [`FINGERPRINT_PREFIX_CHARS`] characters are considered unchanged.
pub fn content_fingerprint(content: &PageContent) -> String {
    let prefix_end = content
        .main_content
        .char_indices()
        .nth(FINGERPRINT_PREFIX_CHARS)
        .map_or(content.main_content.len(), |(idx, _)| idx);

    let mut hasher = Sha256::new();
    hasher.update(content.title.as_bytes());
    hasher.update(b"\n");
    hasher.update(content.main_content[..prefix_end].as_bytes());
    hex::encode(hasher.finalize())
}
