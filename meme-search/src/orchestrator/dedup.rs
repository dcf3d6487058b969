//! Result deduplication by content-derived key.
//!
//! Some providers serve the same asset from several CDN mirrors whose URLs
//! differ only in host and decoration but embed a stable content ID. Those
//! IDs are extracted and used as the key; any other URL is keyed by its
//! SHA-256 digest.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::types::Meme;

/// Douyin CDN path: `/tos-cn-i-<bucket>/<content-id>~<decoration>`.
const DOUYIN_CONTENT_ID_PATTERN: &str = r"/tos-cn-i-[^/]+/([^/~?]+)";

fn douyin_content_id() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(DOUYIN_CONTENT_ID_PATTERN).ok())
        .as_ref()
}

/// Identity of an item for deduplication purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// Content ID extracted from a known CDN URL layout.
    ContentId(String),
    /// Lowercase hex SHA-256 of the full URL.
    UrlHash(String),
}

/// Derive the deduplication key for `url`.
///
/// # Examples
///
/// ```
/// use meme_search::orchestrator::dedup::{dedup_key, DedupKey};
///
/// let a = dedup_key("https://p3.douyinpic.com/tos-cn-i-0813/abc123~tplv-obj.gif");
/// let b = dedup_key("https://p9.douyinpic.com/tos-cn-i-0813c/abc123~noop.webp");
/// assert_eq!(a, b);
/// assert_eq!(a, DedupKey::ContentId("abc123".into()));
/// ```
pub fn dedup_key(url: &str) -> DedupKey {
    if let Some(id) = douyin_content_id()
        .and_then(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
    {
        return DedupKey::ContentId(id.as_str().to_string());
    }
    let digest = Sha256::digest(url.as_bytes());
    DedupKey::UrlHash(format!("{digest:x}"))
}

/// Remove duplicate items, keeping the first occurrence of each key.
///
/// The output preserves the relative input order of retained items and is
/// never longer than the input. Applying it twice gives the same result as
/// applying it once.
pub fn deduplicate(items: Vec<Meme>) -> Vec<Meme> {
    let mut seen: HashSet<DedupKey> = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(dedup_key(&item.url)))
        .collect()
}
