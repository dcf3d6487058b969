//! Core types for meme results, search options and aggregated reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Per-provider deadline used when [`SearchOptions::timeout`] is zero.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// A single meme image found by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meme {
    /// Human-readable title or caption.
    pub title: String,
    /// Canonical image URL.
    pub url: String,
    /// Identifier of the provider that produced this item.
    pub platform: String,
    /// Image width in pixels, when the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Image height in pixels, when the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Image format detected from the URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ImageFormat>,
}

/// Image container format of a [`Meme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Gif,
    Png,
    Jpg,
    Webp,
    #[serde(other)]
    Unknown,
}

impl ImageFormat {
    /// Returns the lowercase tag used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Webp => "webp",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options passed by value to every provider taking part in a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// 1-based result page. Zero is treated as the first page.
    pub page: u32,
    /// Per-provider result cap. Zero means unbounded.
    pub limit: usize,
    /// Per-provider deadline. Zero means [`DEFAULT_PROVIDER_TIMEOUT`].
    pub timeout: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

impl SearchOptions {
    /// The page number clamped to at least 1.
    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }

    /// The deadline applied to each provider call.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_PROVIDER_TIMEOUT
        } else {
            self.timeout
        }
    }

    /// Truncate `items` to the configured limit, if any.
    pub fn apply_limit<T>(&self, items: &mut Vec<T>) {
        if self.limit > 0 {
            items.truncate(self.limit);
        }
    }
}

/// Static description of a registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub requires_auth: bool,
}

/// The unified outcome of one aggregated search.
///
/// `items` are in provider completion order, which varies from run to run
/// with provider latency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Deduplicated items from all successful providers.
    pub items: Vec<Meme>,
    /// Identifiers of providers that completed successfully.
    pub sources: Vec<String>,
    /// Error message per failed provider identifier.
    pub errors: BTreeMap<String, String>,
    /// Number of entries in `items`.
    pub total: usize,
    /// Wall-clock duration of the whole search in milliseconds.
    pub duration_ms: u64,
}

impl SearchReport {
    /// Returns `true` if at least one provider failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
