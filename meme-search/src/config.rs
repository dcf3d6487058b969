//! Provider configuration with sensible defaults.
//!
//! [`SourcesConfig`] carries the construction parameters of the built-in
//! providers: credential material, the outbound proxy, and HTTP client
//! behaviour. The aggregator itself never reads it.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Environment variable holding the Douyin session cookie.
pub const ENV_DOUYIN_COOKIE: &str = "DOUYIN_COOKIE";
/// Environment variable holding the outbound HTTP proxy URL.
pub const ENV_PROXY_URL: &str = "MEME_PROXY_URL";
/// Environment variable holding the image proxy URL.
pub const ENV_IMAGE_PROXY_URL: &str = "IMAGE_PROXY_URL";

/// Construction parameters for the built-in providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Cookie for the Douyin provider. The provider is only registered
    /// when this is set.
    pub douyin_cookie: Option<String>,
    /// Proxy used for all outbound provider requests.
    pub proxy_url: Option<String>,
    /// Image proxy that hotlink-protected image URLs are rewritten through.
    pub image_proxy_url: Option<String>,
    /// HTTP client timeout in seconds. Acts as a backstop behind the
    /// aggregator's per-provider deadline.
    pub request_timeout_secs: u64,
    /// Custom User-Agent string. If `None`, a browser User-Agent is picked
    /// from a built-in rotation list per client.
    pub user_agent: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            douyin_cookie: None,
            proxy_url: None,
            image_proxy_url: None,
            request_timeout_secs: 15,
            user_agent: None,
        }
    }
}

impl SourcesConfig {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// clear a value loaded from a config file.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(cookie) = read(ENV_DOUYIN_COOKIE) {
            self.douyin_cookie = Some(cookie);
        }
        if let Some(proxy) = read(ENV_PROXY_URL) {
            self.proxy_url = Some(proxy);
        }
        if let Some(proxy) = read(ENV_IMAGE_PROXY_URL) {
            self.image_proxy_url = Some(proxy);
        }
        self
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - `request_timeout_secs` must be greater than 0
    /// - `proxy_url` and `image_proxy_url`, when set, must be http(s) URLs
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.request_timeout_secs == 0 {
            return Err(SearchError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        for (field, value) in [
            ("proxy_url", &self.proxy_url),
            ("image_proxy_url", &self.image_proxy_url),
        ] {
            if let Some(raw) = value {
                validate_http_url(field, raw)?;
            }
        }
        Ok(())
    }
}

fn validate_http_url(field: &str, raw: &str) -> Result<(), SearchError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| SearchError::Config(format!("{field} is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SearchError::Config(format!(
            "{field} must use http or https, got {other}"
        ))),
    }
}
