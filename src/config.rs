//! Application configuration for the `memehub` front end.
//!
//! [`AppConfig`] is loaded from TOML (an explicit `--config` path or the
//! platform config directory), then environment overrides are applied on
//! top. Every field has a default so a partial or missing file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use meme_search::{SearchOptions, SourcesConfig};
use serde::{Deserialize, Serialize};

/// Environment variable holding a bare log level (`debug`, `info`, ...).
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Default log filter when neither `RUST_LOG` nor `LOG_LEVEL` is set.
pub const DEFAULT_LOG_FILTER: &str = "memehub=info,meme_search=info";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Provider construction parameters.
    pub sources: SourcesConfig,
    /// Defaults for CLI search flags.
    pub search: SearchDefaults,
}

/// Defaults applied when the corresponding CLI flag is omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    pub page: u32,
    /// Per-provider result cap.
    pub limit: usize,
    /// Per-provider deadline in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            timeout_secs: 15,
        }
    }
}

impl SearchDefaults {
    /// Convert to [`SearchOptions`].
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            page: self.page,
            limit: self.limit,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Returns the default config file path: `<config dir>/memehub/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("memehub").join("config.toml"))
    }

    /// Resolve the configuration the CLI runs with.
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// when the file is present and defaults otherwise. Environment
    /// overrides from the process environment are applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if a file that should be loaded cannot be read or
    /// parsed, or if the resulting source configuration is invalid.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(default) if default.is_file() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        let config = config.with_env_overrides(|key| std::env::var(key).ok());
        config
            .sources
            .validate()
            .context("invalid [sources] configuration")?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.sources = self.sources.with_env_overrides(lookup);
        self
    }
}

/// Resolve the tracing filter directive.
///
/// Precedence: `rust_log` verbatim, then a recognised `log_level` mapped to
/// both crates, then the default (`debug` when `verbose`).
pub fn log_filter(rust_log: Option<&str>, log_level: Option<&str>, verbose: bool) -> String {
    if let Some(filter) = rust_log.map(str::trim).filter(|f| !f.is_empty()) {
        return filter.to_string();
    }
    let level = log_level
        .map(|l| l.trim().to_ascii_lowercase())
        .filter(|l| matches!(l.as_str(), "trace" | "debug" | "info" | "warn" | "error"));
    match level {
        Some(level) => format!("memehub={level},meme_search={level}"),
        None if verbose => "memehub=debug,meme_search=debug".to_string(),
        None => DEFAULT_LOG_FILTER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.search.page, 1);
        assert_eq!(config.search.limit, 10);
        assert_eq!(config.search.timeout_secs, 15);
        assert_eq!(config.sources, SourcesConfig::default());
    }

    #[test]
    fn from_file_partial_toml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[search]
limit = 25

[sources]
douyin_cookie = "sessionid=abc"
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.search.limit, 25);
        assert_eq!(config.search.page, 1);
        assert_eq!(config.sources.douyin_cookie.as_deref(), Some("sessionid=abc"));
        assert_eq!(config.sources.request_timeout_secs, 15);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = AppConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[search\nlimit = ").unwrap();

        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn load_rejects_invalid_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sources]\nrequest_timeout_secs = 0\n").unwrap();

        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn env_overrides_reach_sources() {
        let config = AppConfig::default().with_env_overrides(|key| match key {
            "DOUYIN_COOKIE" => Some("sid=1".into()),
            _ => None,
        });
        assert_eq!(config.sources.douyin_cookie.as_deref(), Some("sid=1"));
    }

    #[test]
    fn toml_round_trip() {
        let mut config = AppConfig::default();
        config.search.timeout_secs = 3;
        config.sources.proxy_url = Some("http://127.0.0.1:8080".into());
        let text = toml::to_string_pretty(&config).unwrap();
        let loaded: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn search_defaults_to_options() {
        let options = SearchDefaults::default().options();
        assert_eq!(options.page, 1);
        assert_eq!(options.limit, 10);
        assert_eq!(options.timeout, Duration::from_secs(15));
    }

    #[test]
    fn log_filter_precedence() {
        assert_eq!(log_filter(Some("trace"), Some("warn"), false), "trace");
        assert_eq!(
            log_filter(None, Some("WARN"), true),
            "memehub=warn,meme_search=warn"
        );
        assert_eq!(log_filter(None, Some("loud"), false), DEFAULT_LOG_FILTER);
        assert_eq!(
            log_filter(Some("  "), None, true),
            "memehub=debug,meme_search=debug"
        );
        assert_eq!(log_filter(None, None, false), DEFAULT_LOG_FILTER);
    }
}
