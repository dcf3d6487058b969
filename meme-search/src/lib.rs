//! # meme-search
//!
//! Concurrent meme image search across independent, failure-prone providers.
//!
//! A single keyword is fanned out to every registered [`Provider`] (or an
//! explicit subset) at once. Each provider runs under its own deadline and
//! a shared cancellation token; one provider failing or hanging never
//! affects the others. Successful results are merged, deduplicated by a
//! content-derived key, and returned as one [`SearchReport`] that also
//! records which providers failed and why.
//!
//! ## Design
//!
//! - [`Registry`] is built explicitly at startup and shared by `Arc`
//! - [`Aggregator`] spawns one task per provider and joins all of them
//! - Items keep provider completion order, which is not stable across runs
//! - Providers apply the result limit themselves; the merged list is not
//!   re-truncated
//!
//! ## Security
//!
//! - Search keywords are logged only at trace level
//! - Provider cookies never appear in errors or logs

pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod tools;
pub mod types;

pub use config::SourcesConfig;
pub use error::{Result, SearchError};
pub use orchestrator::search::Aggregator;
pub use provider::Provider;
pub use registry::Registry;
pub use types::{ImageFormat, Meme, ProviderDescriptor, SearchOptions, SearchReport};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Search every built-in provider configured by `config`.
///
/// Convenience wrapper that builds a [`Registry`] with
/// [`Registry::with_builtin_providers`] and runs [`Aggregator::search_all`].
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid `config` and
/// [`SearchError::EmptyKeyword`] for a blank keyword. Provider failures are
/// reported inside the returned [`SearchReport`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> meme_search::Result<()> {
/// let config = meme_search::SourcesConfig::from_env();
/// let options = meme_search::SearchOptions::default();
/// let report = meme_search::search("猫", &config, &options).await?;
/// for meme in &report.items {
///     println!("{} [{}]: {}", meme.title, meme.platform, meme.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    keyword: &str,
    config: &SourcesConfig,
    options: &SearchOptions,
) -> Result<SearchReport> {
    let registry = Arc::new(Registry::with_builtin_providers(config)?);
    Aggregator::new(registry)
        .search_all(keyword, options, &CancellationToken::new())
        .await
}
