//! Transport-free handlers for the `search_meme` and `list_sources` tools.
//!
//! A protocol server (stdio, HTTP, ...) decodes a tool call into a
//! [`serde_json::Value`], hands it to these functions and returns the text
//! they produce. Framing and transport are the caller's concern.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SearchError};
use crate::orchestrator::search::Aggregator;
use crate::registry::Registry;
use crate::types::SearchOptions;

/// Name of the search tool.
pub const SEARCH_MEME: &str = "search_meme";
/// Name of the provider listing tool.
pub const LIST_SOURCES: &str = "list_sources";

/// Arguments of the `search_meme` tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchMemeArgs {
    /// Search keyword, e.g. "猫" or "happy".
    pub keyword: String,
    /// Provider ids to search. Empty searches every provider.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Result page, defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Per-provider result cap, defaults to 20.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchMemeArgs {
    /// Resolve the search options, starting from `SearchOptions::default()`.
    ///
    /// Zero values count as unset.
    pub fn options(&self) -> SearchOptions {
        let mut options = SearchOptions::default();
        if let Some(page) = self.page.filter(|p| *p > 0) {
            options.page = page;
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            options.limit = limit;
        }
        options
    }
}

/// Decode raw tool arguments.
///
/// # Errors
///
/// Returns [`SearchError::Decode`] if `args` has the wrong shape and
/// [`SearchError::EmptyKeyword`] if the keyword is blank.
pub fn parse_search_meme_args(args: serde_json::Value) -> Result<SearchMemeArgs> {
    let parsed: SearchMemeArgs = serde_json::from_value(args)
        .map_err(|e| SearchError::Decode(format!("invalid {SEARCH_MEME} arguments: {e}")))?;
    if parsed.keyword.trim().is_empty() {
        return Err(SearchError::EmptyKeyword);
    }
    Ok(parsed)
}

/// Run the `search_meme` tool and return the report as pretty JSON.
///
/// # Errors
///
/// Returns [`SearchError::EmptyKeyword`] for a blank keyword, or
/// [`SearchError::Decode`] if the report cannot be serialized.
pub async fn search_meme(
    aggregator: &Aggregator,
    args: &SearchMemeArgs,
    cancel: &CancellationToken,
) -> Result<String> {
    let options = args.options();
    tracing::debug!(
        sources = ?args.sources,
        page = options.page,
        limit = options.limit,
        "{SEARCH_MEME} invoked"
    );

    let report = aggregator
        .search_subset(&args.keyword, args.sources.as_slice(), &options, cancel)
        .await?;

    serde_json::to_string_pretty(&report)
        .map_err(|e| SearchError::Decode(format!("failed to serialize report: {e}")))
}

/// Run the `list_sources` tool and return the descriptors as pretty JSON.
///
/// # Errors
///
/// Returns [`SearchError::Decode`] if serialization fails.
pub fn list_sources(registry: &Registry) -> Result<String> {
    let descriptors = registry.descriptors();
    tracing::debug!(count = descriptors.len(), "{LIST_SOURCES} invoked");
    serde_json::to_string_pretty(&descriptors)
        .map_err(|e| SearchError::Decode(format!("failed to serialize sources: {e}")))
}
