//! Core search aggregator: concurrent multi-provider fan-out, join, dedup.
//!
//! One tokio task is spawned per targeted provider. Every task races its
//! provider call against a per-provider deadline and a child of the
//! caller's cancellation token, so each produces exactly one outcome. The
//! aggregator waits for all of them (no early return on first success or
//! failure), then deduplicates the merged items.
//!
//! Items are merged in task completion order. Provider latency varies from
//! run to run, so the order of `SearchReport::items` is not reproducible
//! across runs; consumers that need a stable order must sort explicitly.

use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SearchError};
use crate::provider::Provider;
use crate::registry::Registry;
use crate::types::{Meme, ProviderDescriptor, SearchOptions, SearchReport};

use super::dedup::deduplicate;

/// Outcome of one provider task, tagged with its launch slot.
type TaskOutcome = (usize, std::result::Result<Vec<Meme>, SearchError>);

/// Fans a query out to the providers of a [`Registry`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: Arc<Registry>,
}

impl Aggregator {
    /// Create an aggregator over `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// The registry this aggregator searches.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Descriptors of every registered provider, sorted by id.
    pub fn list_providers(&self) -> Vec<ProviderDescriptor> {
        self.registry.descriptors()
    }

    /// Search every registered provider.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyKeyword`] if `keyword` is blank. Provider
    /// failures never fail the call; they are reported in
    /// [`SearchReport::errors`].
    pub async fn search_all(
        &self,
        keyword: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<SearchReport> {
        let keyword = validate_keyword(keyword)?;
        let start = Instant::now();
        let targets = self.registry.list();
        Ok(run_fan_out(keyword, targets, BTreeMap::new(), options, cancel, start).await)
    }

    /// Search only the providers named in `provider_ids`.
    ///
    /// Unknown identifiers are recorded as failures without being launched.
    /// An identifier named twice is searched twice; if any of its calls
    /// fails, the identifier is reported as failed and none of its items are
    /// kept. An empty list searches every registered provider.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyKeyword`] if `keyword` is blank.
    pub async fn search_subset<S: AsRef<str>>(
        &self,
        keyword: &str,
        provider_ids: &[S],
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<SearchReport> {
        if provider_ids.is_empty() {
            return self.search_all(keyword, options, cancel).await;
        }
        let keyword = validate_keyword(keyword)?;
        let start = Instant::now();

        let mut targets = Vec::with_capacity(provider_ids.len());
        let mut errors = BTreeMap::new();
        for id in provider_ids {
            let id = id.as_ref();
            match self.registry.get(id) {
                Some(provider) => targets.push(provider),
                None => {
                    tracing::warn!(provider = id, "requested provider is not registered");
                    errors.insert(
                        id.to_string(),
                        SearchError::ProviderNotFound(id.to_string()).to_string(),
                    );
                }
            }
        }

        Ok(run_fan_out(keyword, targets, errors, options, cancel, start).await)
    }
}

fn validate_keyword(keyword: &str) -> Result<&str> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() {
        return Err(SearchError::EmptyKeyword);
    }
    Ok(trimmed)
}

/// Launch one task per target, join them all, and build the report.
async fn run_fan_out(
    keyword: &str,
    targets: Vec<Arc<dyn Provider>>,
    mut errors: BTreeMap<String, String>,
    options: &SearchOptions,
    cancel: &CancellationToken,
    start: Instant,
) -> SearchReport {
    if targets.is_empty() {
        return finish_report(Vec::new(), Vec::new(), errors, start);
    }

    let keyword: Arc<str> = Arc::from(keyword);
    let mut pending: HashMap<usize, String> = HashMap::with_capacity(targets.len());
    let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();

    tracing::debug!(providers = targets.len(), "dispatching search");
    tracing::trace!(keyword = %keyword, "search keyword");

    for (slot, provider) in targets.into_iter().enumerate() {
        pending.insert(slot, provider.id().to_string());
        let keyword = Arc::clone(&keyword);
        let options = *options;
        let child = cancel.child_token();
        tasks.spawn(async move {
            let outcome = AssertUnwindSafe(query_provider(provider.as_ref(), &keyword, &options, &child))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(SearchError::Http(format!(
                        "{} panicked during search",
                        provider.id()
                    )))
                });
            (slot, outcome)
        });
    }

    let mut completed: Vec<(String, Vec<Meme>)> = Vec::new();

    loop {
        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(pending = pending.len(), "search cancelled; abandoning pending providers");
                tasks.abort_all();
                break;
            }
            joined = tasks.join_next() => joined,
        };

        let Some(joined) = joined else {
            break;
        };

        match joined {
            Ok((slot, outcome)) => {
                let Some(id) = pending.remove(&slot) else {
                    continue;
                };
                match outcome {
                    Ok(found) => {
                        tracing::debug!(provider = %id, count = found.len(), "provider returned results");
                        completed.push((id, found));
                    }
                    Err(err) => {
                        tracing::warn!(provider = %id, error = %err, "provider search failed");
                        errors.insert(id, err.to_string());
                    }
                }
            }
            Err(join_err) => {
                tracing::warn!(error = %join_err, "provider task ended without an outcome");
            }
        }
    }

    // Anything still pending was abandoned by cancellation or lost its task.
    let abandoned_reason = if cancel.is_cancelled() {
        "operation cancelled before provider finished"
    } else {
        "provider task ended without an outcome"
    };
    for (_, id) in pending {
        let err = SearchError::Cancelled(format!("{id}: {abandoned_reason}"));
        errors.insert(id, err.to_string());
    }

    let (sources, items) = merge_successes(completed, &errors);
    finish_report(deduplicate(items), sources, errors, start)
}

/// Collect successful outcomes in completion order.
///
/// An id that also failed (the same provider requested twice, one call
/// failing) counts as failed: its items and source entry are discarded.
/// Items without a URL are dropped.
fn merge_successes(
    completed: Vec<(String, Vec<Meme>)>,
    errors: &BTreeMap<String, String>,
) -> (Vec<String>, Vec<Meme>) {
    let mut sources = Vec::with_capacity(completed.len());
    let mut items = Vec::new();
    for (id, found) in completed {
        if errors.contains_key(&id) {
            tracing::debug!(provider = %id, count = found.len(), "discarding results of a provider that also failed");
            continue;
        }
        let (kept, empty): (Vec<Meme>, Vec<Meme>) =
            found.into_iter().partition(|m| !m.url.trim().is_empty());
        if !empty.is_empty() {
            tracing::debug!(provider = %id, dropped = empty.len(), "dropping items without a URL");
        }
        items.extend(kept);
        sources.push(id);
    }
    (sources, items)
}

/// Run one provider call under its deadline and cancellation token.
async fn query_provider(
    provider: &dyn Provider,
    keyword: &str,
    options: &SearchOptions,
    cancel: &CancellationToken,
) -> std::result::Result<Vec<Meme>, SearchError> {
    let timeout = options.effective_timeout();
    let started = Instant::now();

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            Err(SearchError::Cancelled(format!("{} cancelled", provider.id())))
        }
        result = tokio::time::timeout(timeout, provider.search(keyword, options, cancel)) => {
            match result {
                Ok(inner) => inner,
                Err(_elapsed) => {
                    // Let the provider observe the deadline if it holds other work.
                    cancel.cancel();
                    Err(SearchError::Timeout(format!(
                        "{} exceeded {}ms",
                        provider.id(),
                        timeout.as_millis()
                    )))
                }
            }
        }
    };

    tracing::trace!(
        provider = provider.id(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        ok = outcome.is_ok(),
        "provider call finished"
    );
    outcome
}

fn finish_report(
    items: Vec<Meme>,
    sources: Vec<String>,
    errors: BTreeMap<String, String>,
    start: Instant,
) -> SearchReport {
    let duration_ms = start.elapsed().as_millis() as u64;
    let total = items.len();
    tracing::info!(
        total,
        succeeded = sources.len(),
        failed = errors.len(),
        duration_ms,
        "search completed"
    );
    SearchReport {
        items,
        sources,
        errors,
        total,
        duration_ms,
    }
}
