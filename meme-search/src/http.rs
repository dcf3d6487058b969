//! Shared HTTP plumbing for provider requests.
//!
//! Provides a configured [`reqwest::Client`] with a browser-like
//! User-Agent and optional outbound proxy, plus a cancellation-aware
//! JSON fetch helper used by every built-in provider.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::config::SourcesConfig;
use crate::error::SearchError;

/// Realistic browser User-Agent strings, one picked per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] configured for provider requests.
///
/// The client has:
/// - Timeout from config (a backstop behind the aggregator deadline)
/// - Random User-Agent from the rotation list (or custom if configured)
/// - The configured outbound proxy, if any
/// - Brotli and gzip decompression
/// - A per-client cookie store, so session cookies set by a provider are
///   replayed on its later requests
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the proxy URL is rejected, or
/// [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SourcesConfig) -> Result<reqwest::Client, SearchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    let mut builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(ua)
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::limited(10));

    if let Some(ref proxy) = config.proxy_url {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| SearchError::Config(format!("invalid proxy_url: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array; choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Issue a GET request and decode the JSON body as `T`.
///
/// Both the send and the body read race against `cancel`; a fired token
/// drops the in-flight request. `label` names the provider in messages.
///
/// # Errors
///
/// - [`SearchError::Cancelled`] if `cancel` fires first
/// - [`SearchError::Http`] on transport failure or a non-2xx status
/// - [`SearchError::Decode`] if the body is not the expected JSON shape
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    label: &str,
    url: &str,
    query: &[(&str, String)],
    headers: HeaderMap,
    cancel: &CancellationToken,
) -> Result<T, SearchError> {
    tracing::trace!(provider = label, url, "GET");

    let request = client.get(url).query(query).headers(headers);

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(SearchError::Cancelled(format!("{label} request abandoned")));
        }
        sent = request.send() => sent
            .map_err(|e| SearchError::Http(format!("{label} request failed: {e}")))?,
    };

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Http(format!(
            "{label} unexpected status code: {}",
            status.as_u16()
        )));
    }

    let body = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(SearchError::Cancelled(format!("{label} response read abandoned")));
        }
        body = response.bytes() => body
            .map_err(|e| SearchError::Http(format!("{label} response read failed: {e}")))?,
    };

    tracing::trace!(provider = label, bytes = body.len(), "response received");

    serde_json::from_slice(&body)
        .map_err(|e| SearchError::Decode(format!("{label} returned unexpected JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_config() {
        let client = build_client(&SourcesConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn build_client_with_custom_ua_and_proxy() {
        let config = SourcesConfig {
            user_agent: Some("MemeBot/1.0".into()),
            proxy_url: Some("http://127.0.0.1:7890".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[tokio::test]
    async fn get_json_returns_cancelled_when_token_fired() {
        let client = build_client(&SourcesConfig::default()).expect("client");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<serde_json::Value, _> = get_json(
            &client,
            "test",
            "http://127.0.0.1:9/unreachable",
            &[],
            HeaderMap::new(),
            &cancel,
        )
        .await;
        assert!(matches!(result, Err(SearchError::Cancelled(_))));
    }
}
