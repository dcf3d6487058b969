//! Doutub sticker API.
//!
//! `https://api.doutub.com/api/bq/getBqlistByKeyword` returns a paged list
//! of sticker paths. The image host rejects requests without its own
//! referer, so URLs are optionally rewritten through the image proxy.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::SourcesConfig;
use crate::error::SearchError;
use crate::http;
use crate::orchestrator::url_normalize::{
    apply_image_proxy, detect_format, is_valid_image_url, normalize_image_url,
};
use crate::provider::Provider;
use crate::types::{Meme, SearchOptions};

const DEFAULT_BASE_URL: &str = "https://api.doutub.com";
const SEARCH_PATH: &str = "/api/bq/getBqlistByKeyword";
const SITE_REFERER: &str = "https://www.doutub.com/";
const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 50;
const DEFAULT_TITLE: &str = "Doutub表情";

/// Doutub sticker search provider.
pub struct DoutubProvider {
    client: reqwest::Client,
    base_url: String,
    image_proxy_url: Option<String>,
}

impl DoutubProvider {
    /// Identifier used for registration and as [`Meme::platform`].
    pub const ID: &'static str = "doutub";

    /// Create the provider with a client built from `config`.
    pub fn new(config: &SourcesConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_proxy_url: config.image_proxy_url.clone(),
        })
    }

    /// Point the provider at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct DoutubResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: DoutubData,
}

#[derive(Debug, Default, Deserialize)]
struct DoutubData {
    #[serde(default)]
    rows: Vec<DoutubRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DoutubRow {
    img_name: String,
    path: String,
}

/// Page size sent to the API: the caller's limit clamped to `1..=50`.
fn page_size(options: &SearchOptions) -> usize {
    match options.limit {
        0 => DEFAULT_PAGE_SIZE,
        n => n.min(MAX_PAGE_SIZE),
    }
}

#[async_trait]
impl Provider for DoutubProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "表情包API"
    }

    fn description(&self) -> &str {
        "Sticker search via the api.doutub.com JSON API"
    }

    async fn search(
        &self,
        keyword: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Meme>, SearchError> {
        let query = [
            ("keyword", keyword.to_string()),
            ("curPage", options.effective_page().to_string()),
            ("pageSize", page_size(options).to_string()),
        ];

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.doutub.com"));
        headers.insert(REFERER, HeaderValue::from_static(SITE_REFERER));

        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let response: DoutubResponse =
            http::get_json(&self.client, Self::ID, &url, &query, headers, cancel).await?;

        collect_items(response, self.image_proxy_url.as_deref())
    }
}

fn collect_items(
    response: DoutubResponse,
    image_proxy: Option<&str>,
) -> Result<Vec<Meme>, SearchError> {
    if response.code != 1 {
        return Err(SearchError::Decode(format!(
            "doutub api returned code {}: {}",
            response.code, response.msg
        )));
    }

    let memes = response
        .data
        .rows
        .into_iter()
        .filter_map(|row| {
            if row.path.trim().is_empty() {
                return None;
            }
            let url = normalize_image_url(&row.path);
            if !is_valid_image_url(&url) {
                return None;
            }
            let format = detect_format(&url);
            let url = match image_proxy {
                Some(proxy) => apply_image_proxy(&url, proxy, SITE_REFERER),
                None => url,
            };
            let title = if row.img_name.trim().is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                row.img_name.trim().to_string()
            };
            Some(Meme {
                title,
                url,
                platform: DoutubProvider::ID.to_string(),
                width: None,
                height: None,
                format,
            })
        })
        .collect();
    Ok(memes)
}
