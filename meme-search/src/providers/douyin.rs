//! Douyin emoticon search. Requires a logged-in session cookie.
//!
//! Sticker URLs point at Douyin's image CDN, which serves the same content
//! ID from several mirror hosts; see [`crate::orchestrator::dedup`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE, REFERER};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::SourcesConfig;
use crate::error::SearchError;
use crate::http;
use crate::orchestrator::url_normalize::{detect_format, is_valid_image_url, normalize_image_url};
use crate::provider::Provider;
use crate::types::{Meme, SearchOptions};

const DEFAULT_BASE_URL: &str = "https://www.douyin.com";
const SEARCH_PATH: &str = "/aweme/v1/web/im/resource/emoticon/search";
const CURSOR_STEP: u32 = 10;
const DEFAULT_TITLE: &str = "抖音表情";

/// Douyin emoticon search provider.
pub struct DouyinProvider {
    client: reqwest::Client,
    base_url: String,
    cookie: String,
}

impl DouyinProvider {
    /// Identifier used for registration and as [`Meme::platform`].
    pub const ID: &'static str = "douyin";

    /// Create the provider with a client built from `config`.
    pub fn new(config: &SourcesConfig, cookie: impl Into<String>) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie: cookie.into(),
        })
    }

    /// Point the provider at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DouyinResponse {
    emoticon_data: EmoticonData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmoticonData {
    sticker_list: Vec<Sticker>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Sticker {
    author: Author,
    origin: Origin,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Author {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Origin {
    url_list: Vec<String>,
}

#[async_trait]
impl Provider for DouyinProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "抖音"
    }

    fn description(&self) -> &str {
        "Trending stickers from Douyin (requires cookie)"
    }

    fn requires_auth(&self) -> bool {
        true
    }

    async fn search(
        &self,
        keyword: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Meme>, SearchError> {
        if self.cookie.trim().is_empty() {
            return Err(SearchError::Config(
                "douyin provider requires a cookie".into(),
            ));
        }

        let cursor = (options.effective_page() - 1)
            .checked_mul(CURSOR_STEP)
            .ok_or_else(|| SearchError::Config(format!("page {} is out of range", options.page)))?;
        let query = [
            ("device_platform", "webapp".to_string()),
            ("aid", "1128".to_string()),
            ("keyword", keyword.to_string()),
            ("cursor", cursor.to_string()),
        ];

        let cookie = HeaderValue::from_str(&self.cookie)
            .map_err(|_| SearchError::Config("douyin cookie contains invalid characters".into()))?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.douyin.com/"));
        headers.insert(COOKIE, cookie);

        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let response: DouyinResponse =
            http::get_json(&self.client, Self::ID, &url, &query, headers, cancel).await?;

        Ok(collect_items(response, options))
    }
}

fn collect_items(response: DouyinResponse, options: &SearchOptions) -> Vec<Meme> {
    let mut memes: Vec<Meme> = response
        .emoticon_data
        .sticker_list
        .into_iter()
        .filter_map(|sticker| {
            let url = normalize_image_url(sticker.origin.url_list.first()?);
            if !is_valid_image_url(&url) {
                return None;
            }
            let title = if sticker.author.name.trim().is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                sticker.author.name.trim().to_string()
            };
            Some(Meme {
                title,
                format: detect_format(&url),
                url,
                platform: DouyinProvider::ID.to_string(),
                width: None,
                height: None,
            })
        })
        .collect();
    options.apply_limit(&mut memes);
    memes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> DouyinResponse {
        serde_json::from_str(json).expect("valid fixture")
    }

    #[test]
    fn first_origin_url_is_used() {
        let response = parse(
            r#"{"emoticon_data":{"sticker_list":[
                {"author":{"name":"小明"},"origin":{"url_list":[
                    "https://p3.douyinpic.com/tos-cn-i-0813/abc~tplv.webp",
                    "https://p9.douyinpic.com/tos-cn-i-0813/abc~tplv.webp"
                ]}}
            ]}}"#,
        );
        let items = collect_items(response, &SearchOptions::default());
        assert_eq!(items.len(), 1);
        assert!(items[0].url.starts_with("https://p3."));
        assert_eq!(items[0].title, "小明");
        assert_eq!(items[0].format, Some(crate::types::ImageFormat::Webp));
    }

    #[test]
    fn stickers_without_urls_skipped() {
        let response = parse(
            r#"{"emoticon_data":{"sticker_list":[
                {"author":{"name":""},"origin":{"url_list":[]}},
                {"origin":{"url_list":["https://p3.douyinpic.com/sticker/x"]}}
            ]}}"#,
        );
        let items = collect_items(response, &SearchOptions::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, DEFAULT_TITLE);
    }

    #[test]
    fn empty_body_is_empty_result() {
        assert!(collect_items(parse("{}"), &SearchOptions::default()).is_empty());
    }

    #[tokio::test]
    async fn blank_cookie_rejected_without_request() {
        let provider = DouyinProvider::new(&SourcesConfig::default(), "  ")
            .expect("provider")
            .with_base_url("http://127.0.0.1:9");
        let err = provider
            .search("cat", &SearchOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn requires_auth() {
        let provider = DouyinProvider::new(&SourcesConfig::default(), "c").expect("provider");
        assert!(provider.requires_auth());
        assert!(provider.descriptor().requires_auth);
    }

    #[tokio::test]
    async fn huge_page_is_config_error_without_request() {
        let provider = DouyinProvider::new(&SourcesConfig::default(), "sessionid=abc")
            .expect("provider")
            .with_base_url("http://127.0.0.1:9");
        let options = SearchOptions {
            page: u32::MAX,
            ..Default::default()
        };
        let err = provider
            .search("cat", &options, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
        assert!(err.to_string().contains("out of range"));
    }
}
