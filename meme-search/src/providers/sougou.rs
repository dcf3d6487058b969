//! Sougou image search: sticker-tagged results from a public JSON API.
//!
//! Uses the PC search endpoint at `https://pic.sogou.com/napi/pc/searchList`
//! with a fixed sticker tag, 48 results per page.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::SourcesConfig;
use crate::error::SearchError;
use crate::http;
use crate::orchestrator::url_normalize::{detect_format, is_valid_image_url, normalize_image_url};
use crate::provider::Provider;
use crate::types::{Meme, SearchOptions};

const DEFAULT_BASE_URL: &str = "https://pic.sogou.com";
const SEARCH_PATH: &str = "/napi/pc/searchList";
const PAGE_SIZE: u32 = 48;
/// Signature of the fixed "表情包" (sticker) tag filter.
const STICKER_TAG: &str = "表情包,5e604ff6";
const DEFAULT_TITLE: &str = "搜狗表情";

/// Sougou picture search provider.
pub struct SougouProvider {
    client: reqwest::Client,
    base_url: String,
}

impl SougouProvider {
    /// Identifier used for registration and as [`Meme::platform`].
    pub const ID: &'static str = "sougou";

    /// Create the provider with a client built from `config`.
    pub fn new(config: &SourcesConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config)?,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SougouResponse {
    #[serde(default)]
    data: SougouData,
}

#[derive(Debug, Default, Deserialize)]
struct SougouData {
    #[serde(default)]
    items: Vec<SougouItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SougouItem {
    loc_image_link: String,
    thumb_url: String,
    ori_pic_url: String,
    pic_url: String,
    title: String,
    width: u32,
    height: u32,
}

#[async_trait]
impl Provider for SougouProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "搜狗表情"
    }

    fn description(&self) -> &str {
        "Sticker search via the Sougou picture JSON API"
    }

    async fn search(
        &self,
        keyword: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Meme>, SearchError> {
        let start = (options.effective_page() - 1)
            .checked_mul(PAGE_SIZE)
            .ok_or_else(|| SearchError::Config(format!("page {} is out of range", options.page)))?;
        let query = [
            ("mode", "1".to_string()),
            ("tagQSign", STICKER_TAG.to_string()),
            ("start", start.to_string()),
            ("xml_len", PAGE_SIZE.to_string()),
            ("query", keyword.to_string()),
            ("channel", "pc_pic".to_string()),
            ("scene", "pic_result".to_string()),
        ];

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));
        headers.insert(REFERER, HeaderValue::from_static("https://pic.sogou.com/pics"));

        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let response: SougouResponse =
            http::get_json(&self.client, Self::ID, &url, &query, headers, cancel).await?;

        Ok(collect_items(response, options))
    }
}

/// Convert a decoded response into memes.
///
/// Image URL preference: original > page > CDN > thumbnail.
fn collect_items(response: SougouResponse, options: &SearchOptions) -> Vec<Meme> {
    let mut memes: Vec<Meme> = response
        .data
        .items
        .into_iter()
        .filter_map(|item| {
            let raw = [&item.ori_pic_url, &item.pic_url, &item.loc_image_link, &item.thumb_url]
                .into_iter()
                .find(|u| !u.trim().is_empty())?;
            let url = normalize_image_url(raw);
            if !is_valid_image_url(&url) {
                return None;
            }
            let title = if item.title.trim().is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                item.title.trim().to_string()
            };
            Some(Meme {
                title,
                format: detect_format(&url),
                url,
                platform: SougouProvider::ID.to_string(),
                width: (item.width > 0).then_some(item.width),
                height: (item.height > 0).then_some(item.height),
            })
        })
        .collect();
    options.apply_limit(&mut memes);
    memes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SougouResponse {
        serde_json::from_str(json).expect("valid fixture")
    }

    #[test]
    fn prefers_original_picture_url() {
        let response = parse(
            r#"{"status":0,"data":{"items":[
                {"oriPicUrl":"http://img.test/ori.gif","picUrl":"https://img.test/pic.gif",
                 "thumbUrl":"https://img.test/thumb.jpg","title":"猫","width":200,"height":150}
            ]}}"#,
        );
        let items = collect_items(response, &SearchOptions::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://img.test/ori.gif");
        assert_eq!(items[0].title, "猫");
        assert_eq!(items[0].width, Some(200));
        assert_eq!(items[0].format, Some(crate::types::ImageFormat::Gif));
        assert_eq!(items[0].platform, "sougou");
    }

    #[test]
    fn falls_back_through_url_fields() {
        let response = parse(
            r#"{"data":{"items":[
                {"locImageLink":"https://cdn.test/img/abc","title":""},
                {"thumbUrl":"https://cdn.test/t.png"}
            ]}}"#,
        );
        let items = collect_items(response, &SearchOptions::default());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "https://cdn.test/img/abc");
        assert_eq!(items[0].title, DEFAULT_TITLE);
        assert_eq!(items[0].format, None);
        assert_eq!(items[0].width, None);
        assert_eq!(items[1].url, "https://cdn.test/t.png");
    }

    #[test]
    fn skips_items_without_usable_url() {
        let response = parse(
            r#"{"data":{"items":[
                {"title":"empty"},
                {"oriPicUrl":"https://example.com/page","title":"not an image"}
            ]}}"#,
        );
        assert!(collect_items(response, &SearchOptions::default()).is_empty());
    }

    #[test]
    fn applies_limit() {
        let response = parse(
            r#"{"data":{"items":[
                {"oriPicUrl":"https://img.test/1.gif"},
                {"oriPicUrl":"https://img.test/2.gif"},
                {"oriPicUrl":"https://img.test/3.gif"}
            ]}}"#,
        );
        let options = SearchOptions {
            limit: 2,
            ..Default::default()
        };
        assert_eq!(collect_items(response, &options).len(), 2);
    }

    #[test]
    fn missing_data_is_empty() {
        let response = parse(r#"{"status":1}"#);
        assert!(collect_items(response, &SearchOptions::default()).is_empty());
    }

    #[test]
    fn metadata() {
        let provider = SougouProvider::new(&SourcesConfig::default()).expect("provider");
        assert_eq!(provider.id(), "sougou");
        assert!(!provider.requires_auth());
    }

    #[tokio::test]
    async fn huge_page_is_config_error_without_request() {
        let provider = SougouProvider::new(&SourcesConfig::default())
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
