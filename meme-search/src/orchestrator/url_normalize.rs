//! Image URL normalisation and classification.
//!
//! Providers pass every candidate URL through [`normalize_image_url`] and
//! [`is_valid_image_url`] before emitting a [`crate::Meme`], so the
//! deduplicator sees a consistent form.

use crate::types::ImageFormat;

/// File extensions accepted as image URLs.
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"];

/// Path fragments that mark extension-less CDN image URLs.
const IMAGE_PATH_HINTS: &[&str] = &[
    "/img/", "/image/", "/pic/", "/photo/", "thumb", "emoji", "sticker",
];

/// Normalise a provider-supplied image URL.
///
/// Trims surrounding whitespace, completes protocol-relative URLs and
/// upgrades `http://` to `https://`.
///
/// # Examples
///
/// ```
/// use meme_search::orchestrator::url_normalize::normalize_image_url;
///
/// assert_eq!(normalize_image_url(" http://a.com/x.gif "), "https://a.com/x.gif");
/// assert_eq!(normalize_image_url("//a.com/x.gif"), "https://a.com/x.gif");
/// ```
pub fn normalize_image_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("https://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        trimmed.to_string()
    }
}

/// Returns `true` if `url` plausibly points at an image.
///
/// The URL must use http(s) and either contain a known image extension or
/// an image-like path fragment.
pub fn is_valid_image_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return false;
    }
    let lower = url.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
        || IMAGE_PATH_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Detect the image format from the URL, if recognisable.
pub fn detect_format(url: &str) -> Option<ImageFormat> {
    let lower = url.to_lowercase();
    if lower.contains(".gif") {
        Some(ImageFormat::Gif)
    } else if lower.contains(".png") {
        Some(ImageFormat::Png)
    } else if lower.contains(".webp") || lower.contains(".awebp") {
        Some(ImageFormat::Webp)
    } else if lower.contains(".jpg") || lower.contains(".jpeg") {
        Some(ImageFormat::Jpg)
    } else {
        None
    }
}

/// Rewrite `url` to be fetched through an image proxy.
///
/// Produces `{proxy}?url=<url>&referer=<referer>` with both values
/// percent-encoded. Falls back to the original URL if `proxy` is not a
/// valid URL.
pub fn apply_image_proxy(url: &str, proxy: &str, referer: &str) -> String {
    let Ok(mut proxied) = url::Url::parse(proxy) else {
        return url.to_string();
    };
    proxied
        .query_pairs_mut()
        .append_pair("url", url)
        .append_pair("referer", referer);
    proxied.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_upgraded_to_https() {
        assert_eq!(
            normalize_image_url("http://img.test/a.png"),
            "https://img.test/a.png"
        );
    }

    #[test]
    fn https_unchanged() {
        assert_eq!(
            normalize_image_url("https://img.test/a.png"),
            "https://img.test/a.png"
        );
    }

    #[test]
    fn whitespace_trimmed() {
        assert_eq!(
            normalize_image_url("\t https://img.test/a.png \n"),
            "https://img.test/a.png"
        );
    }

    #[test]
    fn protocol_relative_completed() {
        assert_eq!(
            normalize_image_url("//img.test/a.png"),
            "https://img.test/a.png"
        );
    }

    #[test]
    fn extension_urls_are_images() {
        assert!(is_valid_image_url("https://img.test/a.GIF"));
        assert!(is_valid_image_url("https://img.test/a.jpeg?x=1"));
        assert!(is_valid_image_url("https://img.test/a.webp"));
    }

    #[test]
    fn cdn_hint_urls_are_images() {
        assert!(is_valid_image_url("https://cdn.test/sticker/12345"));
        assert!(is_valid_image_url("https://cdn.test/img/abc"));
    }

    #[test]
    fn non_image_urls_rejected() {
        assert!(!is_valid_image_url(""));
        assert!(!is_valid_image_url("https://example.com/about"));
        assert!(!is_valid_image_url("ftp://img.test/a.gif"));
        assert!(!is_valid_image_url("/relative/a.gif"));
    }

    #[test]
    fn formats_detected() {
        assert_eq!(detect_format("https://a/x.gif"), Some(ImageFormat::Gif));
        assert_eq!(detect_format("https://a/x.PNG"), Some(ImageFormat::Png));
        assert_eq!(detect_format("https://a/x.awebp"), Some(ImageFormat::Webp));
        assert_eq!(detect_format("https://a/x.jpeg"), Some(ImageFormat::Jpg));
        assert_eq!(detect_format("https://a/sticker/1"), None);
    }

    #[test]
    fn image_proxy_encodes_parameters() {
        let proxied = apply_image_proxy(
            "https://img.test/a b.gif",
            "https://proxy.test/fetch",
            "https://www.doutub.com/",
        );
        let parsed = url::Url::parse(&proxied).expect("valid url");
        assert_eq!(parsed.host_str(), Some("proxy.test"));
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("url".to_string(), "https://img.test/a b.gif".to_string()),
                ("referer".to_string(), "https://www.doutub.com/".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_image_proxy_keeps_original() {
        assert_eq!(
            apply_image_proxy("https://img.test/a.gif", "nope", "https://r/"),
            "https://img.test/a.gif"
        );
    }
}
