//! Outbound link discovery in post content.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static ANCHOR_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["'](?P<url>[^"']*)["'][^>]*>"#).expect("valid regex")
});

/// Cheap pre-filter: does the content mention any absolute web URL at all?
pub fn mentions_web_url(content: &str) -> bool {
    let lower = content.to_ascii_lowercase();
    lower.contains("http://") || lower.contains("https://")
}

/// Absolute `http`/`https` link targets of the `<a href>` anchors in
/// `content`, HTML entities decoded, in document order without repeats.
pub fn extract_link_urls(content: &str) -> Vec<Url> {
    let decoded = html_escape::decode_html_entities(content);
    let mut urls: Vec<Url> = Vec::new();

    for caps in ANCHOR_HREF_RE.captures_iter(&decoded) {
        let candidate = caps["url"].trim();
        let Ok(url) = Url::parse(candidate) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    urls
}

/// Host part of `url`, used as the display domain of a pingback source.
pub fn domain_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
