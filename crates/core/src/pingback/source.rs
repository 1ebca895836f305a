//! Analysis of a fetched pingback source page.

use std::sync::LazyLock;

use regex::Regex;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));

/// An opening, closing or self-closing tag: `<` must be followed by an
/// element name, so bare comparison operators in a title do not match.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(\s[^<>]*)?/?>").expect("valid regex")
});

/// What a source page says about the target it claims to link to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingRequest {
    pub source_url: String,
    pub target_url: String,
    /// Trimmed `<title>` text, empty when the page has none.
    pub title: String,
    /// The title itself contains markup.
    pub contains_html: bool,
    /// The page body mentions the target URL (case-insensitive).
    pub source_has_link: bool,
}

impl PingRequest {
    /// Inspect the HTML of `source_url` for its title and a link to `target_url`.
    pub fn from_source_html(source_url: &str, target_url: &str, html: &str) -> Self {
        let title = extract_title(html).unwrap_or_default();
        Self {
            source_url: source_url.to_string(),
            target_url: target_url.to_string(),
            contains_html: contains_markup(&title),
            source_has_link: contains_link(html, target_url),
            title,
        }
    }
}

/// The trimmed text of the first `<title>` element.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
}

/// Whether `text` contains tag syntax.
///
/// A genuine page title never contains markup; a spam page that stuffs
/// content into `<title>` does.
pub fn contains_markup(text: &str) -> bool {
    TAG_RE.is_match(text)
}

/// Case-insensitive check that `html` mentions `target_url`.
pub fn contains_link(html: &str, target_url: &str) -> bool {
    if target_url.is_empty() {
        return false;
    }
    html.to_lowercase().contains(&target_url.to_lowercase())
}
