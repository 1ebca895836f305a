//! Post permalink routing: `{prefix}/post/{yyyy}/{M}/{d}/{slug}`.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

static POST_ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://.*/post/(?P<year>\d{4})/(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<slug>[^/?#]+)/?(?:[?#].*)?$",
    )
    .expect("valid regex")
});

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("URL does not match the post route pattern: {0}")]
    Format(String),

    #[error("URL names an impossible date: {year}-{month}-{day}")]
    InvalidDate { year: i32, month: u32, day: u32 },
}

/// The slug and publish date a post permalink resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRoute {
    pub slug: String,
    pub pub_date: NaiveDate,
}

impl PostRoute {
    /// Parse a permalink such as `https://blog.example/post/2020/5/1/hello-world`.
    pub fn from_url(url: &str) -> Result<Self, RouteError> {
        let caps = POST_ROUTE_RE
            .captures(url.trim())
            .ok_or_else(|| RouteError::Format(url.to_string()))?;

        // The regex bounds every group to at most four digits.
        let number = |name: &str| -> Result<u32, RouteError> {
            caps[name]
                .parse()
                .map_err(|_| RouteError::Format(url.to_string()))
        };
        let year = number("year")? as i32;
        let month = number("month")?;
        let day = number("day")?;

        let pub_date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(RouteError::InvalidDate { year, month, day })?;

        Ok(Self {
            slug: caps["slug"].to_string(),
            pub_date,
        })
    }

    /// Build the canonical permalink under `prefix` (no trailing slash needed).
    pub fn to_url(&self, prefix: &str) -> String {
        format!(
            "{}/post/{}/{}/{}/{}",
            prefix.trim_end_matches('/'),
            self.pub_date.year(),
            self.pub_date.month(),
            self.pub_date.day(),
            self.slug,
        )
    }
}
