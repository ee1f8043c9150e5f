// src/fetch/reddit.rs
//! Adapter for Reddit "top of the day" listings. The listing endpoint wraps
//! posts as `data.children[].data`; every field we read is optional on the
//! wire, so the deserialized shape defaults everything.

use anyhow::{Context, Result};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::fetch::{
    get_text, normalize_text, with_rate_limit_retry, SourceAdapter, RATE_LIMIT_RETRY_DELAY,
};
use crate::types::{RawItem, SourceKind};

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    // Reddit serializes this as a float.
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    subreddit: String,
}

const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

pub struct RedditAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl RedditAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Point the adapter at a different host (local stub in tests).
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn listing_url(&self, subreddit: &str, limit: usize) -> String {
        format!(
            "{}/r/{subreddit}/top.json?limit={limit}&t=day",
            self.base_url
        )
    }

    async fn try_fetch(&self, context: &str, limit: usize) -> Result<Vec<RawItem>> {
        let url = self.listing_url(context, limit);
        let body = with_rate_limit_retry(
            || get_text(&self.client, &url),
            RATE_LIMIT_RETRY_DELAY,
        )
        .await?;
        parse_listing(&body, context)
    }
}

/// Parse a listing body into raw items. Split out from the HTTP path so
/// fixtures exercise the exact mapping.
pub fn parse_listing(body: &str, context: &str) -> Result<Vec<RawItem>> {
    let t0 = std::time::Instant::now();
    let listing: Listing = serde_json::from_str(body).context("parsing reddit listing json")?;

    let mut out = Vec::with_capacity(listing.data.children.len());
    for child in listing.data.children {
        let post = child.data;
        let url = if post.url.is_empty() {
            format!("https://www.reddit.com{}", post.permalink)
        } else {
            post.url
        };
        let context = if post.subreddit.is_empty() {
            context.to_string()
        } else {
            post.subreddit
        };
        out.push(RawItem {
            id: post.id,
            title: normalize_text(&post.title),
            body: normalize_text(&post.selftext),
            url,
            primary_metric: post.score.max(0) as u64,
            secondary_metric: post.num_comments.max(0) as u64,
            created_utc: post.created_utc as i64,
            domain: post.domain.to_ascii_lowercase(),
            context,
            kind: SourceKind::Reddit,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("fetch_ms").record(ms);
    Ok(out)
}

#[async_trait::async_trait]
impl SourceAdapter for RedditAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Reddit
    }

    fn name(&self) -> &'static str {
        "reddit"
    }

    async fn fetch_recent(&self, context: &str, limit: usize) -> Vec<RawItem> {
        match self.try_fetch(context, limit).await {
            Ok(items) => {
                counter!("fetch_items_total").increment(items.len() as u64);
                items
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = self.name(), context, "fetch failed, skipping source context");
                counter!("fetch_errors_total").increment(1);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../../tests/fixtures/reddit_listing.json");

    #[test]
    fn fixture_maps_to_raw_items() {
        let items = parse_listing(FIXTURE, "programming").unwrap();
        assert_eq!(items.len(), 3);

        let first = &items[0];
        assert_eq!(first.id, "1abc23");
        assert_eq!(first.kind, SourceKind::Reddit);
        assert_eq!(first.context, "programming");
        assert_eq!(first.primary_metric, 2431);
        assert_eq!(first.secondary_metric, 312);
        assert_eq!(first.created_utc, 1735600000);
        assert_eq!(first.domain, "github.com");
    }

    #[test]
    fn missing_fields_get_defaults() {
        let body = r#"{"data":{"children":[{"data":{"id":"x1","subreddit":"rust"}}]}}"#;
        let items = parse_listing(body, "rust").unwrap();
        assert_eq!(items.len(), 1);
        let it = &items[0];
        assert_eq!(it.title, "");
        assert_eq!(it.body, "");
        assert_eq!(it.primary_metric, 0);
        assert_eq!(it.created_utc, 0);
        // empty url falls back to the permalink form
        assert_eq!(it.url, "https://www.reddit.com");
    }

    #[test]
    fn selftext_entities_are_normalized() {
        let body = r#"{"data":{"children":[{"data":{
            "id":"x2","title":"A &amp; B","selftext":"<b>bold</b>&nbsp;text","subreddit":"rust"
        }}]}}"#;
        let items = parse_listing(body, "rust").unwrap();
        assert_eq!(items[0].title, "A & B");
        assert_eq!(items[0].body, "bold text");
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(parse_listing("not json", "rust").is_err());
        assert!(parse_listing(r#"{"data":[]}"#, "rust").is_err());
    }
}
