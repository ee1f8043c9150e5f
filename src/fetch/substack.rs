// src/fetch/substack.rs
//! Adapter for Substack publication archives. The posts endpoint returns a
//! bare JSON array; ids are numeric, timestamps are RFC 3339 strings, and
//! the likes metric has appeared under two names over time.

use anyhow::{Context, Result};
use chrono::DateTime;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::fetch::{
    domain_of, get_text, join_text_parts, normalize_text, with_rate_limit_retry, SourceAdapter,
    RATE_LIMIT_RETRY_DELAY,
};
use crate::types::{RawItem, SourceKind};

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    canonical_url: String,
    #[serde(default)]
    post_date: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    likes: Option<u64>,
    #[serde(default)]
    reaction_count: Option<u64>,
    #[serde(default)]
    comment_count: u64,
    #[serde(default)]
    publication: Option<Publication>,
}

#[derive(Debug, Deserialize)]
struct Publication {
    #[serde(default)]
    name: String,
}

const DEFAULT_BASE_URL: &str = "https://api.substack.com";

pub struct SubstackAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl SubstackAdapter {
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

    fn posts_url(&self, publication: &str, limit: usize) -> String {
        format!(
            "{}/api/v1/publication/{publication}/posts?limit={limit}",
            self.base_url
        )
    }

    async fn try_fetch(&self, context: &str, limit: usize) -> Result<Vec<RawItem>> {
        let url = self.posts_url(context, limit);
        let body = with_rate_limit_retry(
            || get_text(&self.client, &url),
            RATE_LIMIT_RETRY_DELAY,
        )
        .await?;
        parse_posts(&body, context)
    }
}

fn id_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_rfc3339_to_unix(ts: &str) -> i64 {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

/// Parse a publication archive body into raw items.
pub fn parse_posts(body: &str, context: &str) -> Result<Vec<RawItem>> {
    let t0 = std::time::Instant::now();
    let posts: Vec<Post> = serde_json::from_str(body).context("parsing substack posts json")?;

    let mut out = Vec::with_capacity(posts.len());
    for post in posts {
        let created_utc = post
            .post_date
            .as_deref()
            .or(post.published_at.as_deref())
            .map(parse_rfc3339_to_unix)
            .unwrap_or(0);
        let context = match &post.publication {
            Some(p) if !p.name.is_empty() => p.name.clone(),
            _ => context.to_string(),
        };
        let body_text = normalize_text(&join_text_parts(&[&post.subtitle, &post.description]));
        out.push(RawItem {
            id: id_string(&post.id),
            title: normalize_text(&post.title),
            body: body_text,
            domain: domain_of(&post.canonical_url),
            url: post.canonical_url,
            primary_metric: post.likes.or(post.reaction_count).unwrap_or(0),
            secondary_metric: post.comment_count,
            created_utc,
            context,
            kind: SourceKind::Substack,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("fetch_ms").record(ms);
    Ok(out)
}

#[async_trait::async_trait]
impl SourceAdapter for SubstackAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Substack
    }

    fn name(&self) -> &'static str {
        "substack"
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
