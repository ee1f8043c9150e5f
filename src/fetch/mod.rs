// src/fetch/mod.rs
//! Source adapters: one per external source kind. Each adapter maps its
//! source's native JSON shape into [`RawItem`] and never fails its caller;
//! fetch/parse problems are logged, counted, and surface as an empty list.

pub mod reddit;
pub mod substack;

use anyhow::{anyhow, Context, Result};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::time::Duration;

use crate::types::{RawItem, SourceKind};

/// Fixed wait before the single rate-limit retry.
pub const RATE_LIMIT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// One-time metrics registration (so series carry descriptions if the host
/// installs a recorder).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_items_total", "Raw items parsed from sources.");
        describe_counter!("fetch_errors_total", "Source fetch/parse failures.");
        describe_counter!(
            "fetch_rate_limited_total",
            "HTTP 429 responses that triggered the bounded retry."
        );
        describe_counter!("filter_rejected_total", "Items dropped by the quality filter.");
        describe_counter!("pipeline_kept_total", "Items surviving filter + enrichment.");
        describe_histogram!("fetch_ms", "Per-source fetch+parse time in milliseconds.");
        describe_gauge!("pipeline_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// Fetches recent items for one source-context (a subreddit, a publication
/// slug). Implementations must supply sane defaults for anything the source
/// omits: empty string for missing text, 0 for missing timestamps/metrics.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    fn kind(&self) -> SourceKind;
    fn name(&self) -> &'static str;
    /// Never fails the run: on any network/HTTP/parse problem this logs,
    /// bumps `fetch_errors_total`, and returns an empty list.
    async fn fetch_recent(&self, context: &str, limit: usize) -> Vec<RawItem>;
}

/// Outcome of a single HTTP attempt, before retry policy is applied.
#[derive(Debug)]
pub enum FetchOutcome {
    Body(String),
    RateLimited,
    Failed(u16),
}

/// Issue one GET and classify the response for the retry policy.
pub async fn get_text(client: &reqwest::Client, url: &str) -> Result<FetchOutcome> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if status.as_u16() == 429 {
        return Ok(FetchOutcome::RateLimited);
    }
    if !status.is_success() {
        return Ok(FetchOutcome::Failed(status.as_u16()));
    }
    let body = resp.text().await.context("reading response body")?;
    Ok(FetchOutcome::Body(body))
}

/// Run `attempt`; on a rate-limit signal wait `delay` and retry the same
/// request exactly once. A second rate limit, or any other failure, is a
/// transient fetch failure for the caller to absorb. Generic over the
/// attempt closure so the policy is testable without a live endpoint.
pub async fn with_rate_limit_retry<F, Fut>(mut attempt: F, delay: Duration) -> Result<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<FetchOutcome>>,
{
    match attempt().await? {
        FetchOutcome::Body(b) => Ok(b),
        FetchOutcome::Failed(code) => Err(anyhow!("http status {code}")),
        FetchOutcome::RateLimited => {
            counter!("fetch_rate_limited_total").increment(1);
            tokio::time::sleep(delay).await;
            match attempt().await? {
                FetchOutcome::Body(b) => Ok(b),
                FetchOutcome::RateLimited => Err(anyhow!("still rate limited after one retry")),
                FetchOutcome::Failed(code) => Err(anyhow!("http status {code} on retry")),
            }
        }
    }
}

/// Normalize source text: HTML entity decode, strip tags, collapse
/// whitespace. Sentence punctuation is kept — the summarizer splits on it.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // Length cap: 4000 chars keeps summaries and matching bounded.
    if out.chars().count() > 4000 {
        out = out.chars().take(4000).collect();
    }
    out
}

/// Join non-empty text fragments with ". " (used by adapters that split
/// body text across several optional fields).
pub(crate) fn join_text_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}

/// Best-effort host extraction, without pulling in a URL parser for one
/// field: strips the scheme and cuts at the first path separator.
pub(crate) fn domain_of(url: &str) -> String {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    rest.split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}
