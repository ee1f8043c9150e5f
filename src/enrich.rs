// src/enrich.rs
//! Derives lightweight metadata for accepted items: up to five lowercase
//! tags and a short summary (heuristic truncation, not NLP).

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::config::EnricherConfig;
use crate::types::{Category, ProcessedItem, RawItem};

/// Hard cap on summary length, characters.
pub const SUMMARY_MAX_CHARS: usize = 200;
/// Truncation point leaving room for the `...` marker.
const SUMMARY_TRUNCATE_AT: usize = 197;
/// Sentence fragments at or below this length are noise, not sentences.
const MIN_FRAGMENT_CHARS: usize = 20;
/// Tags shorter than this carry no signal.
const MIN_TAG_CHARS: usize = 2;
/// Cap on tags per item, discovery order.
const MAX_TAGS: usize = 5;

pub struct Enricher {
    noisy_domains: Regex,
    tech_keywords: Vec<String>,
}

impl Enricher {
    pub fn new(cfg: EnricherConfig) -> Result<Self> {
        let noisy_domains = Regex::new(&format!("(?i){}", cfg.noisy_domain_pattern))
            .context("compiling noisy-domain pattern")?;
        Ok(Self {
            noisy_domains,
            tech_keywords: cfg.tech_keywords.iter().map(|k| k.to_lowercase()).collect(),
        })
    }

    pub fn enrich(&self, item: RawItem, category: Category) -> ProcessedItem {
        let tags = self.generate_tags(&item);
        let summary = generate_summary(&item);
        ProcessedItem {
            item,
            category,
            tags,
            summary,
        }
    }

    /// Tags: source context, then the stripped origin domain (unless it is
    /// a generic/noisy one), then any configured tech keyword found in the
    /// text. Lowercase, deduplicated, at most five, each ≥2 chars.
    pub fn generate_tags(&self, item: &RawItem) -> Vec<String> {
        let haystack = format!("{} {}", item.title, item.body).to_lowercase();
        let mut tags: Vec<String> = Vec::new();

        push_tag(&mut tags, item.context.to_lowercase());

        let domain = strip_domain(&item.domain);
        if !domain.is_empty() && !self.noisy_domains.is_match(&domain) {
            push_tag(&mut tags, domain);
        }

        for kw in &self.tech_keywords {
            if haystack.contains(kw.as_str()) {
                push_tag(&mut tags, kw.clone());
            }
        }

        tags.truncate(MAX_TAGS);
        tags
    }
}

fn push_tag(tags: &mut Vec<String>, tag: String) {
    if tag.chars().count() >= MIN_TAG_CHARS && !tags.contains(&tag) {
        tags.push(tag);
    }
}

/// Drop a leading `www.` and a trailing `.com` before using a domain as
/// a tag.
fn strip_domain(domain: &str) -> String {
    let d = domain.to_lowercase();
    let d = d.strip_prefix("www.").unwrap_or(&d);
    let d = d.strip_suffix(".com").unwrap_or(d);
    d.to_string()
}

/// Summary: body text (title when the body is empty), verbatim when short.
/// Longer text is reduced to the first two real sentences; if that still
/// overflows, or no fragment qualifies as a sentence, hard-truncate with an
/// ellipsis marker.
pub fn generate_summary(item: &RawItem) -> String {
    let content = if item.body.is_empty() {
        item.title.as_str()
    } else {
        item.body.as_str()
    };

    if content.chars().count() <= SUMMARY_MAX_CHARS {
        return content.to_string();
    }

    static RE_SENTENCE_END: OnceCell<Regex> = OnceCell::new();
    let re = RE_SENTENCE_END.get_or_init(|| Regex::new(r"([.!?])\s+").unwrap());

    let marked = re.replace_all(content, "$1\u{1}");
    let joined = marked
        .split('\u{1}')
        .filter(|s| s.chars().count() > MIN_FRAGMENT_CHARS)
        .take(2)
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() || joined.chars().count() > SUMMARY_MAX_CHARS {
        let base = if joined.is_empty() { content } else { &joined };
        let mut out: String = base.chars().take(SUMMARY_TRUNCATE_AT).collect();
        out.push_str("...");
        return out;
    }
    joined
}
