// src/filter.rs
//! Quality gate: drops low-engagement, stale, or non-substantive items
//! before classification. Pure per-item checks, cheapest first.

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::FilterConfig;
use crate::types::RawItem;

pub struct QualityFilter {
    cfg: FilterConfig,
    /// Lowercased copies so the substring checks stay allocation-free.
    low_value_domains: Vec<String>,
    low_value_keywords: Vec<String>,
    high_value: Regex,
}

impl QualityFilter {
    pub fn new(cfg: FilterConfig) -> Result<Self> {
        let high_value = Regex::new(&cfg.high_value_pattern)
            .context("compiling high-value url/domain pattern")?;
        let low_value_domains = cfg
            .low_value_domains
            .iter()
            .map(|d| d.to_lowercase())
            .collect();
        let low_value_keywords = cfg
            .low_value_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        Ok(Self {
            cfg,
            low_value_domains,
            low_value_keywords,
            high_value,
        })
    }

    /// All checks must pass. `now` is the fetch time in unix seconds;
    /// passing it in keeps the verdict reproducible.
    pub fn is_acceptable(&self, item: &RawItem, now: i64) -> bool {
        if item.primary_metric < self.cfg.min_engagement_for(item.kind) {
            return false;
        }
        if item.created_utc < now - self.cfg.recency_window_secs {
            return false;
        }
        if self.is_low_value_domain(&item.domain) {
            return false;
        }
        if self.has_low_value_keyword(item) {
            return false;
        }
        self.has_substance(item)
    }

    fn is_low_value_domain(&self, domain: &str) -> bool {
        let d = domain.to_lowercase();
        self.low_value_domains.iter().any(|bad| *bad == d)
    }

    fn has_low_value_keyword(&self, item: &RawItem) -> bool {
        let title = item.title.to_lowercase();
        let body = item.body.to_lowercase();
        self.low_value_keywords
            .iter()
            .any(|kw| title.contains(kw) || body.contains(kw))
    }

    /// Positive signal: enough title or body text, or a recognizably
    /// technical destination (code host, paper host, technical file).
    fn has_substance(&self, item: &RawItem) -> bool {
        item.title.chars().count() >= self.cfg.min_title_len
            || item.body.chars().count() >= self.cfg.min_body_len
            || self.high_value.is_match(&item.url)
            || self.high_value.is_match(&item.domain)
    }
}
