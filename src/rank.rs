// src/rank.rs
//! Cross-source ranking merge. The only component that reasons about
//! cross-source comparability: a per-source multiplier maps each native
//! engagement metric onto a common scale before sorting.

use crate::config::RankConfig;
use crate::types::{ProcessedItem, RankedList, SourceKind};

pub struct RankMerger {
    cfg: RankConfig,
}

impl RankMerger {
    pub fn new(cfg: RankConfig) -> Self {
        Self { cfg }
    }

    /// Primary metric on the common scale.
    pub fn normalized_score(&self, item: &ProcessedItem) -> f64 {
        item.item.primary_metric as f64 * self.cfg.multiplier_for(item.item.kind)
    }

    /// Merge one category's items from all sources: cap each source's
    /// contribution, concatenate in source-kind order, stable-sort by
    /// normalized score descending, truncate to the merge cap. Ties keep
    /// the per-source ordering.
    pub fn merge(&self, items: Vec<ProcessedItem>) -> RankedList {
        let mut merged = Vec::with_capacity(items.len().min(self.cfg.merge_cap));

        for kind in SourceKind::ALL {
            let mut from_source: Vec<ProcessedItem> = items
                .iter()
                .filter(|it| it.item.kind == kind)
                .cloned()
                .collect();
            from_source.sort_by(|a, b| {
                self.normalized_score(b).total_cmp(&self.normalized_score(a))
            });
            from_source.truncate(self.cfg.per_source_cap);
            merged.extend(from_source);
        }

        merged.sort_by(|a, b| self.normalized_score(b).total_cmp(&self.normalized_score(a)));
        merged.truncate(self.cfg.merge_cap);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, RawItem};

    fn processed(id: &str, metric: u64, kind: SourceKind) -> ProcessedItem {
        ProcessedItem {
            item: RawItem {
                id: id.to_string(),
                title: String::new(),
                body: String::new(),
                url: String::new(),
                primary_metric: metric,
                secondary_metric: 0,
                created_utc: 0,
                domain: String::new(),
                context: String::new(),
                kind,
            },
            category: Category::IndustryNews,
            tags: Vec::new(),
            summary: String::new(),
        }
    }

    fn merger() -> RankMerger {
        RankMerger::new(RankConfig::default())
    }

    #[test]
    fn sorts_descending_by_normalized_score() {
        let items = vec![
            processed("a", 100, SourceKind::Reddit),
            processed("b", 900, SourceKind::Reddit),
            processed("c", 500, SourceKind::Reddit),
        ];
        let out = merger().merge(items);
        let ids: Vec<&str> = out.iter().map(|i| i.item.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn multiplier_makes_likes_comparable_to_upvotes() {
        // 5 from each source; substack likes are scaled x10
        let mut items = Vec::new();
        for (i, score) in [2000u64, 1800, 1500, 1200, 1000].iter().enumerate() {
            items.push(processed(&format!("r{i}"), *score, SourceKind::Reddit));
        }
        for (i, likes) in [300u64, 250, 160, 90, 60].iter().enumerate() {
            items.push(processed(&format!("s{i}"), *likes, SourceKind::Substack));
        }
        let out = merger().merge(items);
        assert!(out.len() <= 10);

        let ids: Vec<&str> = out.iter().map(|i| i.item.id.as_str()).collect();
        // 300*10=3000, 250*10=2500 beat the best reddit post at 2000
        assert_eq!(ids[0], "s0");
        assert_eq!(ids[1], "s1");
        assert_eq!(ids[2], "r0");

        let m = merger();
        for pair in out.windows(2) {
            assert!(m.normalized_score(&pair[0]) >= m.normalized_score(&pair[1]));
        }
    }

    #[test]
    fn per_source_cap_limits_a_dominating_source() {
        let mut items = Vec::new();
        for i in 0..8 {
            items.push(processed(&format!("r{i}"), 10_000 - i as u64, SourceKind::Reddit));
        }
        items.push(processed("s0", 10, SourceKind::Substack));
        let out = merger().merge(items);

        let reddit_count = out
            .iter()
            .filter(|i| i.item.kind == SourceKind::Reddit)
            .count();
        assert_eq!(reddit_count, 5);
        assert!(out.iter().any(|i| i.item.id == "s0"));
    }

    #[test]
    fn output_never_exceeds_merge_cap() {
        let mut items = Vec::new();
        for i in 0..20 {
            let kind = if i % 2 == 0 {
                SourceKind::Reddit
            } else {
                SourceKind::Substack
            };
            items.push(processed(&format!("i{i}"), 1000 + i as u64, kind));
        }
        let out = merger().merge(items);
        assert!(out.len() <= 10);
    }

    #[test]
    fn ties_keep_per_source_order() {
        let items = vec![
            processed("first", 500, SourceKind::Reddit),
            processed("second", 500, SourceKind::Reddit),
        ];
        let out = merger().merge(items);
        let ids: Vec<&str> = out.iter().map(|i| i.item.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(merger().merge(Vec::new()).is_empty());
    }
}
