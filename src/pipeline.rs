// src/pipeline.rs
//! Orchestrates one run: Fetch → Filter → Classify → Enrich → Merge.
//! Each invocation is independent; nothing persists between runs, and
//! identical raw input yields identical output.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use metrics::{counter, gauge};

use crate::classify::Classifier;
use crate::config::PipelineConfig;
use crate::enrich::Enricher;
use crate::fetch::{ensure_metrics_described, SourceAdapter};
use crate::filter::QualityFilter;
use crate::rank::RankMerger;
use crate::types::{Category, ProcessedItem, RankedList, RawItem, SourceKind};

/// Final pipeline output, handed to the presentation layer. A `BTreeMap`
/// keeps category iteration (and serialization) deterministic.
pub type Digest = BTreeMap<Category, RankedList>;

pub struct Pipeline {
    cfg: PipelineConfig,
    filter: QualityFilter,
    classifier: Classifier,
    enricher: Enricher,
    merger: RankMerger,
}

impl Pipeline {
    /// Compiles every configured pattern up front; a bad config fails here,
    /// never mid-run.
    pub fn new(cfg: PipelineConfig) -> Result<Self> {
        let filter = QualityFilter::new(cfg.filter.clone())?;
        let classifier = Classifier::new(cfg.classifier.clone())?;
        let enricher = Enricher::new(cfg.enricher.clone())?;
        let merger = RankMerger::new(cfg.rank.clone());
        Ok(Self {
            cfg,
            filter,
            classifier,
            enricher,
            merger,
        })
    }

    /// One full run against live sources.
    pub async fn run(&self, adapters: &[Arc<dyn SourceAdapter>]) -> Digest {
        ensure_metrics_described();
        let raw = self.fetch_all(adapters).await;
        let now = Utc::now().timestamp();
        gauge!("pipeline_last_run_ts").set(now as f64);
        self.process_items(raw, now)
    }

    /// Fetch phase: one job per (adapter, source context), run in bounded
    /// batches with a fixed pause between batches. A rate-limit retry
    /// inside one job delays only that job's task, never its siblings.
    /// Sources share no state; results are concatenated afterwards.
    pub async fn fetch_all(&self, adapters: &[Arc<dyn SourceAdapter>]) -> Vec<RawItem> {
        let mut jobs: Vec<(Arc<dyn SourceAdapter>, String, usize)> = Vec::new();
        for adapter in adapters {
            let (contexts, limit) = match adapter.kind() {
                SourceKind::Reddit => (
                    &self.cfg.sources.subreddits,
                    self.cfg.sources.posts_per_subreddit,
                ),
                SourceKind::Substack => (
                    &self.cfg.sources.publications,
                    self.cfg.sources.posts_per_publication,
                ),
            };
            for ctx in contexts {
                jobs.push((Arc::clone(adapter), ctx.clone(), limit));
            }
        }

        let batch_size = self.cfg.fetch.batch_size.max(1);
        let delay = Duration::from_secs(self.cfg.fetch.batch_delay_secs);

        let mut out = Vec::new();
        for (i, batch) in jobs.chunks(batch_size).enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let mut set = tokio::task::JoinSet::new();
            for (adapter, ctx, limit) in batch.iter().cloned() {
                set.spawn(async move { adapter.fetch_recent(&ctx, limit).await });
            }
            while let Some(res) = set.join_next().await {
                match res {
                    Ok(items) => out.extend(items),
                    Err(e) => tracing::warn!(error = ?e, "fetch task failed to join"),
                }
            }
        }

        tracing::info!(items = out.len(), jobs = jobs.len(), "fetch phase complete");
        out
    }

    /// Pure process stage: filter → classify → enrich → group by category →
    /// merge. Exposed separately so callers (and tests) can run it on a
    /// captured item set without touching the network.
    pub fn process_items(&self, raw: Vec<RawItem>, now: i64) -> Digest {
        let total = raw.len();
        let mut by_category: BTreeMap<Category, Vec<ProcessedItem>> = BTreeMap::new();
        let mut kept = 0usize;

        for item in raw {
            if !self.filter.is_acceptable(&item, now) {
                counter!("filter_rejected_total").increment(1);
                continue;
            }
            kept += 1;
            let category = self.classifier.classify(&item);
            let processed = self.enricher.enrich(item, category);
            by_category.entry(category).or_default().push(processed);
        }
        counter!("pipeline_kept_total").increment(kept as u64);

        // The merge is the single synchronization point: it sees every
        // source's surviving items for a category at once.
        let mut digest = Digest::new();
        for (category, items) in by_category {
            digest.insert(category, self.merger.merge(items));
        }

        tracing::info!(total, kept, categories = digest.len(), "process stage complete");
        digest
    }
}
