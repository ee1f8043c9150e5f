// src/config.rs
//! Process-wide pipeline configuration: source rosters, filter thresholds,
//! category keyword tables, enrichment lists, and score normalization.
//!
//! Loaded once at startup, read-only afterwards. Every section has an
//! in-code `default_seed()` so the pipeline runs without any config file;
//! a TOML file (env `PIPELINE_CONFIG_PATH`, fallback `config/pipeline.toml`)
//! can override any subset of sections.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Category, SourceKind};

pub const ENV_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub enricher: EnricherConfig,
    #[serde(default)]
    pub rank: RankConfig,
}

impl PipelineConfig {
    /// Load from an explicit TOML path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing pipeline config toml")
    }

    /// Resolve config using env var + fallbacks:
    /// 1) $PIPELINE_CONFIG_PATH (error if set but missing)
    /// 2) config/pipeline.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_path(&pb);
            }
            return Err(anyhow!("PIPELINE_CONFIG_PATH points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from_path(&default_p);
        }
        Ok(Self::default())
    }
}

/// Which communities and publications each adapter polls, and how many
/// items to request per context.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_subreddits")]
    pub subreddits: Vec<String>,
    #[serde(default = "default_publications")]
    pub publications: Vec<String>,
    #[serde(default = "default_reddit_limit")]
    pub posts_per_subreddit: usize,
    #[serde(default = "default_substack_limit")]
    pub posts_per_publication: usize,
}

fn default_reddit_limit() -> usize {
    100
}
fn default_substack_limit() -> usize {
    10
}

fn default_subreddits() -> Vec<String> {
    [
        "artificial",
        "technology",
        "programming",
        "coding",
        "softwareengineering",
        "MachineLearning",
        "ChatGPTPromptGenius",
        "ChatGPTCoding",
        "AZURE",
        "ChatGPT",
        "ClaudeAI",
        "OpenAI",
        "GeminiAI",
        "GoogleGeminiAI",
    ]
    .map(str::to_string)
    .to_vec()
}

fn default_publications() -> Vec<String> {
    [
        "artificialintelligenceweekly",
        "machinelearnings",
        "thesequence",
        "aiweekly",
        "bytes",
        "programming-digest",
        "levelup",
        "devops-weekly",
        "softwareleadweekly",
        "platformer",
        "stratechery",
        "theverge",
        "techmeme",
        "cloudweekly",
        "devopsish",
        "lastweekinkubernetes",
        "dataelixir",
        "datascience-weekly",
    ]
    .map(str::to_string)
    .to_vec()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            subreddits: default_subreddits(),
            publications: default_publications(),
            posts_per_subreddit: default_reddit_limit(),
            posts_per_publication: default_substack_limit(),
        }
    }
}

/// Fetch-phase knobs: concurrency bound, inter-batch pause, HTTP client.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Max simultaneous outstanding requests.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between successive batches, seconds.
    #[serde(default = "default_batch_delay")]
    pub batch_delay_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_batch_size() -> usize {
    5
}
fn default_batch_delay() -> u64 {
    1
}
fn default_timeout() -> u64 {
    15
}
fn default_user_agent() -> String {
    "technews-aggregator/0.1".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_secs: default_batch_delay(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Quality-filter thresholds and block lists.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Per-source minimum for the primary engagement metric.
    #[serde(default = "default_min_engagement")]
    pub min_engagement: BTreeMap<SourceKind, u64>,
    /// Fallback threshold for kinds missing from `min_engagement`.
    #[serde(default = "default_engagement_floor")]
    pub default_min_engagement: u64,
    /// Recency window relative to fetch time, seconds.
    #[serde(default = "default_recency_window")]
    pub recency_window_secs: i64,
    /// Exact-match (case-insensitive) origin domains to drop.
    #[serde(default = "default_low_value_domains")]
    pub low_value_domains: Vec<String>,
    /// Case-insensitive substrings that disqualify title or body.
    #[serde(default = "default_low_value_keywords")]
    pub low_value_keywords: Vec<String>,
    /// Substance signal: minimum title length…
    #[serde(default = "default_min_title_len")]
    pub min_title_len: usize,
    /// …or minimum body length…
    #[serde(default = "default_min_body_len")]
    pub min_body_len: usize,
    /// …or url/domain matching this pattern (code hosts, paper hosts,
    /// technical file extensions).
    #[serde(default = "default_high_value_pattern")]
    pub high_value_pattern: String,
}

fn default_min_engagement() -> BTreeMap<SourceKind, u64> {
    BTreeMap::from([(SourceKind::Reddit, 1000), (SourceKind::Substack, 50)])
}
fn default_engagement_floor() -> u64 {
    50
}
fn default_recency_window() -> i64 {
    24 * 60 * 60
}
fn default_min_title_len() -> usize {
    40
}
fn default_min_body_len() -> usize {
    100
}
fn default_high_value_pattern() -> String {
    r"(?i)github\.com|gitlab\.com|arxiv\.org|\.pdf$|\.ipynb$".to_string()
}

fn default_low_value_domains() -> Vec<String> {
    ["i.redd.it", "i.imgur.com", "youtube.com", "youtu.be"]
        .map(str::to_string)
        .to_vec()
}

fn default_low_value_keywords() -> Vec<String> {
    [
        "meme",
        "funny",
        "joke",
        "[meme]",
        "[humor]",
        "sponsored",
        "promotion",
        "advertisement",
    ]
    .map(str::to_string)
    .to_vec()
}

impl FilterConfig {
    pub fn min_engagement_for(&self, kind: SourceKind) -> u64 {
        self.min_engagement
            .get(&kind)
            .copied()
            .unwrap_or(self.default_min_engagement)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_engagement: default_min_engagement(),
            default_min_engagement: default_engagement_floor(),
            recency_window_secs: default_recency_window(),
            low_value_domains: default_low_value_domains(),
            low_value_keywords: default_low_value_keywords(),
            min_title_len: default_min_title_len(),
            min_body_len: default_min_body_len(),
            high_value_pattern: default_high_value_pattern(),
        }
    }
}

/// How keyword phrases are matched against the haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Whole-word matches (`\b…\b`), the default.
    WordBoundary,
    /// Plain non-overlapping substring hits.
    Substring,
}

/// A fixed bonus granted to one category when the item's context string or
/// origin domain matches a pattern. Magnitudes are tunable data; the seeds
/// preserve the relative ordering the pipeline was tuned with.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextBoost {
    pub category: Category,
    pub field: BoostField,
    /// Regex applied case-insensitively.
    pub pattern: String,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostField {
    Context,
    Domain,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_category")]
    pub default_category: Category,
    #[serde(default = "default_match_mode")]
    pub match_mode: MatchMode,
    /// Keyword phrases per category. Lookup order follows the `Category`
    /// enumeration, not this map, so ties stay stable.
    #[serde(default = "default_keyword_tables")]
    pub keywords: BTreeMap<Category, Vec<String>>,
    #[serde(default = "default_boosts")]
    pub boosts: Vec<ContextBoost>,
}

fn default_category() -> Category {
    Category::IndustryNews
}
fn default_match_mode() -> MatchMode {
    MatchMode::WordBoundary
}

fn default_keyword_tables() -> BTreeMap<Category, Vec<String>> {
    let mut keywords = BTreeMap::new();
    keywords.insert(
        Category::AiMl,
        [
            "ai",
            "ml",
            "machine learning",
            "artificial intelligence",
            "deep learning",
            "chatgpt",
            "claude",
            "gemini",
            "llm",
            "gpt",
            "neural network",
            "transformer",
            "openai",
            "anthropic",
            "stable diffusion",
            "midjourney",
            "mlops",
            "model",
            "training",
            "inference",
            "prompt engineering",
        ]
        .map(str::to_string)
        .to_vec(),
    );
    keywords.insert(
        Category::Programming,
        [
            "programming",
            "software",
            "code",
            "development",
            "engineering",
            "api",
            "framework",
            "library",
            "backend",
            "frontend",
            "fullstack",
            "database",
            "architecture",
            "design pattern",
            "algorithm",
            "performance",
            "optimization",
            "testing",
            "deployment",
            "ci/cd",
            "version control",
            "git",
            "docker",
            "kubernetes",
            "microservices",
            "serverless",
            "typescript",
            "javascript",
            "python",
            "java",
            "golang",
            "rust",
        ]
        .map(str::to_string)
        .to_vec(),
    );
    keywords.insert(
        Category::BusinessTech,
        [
            "business",
            "enterprise",
            "startup",
            "company",
            "industry",
            "saas",
            "cloud",
            "aws",
            "azure",
            "gcp",
            "digital transformation",
            "automation",
            "productivity",
            "collaboration",
            "remote work",
            "security",
            "compliance",
            "regulation",
            "investment",
            "acquisition",
            "partnership",
            "market",
            "strategy",
            "innovation",
        ]
        .map(str::to_string)
        .to_vec(),
    );
    keywords.insert(
        Category::IndustryNews,
        [
            "announces",
            "launches",
            "releases",
            "update",
            "news",
            "report",
            "study",
            "research",
            "breakthrough",
            "discovery",
            "trend",
            "analysis",
            "forecast",
            "prediction",
            "impact",
            "change",
            "future",
            "development",
            "standard",
            "regulation",
        ]
        .map(str::to_string)
        .to_vec(),
    );
    keywords.insert(
        Category::ToolsResources,
        [
            "tool",
            "library",
            "framework",
            "resource",
            "guide",
            "tutorial",
            "documentation",
            "best practice",
            "example",
            "template",
            "boilerplate",
            "starter",
            "kit",
            "sdk",
            "api",
            "service",
            "platform",
            "solution",
            "utility",
        ]
        .map(str::to_string)
        .to_vec(),
    );
    keywords
}

fn default_boosts() -> Vec<ContextBoost> {
    vec![
        ContextBoost {
            category: Category::AiMl,
            field: BoostField::Context,
            pattern: "ai|ml|chatgpt|claude|gemini|learning".to_string(),
            points: 5,
        },
        ContextBoost {
            category: Category::Programming,
            field: BoostField::Context,
            pattern: "programming|coding|developer|webdev".to_string(),
            points: 5,
        },
        ContextBoost {
            category: Category::ToolsResources,
            field: BoostField::Domain,
            pattern: "github|tool|resource".to_string(),
            points: 3,
        },
    ]
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            match_mode: default_match_mode(),
            keywords: default_keyword_tables(),
            boosts: default_boosts(),
        }
    }
}

/// Tag derivation inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct EnricherConfig {
    /// Domains too generic to be useful as tags, matched as a
    /// case-insensitive regex against the stripped domain.
    #[serde(default = "default_noisy_domain_pattern")]
    pub noisy_domain_pattern: String,
    /// Technology keywords promoted to tags when found in the haystack.
    #[serde(default = "default_tech_keywords")]
    pub tech_keywords: Vec<String>,
}

fn default_noisy_domain_pattern() -> String {
    "reddit|imgur|youtube".to_string()
}

fn default_tech_keywords() -> Vec<String> {
    [
        "python",
        "javascript",
        "typescript",
        "java",
        "golang",
        "rust",
        "react",
        "vue",
        "angular",
        "node",
        "django",
        "flask",
        "aws",
        "azure",
        "gcp",
        "kubernetes",
        "docker",
        "ai",
        "ml",
        "chatgpt",
        "llm",
        "deep learning",
    ]
    .map(str::to_string)
    .to_vec()
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            noisy_domain_pattern: default_noisy_domain_pattern(),
            tech_keywords: default_tech_keywords(),
        }
    }
}

/// Cross-source score normalization and the ranking caps.
#[derive(Debug, Clone, Deserialize)]
pub struct RankConfig {
    /// Multiplier applied to a source's primary metric to put it on the
    /// common scale (raw magnitudes are not comparable across sources).
    #[serde(default = "default_multipliers")]
    pub multipliers: BTreeMap<SourceKind, f64>,
    #[serde(default = "default_multiplier")]
    pub default_multiplier: f64,
    /// Max items any single source contributes to one category before
    /// merging.
    #[serde(default = "default_per_source_cap")]
    pub per_source_cap: usize,
    /// Max items per category after merging.
    #[serde(default = "default_merge_cap")]
    pub merge_cap: usize,
}

fn default_multipliers() -> BTreeMap<SourceKind, f64> {
    BTreeMap::from([(SourceKind::Reddit, 1.0), (SourceKind::Substack, 10.0)])
}
fn default_multiplier() -> f64 {
    1.0
}
fn default_per_source_cap() -> usize {
    5
}
fn default_merge_cap() -> usize {
    10
}

impl RankConfig {
    pub fn multiplier_for(&self, kind: SourceKind) -> f64 {
        self.multipliers
            .get(&kind)
            .copied()
            .unwrap_or(self.default_multiplier)
    }
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            multipliers: default_multipliers(),
            default_multiplier: default_multiplier(),
            per_source_cap: default_per_source_cap(),
            merge_cap: default_merge_cap(),
        }
    }
}
