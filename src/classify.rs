// src/classify.rs
//! Category classification via weighted keyword scoring. All patterns are
//! compiled once at construction; `classify` is pure and deterministic.

use anyhow::{anyhow, Result};
use regex::Regex;

use crate::config::{BoostField, ClassifierConfig, ContextBoost, MatchMode};
use crate::types::{Category, RawItem};

/// A precompiled matcher for one keyword set. Matching semantics
/// (whole-word vs substring) are an explicit policy, not implicit regex
/// behavior.
pub struct KeywordMatcher {
    mode: MatchMode,
    regexes: Vec<Regex>,
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn compile(keywords: &[String], mode: MatchMode) -> Result<Self> {
        let mut regexes = Vec::new();
        if mode == MatchMode::WordBoundary {
            for kw in keywords {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(kw));
                let re = Regex::new(&pattern)
                    .map_err(|e| anyhow!("keyword `{kw}` pattern error: {e}"))?;
                regexes.push(re);
            }
        }
        Ok(Self {
            mode,
            regexes,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        })
    }

    /// Total occurrence count across all keywords in this set.
    /// `haystack` must already be lowercased.
    pub fn count_hits(&self, haystack: &str) -> u32 {
        match self.mode {
            MatchMode::WordBoundary => self
                .regexes
                .iter()
                .map(|re| re.find_iter(haystack).count() as u32)
                .sum(),
            MatchMode::Substring => self
                .keywords
                .iter()
                .map(|kw| haystack.matches(kw.as_str()).count() as u32)
                .sum(),
        }
    }
}

struct CompiledBoost {
    cfg: ContextBoost,
    re: Regex,
}

pub struct Classifier {
    default_category: Category,
    matchers: Vec<(Category, KeywordMatcher)>,
    boosts: Vec<CompiledBoost>,
}

impl Classifier {
    pub fn new(cfg: ClassifierConfig) -> Result<Self> {
        // Matchers follow the Category enumeration order so score ties
        // resolve to the earlier category, independent of map order.
        let mut matchers = Vec::with_capacity(Category::ALL.len());
        let empty: Vec<String> = Vec::new();
        for cat in Category::ALL {
            let kws = cfg.keywords.get(&cat).unwrap_or(&empty);
            matchers.push((cat, KeywordMatcher::compile(kws, cfg.match_mode)?));
        }

        let boosts = cfg
            .boosts
            .iter()
            .cloned()
            .map(|b| {
                let re = Regex::new(&format!("(?i){}", b.pattern))
                    .map_err(|e| anyhow!("boost pattern `{}` error: {e}", b.pattern))?;
                Ok(CompiledBoost { cfg: b, re })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            default_category: cfg.default_category,
            matchers,
            boosts,
        })
    }

    /// Assign exactly one category. Strictly-highest total wins; ties keep
    /// the earlier category; an all-zero score falls back to the default.
    pub fn classify(&self, item: &RawItem) -> Category {
        let haystack = format!("{} {}", item.title, item.body).to_lowercase();

        let mut best = self.default_category;
        let mut best_score = 0u32;
        for (cat, matcher) in &self.matchers {
            let mut score = matcher.count_hits(&haystack);
            for boost in &self.boosts {
                if boost.cfg.category != *cat {
                    continue;
                }
                let field = match boost.cfg.field {
                    BoostField::Context => item.context.as_str(),
                    BoostField::Domain => item.domain.as_str(),
                };
                if boost.re.is_match(field) {
                    score += boost.cfg.points;
                }
            }
            if score > best_score {
                best_score = score;
                best = *cat;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn item(title: &str, body: &str, context: &str, domain: &str) -> RawItem {
        RawItem {
            id: "c1".to_string(),
            title: title.to_string(),
            body: body.to_string(),
            url: String::new(),
            primary_metric: 0,
            secondary_metric: 0,
            created_utc: 0,
            domain: domain.to_string(),
            context: context.to_string(),
            kind: SourceKind::Reddit,
        }
    }

    fn classifier() -> Classifier {
        Classifier::new(ClassifierConfig::default()).unwrap()
    }

    #[test]
    fn openai_announcement_lands_in_ai_ml() {
        let c = classifier();
        let it = item("OpenAI announces GPT update", "", "OpenAI", "openai.com");
        // keyword hits plus the context bonus dominate the news keywords
        assert_eq!(c.classify(&it), Category::AiMl);
    }

    #[test]
    fn no_keywords_falls_back_to_default() {
        let c = classifier();
        let it = item("zzz qqq", "", "unrelated", "example.org");
        assert_eq!(c.classify(&it), Category::IndustryNews);
    }

    #[test]
    fn classification_is_pure() {
        let c = classifier();
        let it = item(
            "Kubernetes deployment performance testing",
            "docker microservices at scale",
            "programming",
            "example.org",
        );
        let first = c.classify(&it);
        for _ in 0..10 {
            assert_eq!(c.classify(&it), first);
        }
    }

    #[test]
    fn domain_boost_can_tip_tools() {
        let cfg = ClassifierConfig {
            keywords: std::collections::BTreeMap::new(),
            ..ClassifierConfig::default()
        };
        let c = Classifier::new(cfg).unwrap();
        // no keywords at all: only the github domain boost scores
        let it = item("whatever", "", "somewhere", "github.com");
        assert_eq!(c.classify(&it), Category::ToolsResources);
    }

    #[test]
    fn ties_keep_the_earlier_category() {
        let mut keywords = std::collections::BTreeMap::new();
        keywords.insert(Category::Programming, vec!["shared".to_string()]);
        keywords.insert(Category::ToolsResources, vec!["shared".to_string()]);
        let cfg = ClassifierConfig {
            keywords,
            boosts: Vec::new(),
            ..ClassifierConfig::default()
        };
        let c = Classifier::new(cfg).unwrap();
        let it = item("shared", "", "x", "x.org");
        assert_eq!(c.classify(&it), Category::Programming);
    }

    #[test]
    fn word_boundary_does_not_match_inside_words() {
        let m = KeywordMatcher::compile(&["ai".to_string()], MatchMode::WordBoundary).unwrap();
        assert_eq!(m.count_hits("maintain the chain"), 0);
        assert_eq!(m.count_hits("ai is everywhere, ai again"), 2);
    }

    #[test]
    fn substring_mode_matches_inside_words() {
        let m = KeywordMatcher::compile(&["ai".to_string()], MatchMode::Substring).unwrap();
        assert_eq!(m.count_hits("maintain the chain"), 2);
    }

    #[test]
    fn multi_word_phrases_count() {
        let m = KeywordMatcher::compile(
            &["machine learning".to_string()],
            MatchMode::WordBoundary,
        )
        .unwrap();
        assert_eq!(m.count_hits("machine learning beats machine learning"), 2);
    }
}
