// src/types.rs
//! Core pipeline types: source kinds, raw fetched items, categories,
//! and the enriched items the ranking stage emits.

use serde::{Deserialize, Serialize};

/// Which external source an item came from. An explicit tag — never
/// inferred from which optional fields happen to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Reddit,
    Substack,
}

impl SourceKind {
    /// Enumeration order; also the concatenation order at the merge stage.
    pub const ALL: [SourceKind; 2] = [SourceKind::Reddit, SourceKind::Substack];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Reddit => "reddit",
            SourceKind::Substack => "substack",
        }
    }
}

/// A normalized, source-agnostic content item as fetched, before any
/// filtering or classification.
///
/// `id` is unique within one `kind` for a single run. `created_utc` is
/// always present: adapters default it to 0 when a source omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: String,
    pub title: String,
    /// Body text; empty string when the source has none.
    pub body: String,
    pub url: String,
    /// Primary engagement metric in the source's native scale
    /// (upvotes for Reddit, likes for Substack).
    pub primary_metric: u64,
    /// Secondary engagement metric (comment count).
    pub secondary_metric: u64,
    /// Unix seconds; 0 when the source omits it, never optional.
    pub created_utc: i64,
    pub domain: String,
    /// Source-context string: subreddit or publication slug.
    pub context: String,
    pub kind: SourceKind,
}

/// The fixed, closed set of topical buckets. Every surviving item lands in
/// exactly one; `IndustryNews` absorbs items nothing else matched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    #[serde(rename = "AI/ML Developments")]
    AiMl,
    #[serde(rename = "Programming & Software Engineering")]
    Programming,
    #[serde(rename = "Business Technology")]
    BusinessTech,
    #[serde(rename = "Industry News")]
    IndustryNews,
    #[serde(rename = "Tools & Resources")]
    ToolsResources,
}

impl Category {
    /// Enumeration order. First-seen wins on classifier score ties, so this
    /// order is part of the classification contract.
    pub const ALL: [Category; 5] = [
        Category::AiMl,
        Category::Programming,
        Category::BusinessTech,
        Category::IndustryNews,
        Category::ToolsResources,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::AiMl => "AI/ML Developments",
            Category::Programming => "Programming & Software Engineering",
            Category::BusinessTech => "Business Technology",
            Category::IndustryNews => "Industry News",
            Category::ToolsResources => "Tools & Resources",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A `RawItem` that survived the quality filter, plus derived metadata.
/// Immutable once built; derivation is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedItem {
    #[serde(flatten)]
    pub item: RawItem,
    pub category: Category,
    /// 0–5 lowercase tags, each at least 2 chars, no duplicates,
    /// discovery order.
    pub tags: Vec<String>,
    /// At most 200 chars; ends with `...` when hard-truncated.
    pub summary: String,
}

/// Per-category ranked output: sorted by normalized score descending,
/// truncated to the merge cap.
pub type RankedList = Vec<ProcessedItem>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_to_display_names() {
        for cat in Category::ALL {
            let json = serde_json::to_string(&cat).unwrap();
            assert_eq!(json, format!("\"{}\"", cat.display_name()));
        }
    }

    #[test]
    fn category_order_puts_ai_first_and_tools_last() {
        assert!(Category::AiMl < Category::ToolsResources);
        assert_eq!(Category::ALL[3], Category::IndustryNews);
    }
}
