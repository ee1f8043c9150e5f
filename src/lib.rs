// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod classify;
pub mod config;
pub mod enrich;
pub mod fetch;
pub mod filter;
pub mod pipeline;
pub mod rank;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::config::PipelineConfig;
pub use crate::fetch::SourceAdapter;
pub use crate::pipeline::{Digest, Pipeline};
pub use crate::types::{Category, ProcessedItem, RankedList, RawItem, SourceKind};
