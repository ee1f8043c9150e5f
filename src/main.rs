//! Tech-news digest — binary entrypoint.
//! Runs the aggregation pipeline once against the configured sources and
//! writes the ranked per-category digest to stdout as JSON. Rendering is a
//! downstream concern; this binary only produces the data.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use technews_aggregator::fetch::{reddit::RedditAdapter, substack::SubstackAdapter};
use technews_aggregator::{Pipeline, PipelineConfig, SourceAdapter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments. This enables
    // PIPELINE_CONFIG_PATH (and RUST_LOG) from .env.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = PipelineConfig::load_default().context("loading pipeline config")?;

    let client = reqwest::Client::builder()
        .user_agent(config.fetch.user_agent.clone())
        .timeout(std::time::Duration::from_secs(config.fetch.timeout_secs))
        .build()
        .context("building http client")?;

    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(RedditAdapter::new(client.clone())),
        Arc::new(SubstackAdapter::new(client)),
    ];

    let pipeline = Pipeline::new(config).context("building pipeline")?;
    let digest = pipeline.run(&adapters).await;

    // Keyed by the category display names; empty when every source failed,
    // which is still a structurally valid result.
    let json = serde_json::to_string_pretty(&digest).context("serializing digest")?;
    println!("{json}");
    Ok(())
}
