// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Run one query through the enrichment pipeline and print the results
//!
//! Usage: `cargo run --example search_and_parse -- "rust async runtime" en`
//!
//! Reads `SEARCH_*` and `CONTENT_FETCH_*` from the environment.

use fabstir_web_extract::{logging, ContentPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let query = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: search_and_parse <query> [language]"))?;
    let language = args.next().unwrap_or_else(|| "en".to_string());

    let pipeline = ContentPipeline::from_env()?;
    let results = pipeline.search_and_parse(&query, &language).await;

    let output: Vec<_> = results.into_iter().map(|r| r.into_value()).collect();
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
