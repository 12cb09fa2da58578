//! Full pipeline run: discover, fetch, aggregate, persist, render.
//!
//! Descriptor-level failures (unreadable or malformed files) are reported and
//! excluded; variant-level failures are isolated inside
//! [`process::process_descriptor`]. Only catalog or index persistence
//! failures abort the run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;

use crate::{catalog, discovery, process, render};

/// Configuration for one publish run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory holding descriptor YAML files, one subdirectory level deep.
    pub descriptors_dir: PathBuf,
    /// Root of the publish tree.
    pub output_root: PathBuf,
    /// Descriptors processed concurrently. `1` reproduces the fully
    /// sequential behavior; higher values keep output identical because
    /// results are collected back into input order.
    pub jobs: usize,
    /// Bound on each artifact download, connect to last byte.
    pub timeout: Duration,
    /// Drop descriptors whose variants all failed from the catalog.
    pub skip_empty: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            descriptors_dir: PathBuf::from("binaries"),
            output_root: PathBuf::from("output"),
            jobs: 1,
            timeout: Duration::from_secs(300),
            skip_empty: false,
        }
    }
}

/// End-of-run counts for the user-facing summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Descriptor files discovered.
    pub found: usize,
    /// Descriptors parsed and processed (with or without surviving variants).
    pub processed: usize,
    /// Variants published.
    pub published: usize,
    /// Variants skipped due to a per-variant failure.
    pub skipped: usize,
}

/// Execute one full publish run.
///
/// # Errors
///
/// Returns an error only for run-fatal conditions: an unreadable descriptors
/// directory, an HTTP client that cannot be constructed, or a failure to
/// persist the catalog or HTML index. Per-descriptor and per-variant
/// failures are logged and absorbed.
pub async fn run(config: &RunConfig) -> Result<RunSummary> {
    std::fs::create_dir_all(&config.output_root)
        .with_context(|| format!("failed to create {}", config.output_root.display()))?;

    let files = discovery::find_descriptor_files(&config.descriptors_dir)?;
    tracing::info!("found {} descriptor files to process", files.len());

    let client = reqwest::Client::builder()
        .user_agent(crate::USER_AGENT)
        .timeout(config.timeout)
        .build()
        .context("failed to build http client")?;

    // `buffered` (not `buffer_unordered`) keeps completion order equal to
    // input order, which the aggregator's first-encountered rule requires.
    let outcomes: Vec<Option<process::ProcessOutcome>> = futures::stream::iter(files.iter())
        .map(|path| {
            let client = client.clone();
            let output_root = config.output_root.clone();
            async move {
                tracing::info!("processing {}", path.display());
                match discovery::load_descriptor(path) {
                    Ok(descriptor) => {
                        Some(process::process_descriptor(&client, &output_root, descriptor).await)
                    }
                    Err(error) => {
                        tracing::warn!("error processing {}: {error:#}", path.display());
                        None
                    }
                }
            }
        })
        .buffered(config.jobs.max(1))
        .collect()
        .await;

    let mut summary = RunSummary {
        found: files.len(),
        ..RunSummary::default()
    };
    let mut processed = Vec::new();
    for outcome in outcomes.into_iter().flatten() {
        summary.published += outcome.published;
        summary.skipped += outcome.skipped;
        processed.push(outcome.descriptor);
    }
    summary.processed = processed.len();

    let catalog = catalog::Aggregator::new()
        .skip_empty(config.skip_empty)
        .aggregate(&processed);
    catalog::persist(&catalog, &config.output_root)?;

    let html = render::render_index(&processed)?;
    let index_path = config.output_root.join("index.html");
    std::fs::write(&index_path, html)
        .with_context(|| format!("failed to write {}", index_path.display()))?;

    tracing::info!(
        "run complete: {} found, {} processed, {} variants published, {} skipped",
        summary.found,
        summary.processed,
        summary.published,
        summary.skipped
    );

    Ok(summary)
}
