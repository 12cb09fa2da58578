//! Per-descriptor processing with per-variant fault isolation.
//!
//! A failed variant is logged and omitted from the result; it never aborts
//! sibling variants or the overall run. Variants are visited in sorted
//! architecture order so output is reproducible.

use std::collections::BTreeMap;
use std::path::Path;

use reqwest::Client;

use binhub_schema::{ProcessedDescriptor, ReleaseDescriptor};

use crate::fetch;

/// Result of processing one descriptor, with publish/skip counts for the
/// end-of-run summary.
#[derive(Debug)]
pub struct ProcessOutcome {
    /// The descriptor with its surviving published variants.
    pub descriptor: ProcessedDescriptor,
    /// Number of variants published.
    pub published: usize,
    /// Number of variants that failed and were omitted.
    pub skipped: usize,
}

/// Fetch every variant of one descriptor, isolating failures per variant.
///
/// A descriptor whose variants all fail still comes back, with an empty
/// architecture mapping; whether the catalog keeps it is the aggregator's
/// policy, not this function's.
pub async fn process_descriptor(
    client: &Client,
    output_root: &Path,
    descriptor: ReleaseDescriptor,
) -> ProcessOutcome {
    let mut published = BTreeMap::new();
    let mut skipped = 0usize;

    for (arch, spec) in &descriptor.variants {
        tracing::info!(
            "downloading {} {} for {arch}",
            descriptor.name,
            descriptor.version
        );
        match fetch::fetch_variant(
            client,
            output_root,
            &descriptor.name,
            &descriptor.version,
            arch,
            spec,
        )
        .await
        {
            Ok(variant) => {
                published.insert(arch.clone(), variant);
            }
            Err(error) => {
                skipped += 1;
                tracing::warn!(
                    "error processing {} {arch}: {error}",
                    descriptor.name
                );
            }
        }
    }

    let count = published.len();
    ProcessOutcome {
        descriptor: descriptor.into_processed(published),
        published: count,
        skipped,
    }
}
