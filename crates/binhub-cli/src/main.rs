//! binhub - publish release binaries and their discovery catalog

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use binhub_core::run::{RunConfig, run};

#[derive(Parser)]
#[command(
    name = "binhub",
    version,
    about = "Process release descriptors into a published binary tree with a hierarchical catalog"
)]
struct Cli {
    /// Directory containing descriptor YAML files, one subdirectory level deep
    #[arg(long, default_value = "binaries")]
    binaries_dir: PathBuf,

    /// Root of the publish tree to write binaries and catalog files into
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Number of descriptors processed concurrently (1 = fully sequential)
    #[arg(long, default_value_t = 1)]
    jobs: usize,

    /// Seconds before an artifact download is abandoned
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,

    /// Exclude descriptors whose variants all failed from the catalog
    #[arg(long)]
    skip_empty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = RunConfig {
        descriptors_dir: cli.binaries_dir,
        output_root: cli.output_dir,
        jobs: cli.jobs,
        timeout: Duration::from_secs(cli.timeout_secs),
        skip_empty: cli.skip_empty,
    };

    let summary = run(&config).await?;
    println!(
        "{} descriptors found, {} processed, {} variants published, {} skipped",
        summary.found, summary.processed, summary.published, summary.skipped
    );

    Ok(())
}
