//! Core library for BinHub.
//!
//! Takes declarative release descriptors, fetches and verifies the referenced
//! artifacts, publishes the binaries into a deterministic output tree, and
//! builds the hierarchical discovery catalog plus the static HTML index.

pub mod catalog;
pub mod digest;
pub mod discovery;
pub mod extract;
pub mod fetch;
pub mod paths;
pub mod process;
pub mod render;
pub mod run;

pub use paths::*;
pub use run::{RunConfig, RunSummary};

/// User Agent string for artifact downloads
pub const USER_AGENT: &str = concat!("binhub-core/", env!("CARGO_PKG_VERSION"));
