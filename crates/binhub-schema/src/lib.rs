//! Shared types and wire format for BinHub.
//!
//! This crate defines the descriptor schema (what a release declares), the
//! published-variant record (what the pipeline produces), and the catalog
//! index documents persisted under the publish tree.

pub mod catalog;
pub mod hash;
pub mod types;

// Re-exports
pub use catalog::{API_VERSION, BinaryIndex, LetterIndex, RootIndex, VersionIndex};
pub use hash::Sha256Digest;
pub use types::{
    ArchiveFormat, BinaryName, ProcessedDescriptor, PublishedVariant, ReleaseDescriptor,
    SegmentError, VariantSpec, Version,
};
