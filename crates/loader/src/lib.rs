//! # stixview loader
//!
//! Gets STIX2 bundles into memory for the graph builder:
//!
//! - by URL or GitHub gist id, through an injectable [`Fetcher`];
//! - from dropped files (first file wins).
//!
//! Fetches are memoized per [`BundleLoader`]: concurrent requests for one
//! source share a single fetch and results are never evicted.

mod error;
mod fetch;
mod ingest;
mod loader;
mod memo;

pub use error::{LoadError, Result};
pub use fetch::{Fetcher, HttpFetcher};
pub use ingest::{ingest_bytes, ingest_file, ingest_files};
pub use loader::{BundleLoader, BundleSource, LoadedBundle, GITHUB_API};
pub use memo::Memo;

pub use async_trait::async_trait;
