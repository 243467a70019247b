//! Snapshot source abstraction.
//!
//! The poller does not care where status snapshots come from; it asks a
//! [`SnapshotSource`] for one per cycle. [`StatusFetcher`] is the real
//! implementation, talking to the MongoDB HTTP status interface.

mod http;

pub use http::{parse_status, StatusFetcher, StatusFetcherBuilder};

use std::fmt::Debug;

use async_trait::async_trait;
use mongowatch_types::Snapshot;

use crate::error::FetchError;

/// Trait for obtaining status snapshots, one per poll cycle.
#[async_trait]
pub trait SnapshotSource: Send + Sync + Debug {
    /// Fetch the current snapshot.
    ///
    /// Called exactly once per cycle. Implementations should not retry;
    /// the next cycle is the retry.
    async fn fetch(&self) -> Result<Snapshot, FetchError>;

    /// Returns a human-readable description of the source, used in logs.
    fn description(&self) -> &str;
}
