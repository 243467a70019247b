//! # mongowatch
//!
//! A collector that polls the MongoDB HTTP status interface and emits one
//! metric line per statistic per poll cycle, ready for a line-oriented
//! metrics shipper.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                            Poller                            │
//! │  ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌────────┐  │
//! │  │  source  │───▶│  format  │───▶│  output  │───▶│ stdout │  │
//! │  │ (fetch)  │    │ (diff)   │    │ (emit)   │    │        │  │
//! │  └──────────┘    └────┬─────┘    └──────────┘    └────────┘  │
//! │                       │                                      │
//! │                       ▼                                      │
//! │              previous snapshot (retained by the poller)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: the [`SnapshotSource`] trait and [`StatusFetcher`], which
//!   GETs `/_status` and extracts the `serverStatus` document
//! - **[`format`]**: derives the fixed metric set from the current snapshot,
//!   diffing counters against the previous one
//! - **[`output`]**: writes metric lines to stdout, or forwards records
//!   through a channel
//! - **[`poller`]**: the fetch → format → emit loop and its retained state
//! - **[`config`]**: layered settings (file, environment, command line)
//! - **[`supervisor`]**: runs the poll loop and turns faults that escape it
//!   into a fatal exit
//!
//! ## Usage
//!
//! ```bash
//! # Poll a local mongod every second
//! mongowatch
//!
//! # Data port 27018 → status interface on 28018, every 5s
//! mongowatch --hostname db1.internal --port 27018 --poll-interval 5000
//! ```
//!
//! Output:
//!
//! ```text
//! MONGO_BTREE_HITS 12 db1
//! MONGO_BTREE_MISSES 0 db1
//! ...
//! MONGO_OPS_COMMAND 3 db1
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod output;
pub mod poller;
pub mod source;
pub mod supervisor;

pub use config::{CollectorConfig, Credentials, Settings};
pub use error::{CycleError, FetchError, MissingFieldError, PollError};
pub use format::format_metrics;
pub use output::Output;
pub use poller::{CycleOutcome, Poller, PollerBuilder};
pub use source::{SnapshotSource, StatusFetcher, StatusFetcherBuilder};
pub use supervisor::{supervise, supervise_until};

// Re-export types for convenience
pub use mongowatch_types::{MetricName, MetricRecord, Snapshot};
