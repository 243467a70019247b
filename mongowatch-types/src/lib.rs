//! # mongowatch-types
//!
//! Core types shared by the mongowatch collector: the status snapshot returned
//! by the MongoDB HTTP interface, the metric records derived from it, and the
//! counter arithmetic used to turn cumulative counters into per-interval deltas.
//!
//! ## Example
//!
//! ```rust
//! use mongowatch_types::{diff, Snapshot};
//! use serde_json::json;
//!
//! let current = Snapshot::from_value(json!({ "opcounters": { "insert": 519 } }));
//! let previous = Snapshot::from_value(json!({ "opcounters": { "insert": 500 } }));
//!
//! let now = current.group("opcounters").unwrap().counter("insert");
//! let before = previous.group("opcounters").unwrap().counter("insert");
//! assert_eq!(diff(now, before), 19.0);
//! ```

mod delta;
mod metrics;
mod snapshot;

pub use delta::*;
pub use metrics::*;
pub use snapshot::*;

/// Bytes per megabyte, as reported by the `mem` section.
pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;
