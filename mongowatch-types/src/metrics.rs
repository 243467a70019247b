//! Metric records emitted once per poll cycle.

use std::fmt;

/// The fixed set of metrics derived from a server status snapshot.
///
/// [`MetricName::ALL`] lists them in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    BtreeHits,
    BtreeMisses,
    BtreeMissRatio,
    Connections,
    ConnectionsAvailable,
    ConnectionLimit,
    GlobalLock,
    MemResident,
    MemVirtual,
    MemMapped,
    OpsInserts,
    OpsQuery,
    OpsUpdate,
    OpsDelete,
    OpsGetmore,
    OpsCommand,
}

impl MetricName {
    /// Every metric, in the order a cycle emits them.
    pub const ALL: [MetricName; 16] = [
        MetricName::BtreeHits,
        MetricName::BtreeMisses,
        MetricName::BtreeMissRatio,
        MetricName::Connections,
        MetricName::ConnectionsAvailable,
        MetricName::ConnectionLimit,
        MetricName::GlobalLock,
        MetricName::MemResident,
        MetricName::MemVirtual,
        MetricName::MemMapped,
        MetricName::OpsInserts,
        MetricName::OpsQuery,
        MetricName::OpsUpdate,
        MetricName::OpsDelete,
        MetricName::OpsGetmore,
        MetricName::OpsCommand,
    ];

    /// The wire name, without any prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::BtreeHits => "BTREE_HITS",
            MetricName::BtreeMisses => "BTREE_MISSES",
            MetricName::BtreeMissRatio => "BTREE_MISS_RATIO",
            MetricName::Connections => "CONNECTIONS",
            MetricName::ConnectionsAvailable => "CONNECTIONS_AVAILABLE",
            MetricName::ConnectionLimit => "CONNECTION_LIMIT",
            MetricName::GlobalLock => "GLOBAL_LOCK",
            MetricName::MemResident => "MEM_RESIDENT",
            MetricName::MemVirtual => "MEM_VIRTUAL",
            MetricName::MemMapped => "MEM_MAPPED",
            MetricName::OpsInserts => "OPS_INSERTS",
            MetricName::OpsQuery => "OPS_QUERY",
            MetricName::OpsUpdate => "OPS_UPDATE",
            MetricName::OpsDelete => "OPS_DELETE",
            MetricName::OpsGetmore => "OPS_GETMORE",
            MetricName::OpsCommand => "OPS_COMMAND",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named, valued, sourced metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    /// Which metric this is.
    pub name: MetricName,
    /// The metric value for this cycle.
    pub value: f64,
    /// Label identifying where the metric came from.
    pub source: String,
}

impl MetricRecord {
    /// Create a new record.
    pub fn new(name: MetricName, value: f64, source: impl Into<String>) -> Self {
        Self {
            name,
            value,
            source: source.into(),
        }
    }

    /// Render the record as a line-protocol entry: `{prefix}{NAME} {value} {source}`.
    ///
    /// ```rust
    /// use mongowatch_types::{MetricName, MetricRecord};
    ///
    /// let record = MetricRecord::new(MetricName::Connections, 5.0, "db1");
    /// assert_eq!(record.to_line("MONGO_"), "MONGO_CONNECTIONS 5 db1");
    /// ```
    pub fn to_line(&self, prefix: &str) -> String {
        format!("{}{} {} {}", prefix, self.name, self.value, self.source)
    }
}

impl fmt::Display for MetricRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.value, self.source)
    }
}
