//! Turns status snapshots into metric records.
//!
//! Counters (index hits/misses, op counters) are reported as the delta since
//! the previous snapshot, gauges (connections, memory) as-is, and the lock
//! and connection ratios from the current snapshot alone.
//!
//! Sections are strict and fields are lenient: a section missing from the
//! current snapshot fails the whole cycle, while a missing field inside a
//! section only zeroes the metric that reads it.

use mongowatch_types::{
    diff, MetricName, MetricRecord, MissingFieldError, Snapshot, BYTES_PER_MEGABYTE,
};

const BTREE: &str = "indexCounters.btree";
const CONNECTIONS: &str = "connections";
const GLOBAL_LOCK: &str = "globalLock";
const MEM: &str = "mem";
const OPCOUNTERS: &str = "opcounters";

const OPS_FIELDS: [(MetricName, &str); 6] = [
    (MetricName::OpsInserts, "insert"),
    (MetricName::OpsQuery, "query"),
    (MetricName::OpsUpdate, "update"),
    (MetricName::OpsDelete, "delete"),
    (MetricName::OpsGetmore, "getmore"),
    (MetricName::OpsCommand, "command"),
];

/// Derive this cycle's metrics from `current`, diffing counters against `previous`.
///
/// With no previous snapshot the baseline is zero, so the first cycle reports
/// the raw counter values. Records come back in [`MetricName::ALL`] order.
pub fn format_metrics(
    current: &Snapshot,
    previous: Option<&Snapshot>,
    source: &str,
) -> Result<Vec<MetricRecord>, MissingFieldError> {
    let btree = current.group(BTREE)?;
    let connections = current.group(CONNECTIONS)?;
    let global_lock = current.group(GLOBAL_LOCK)?;
    let mem = current.group(MEM)?;
    let ops = current.group(OPCOUNTERS)?;

    let baseline = Baseline(previous);
    let mut records = Vec::with_capacity(MetricName::ALL.len());
    let mut push = |name, value| records.push(MetricRecord::new(name, value, source));

    push(
        MetricName::BtreeHits,
        diff(btree.counter("hits"), baseline.counter(BTREE, "hits")),
    );
    push(
        MetricName::BtreeMisses,
        diff(btree.counter("misses"), baseline.counter(BTREE, "misses")),
    );
    // diffed like a counter even though it is a ratio
    push(
        MetricName::BtreeMissRatio,
        diff(btree.counter("missRatio"), baseline.counter(BTREE, "missRatio")),
    );

    let in_use = connections.gauge("current");
    let available = connections.gauge("available");
    push(MetricName::Connections, in_use);
    push(MetricName::ConnectionsAvailable, available);
    push(MetricName::ConnectionLimit, ratio(in_use, in_use + available));

    push(
        MetricName::GlobalLock,
        ratio(global_lock.gauge("lockTime"), global_lock.gauge("totalTime")),
    );

    push(MetricName::MemResident, mem.gauge("resident") * BYTES_PER_MEGABYTE);
    push(MetricName::MemVirtual, mem.gauge("virtual") * BYTES_PER_MEGABYTE);
    push(MetricName::MemMapped, mem.gauge("mapped") * BYTES_PER_MEGABYTE);

    for (name, field) in OPS_FIELDS {
        push(name, diff(ops.counter(field), baseline.counter(OPCOUNTERS, field)));
    }

    Ok(records)
}

/// The previous side of a counter diff.
struct Baseline<'a>(Option<&'a Snapshot>);

impl Baseline<'_> {
    fn counter(&self, group: &str, field: &str) -> Option<f64> {
        match self.0 {
            None => Some(0.0),
            Some(previous) => previous.group(group).ok()?.counter(field),
        }
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
