//! The poll loop.

use std::time::Duration;

use mongowatch_types::{MetricRecord, Snapshot};
use tracing::{debug, info, warn};

use crate::config::{local_hostname, DEFAULT_POLL_INTERVAL, DEFAULT_PREFIX};
use crate::error::{CycleError, PollError};
use crate::format::format_metrics;
use crate::output::Output;
use crate::source::SnapshotSource;

/// What happened in a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Metrics were emitted and the snapshot retained.
    Emitted(usize),
    /// The cycle failed; nothing was emitted and the previous snapshot was kept.
    Skipped,
}

/// Drives fetch → diff → format → emit on a fixed interval.
///
/// The poller owns the last successfully formatted snapshot and diffs each
/// new one against it. A failed cycle leaves that baseline alone, so the next
/// good cycle diffs against the last known-good snapshot.
///
/// # Example
///
/// ```rust,no_run
/// use mongowatch::{Output, Poller, StatusFetcher};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = StatusFetcher::builder()
///         .url("http://localhost:28017/_status")
///         .build()?;
///
///     let poller = Poller::builder(fetcher)
///         .output(Output::stdout("MONGO_"))
///         .interval(Duration::from_secs(5))
///         .label("db1")
///         .build();
///
///     poller.run().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Poller<S> {
    source: S,
    output: Output,
    interval: Duration,
    label: String,
    previous: Option<Snapshot>,
}

impl<S: SnapshotSource> Poller<S> {
    /// Create a builder for configuring the poller.
    pub fn builder(source: S) -> PollerBuilder<S> {
        PollerBuilder::new(source)
    }

    /// The snapshot the next cycle will diff against.
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Run cycles forever, sleeping `interval` after each one completes.
    ///
    /// Only returns on a fault that is not cycle-scoped.
    pub async fn run(mut self) -> Result<(), PollError> {
        info!(
            source = self.source.description(),
            interval_ms = self.interval.as_millis() as u64,
            label = %self.label,
            "Starting poll loop"
        );

        loop {
            self.poll_once().await?;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run a single cycle.
    ///
    /// Cycle errors are logged and reported as [`CycleOutcome::Skipped`];
    /// only output failures come back as `Err`.
    pub async fn poll_once(&mut self) -> Result<CycleOutcome, PollError> {
        match self.collect().await {
            Ok((current, records)) => {
                self.output.emit(&records).await?;
                self.previous = Some(current);
                debug!(count = records.len(), "Metrics emitted");
                Ok(CycleOutcome::Emitted(records.len()))
            }
            Err(e) => {
                warn!(source = self.source.description(), error = %e, "Poll cycle skipped");
                Ok(CycleOutcome::Skipped)
            }
        }
    }

    async fn collect(&self) -> Result<(Snapshot, Vec<MetricRecord>), CycleError> {
        let current = self.source.fetch().await?;
        let records = format_metrics(&current, self.previous.as_ref(), &self.label)?;
        Ok((current, records))
    }
}

/// Builder for configuring a Poller.
#[derive(Debug)]
pub struct PollerBuilder<S> {
    source: S,
    output: Option<Output>,
    interval: Option<Duration>,
    label: Option<String>,
}

impl<S: SnapshotSource> PollerBuilder<S> {
    /// Create a new builder around a snapshot source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            output: None,
            interval: None,
            label: None,
        }
    }

    /// Set the output destination (default: stdout with the `MONGO_` prefix).
    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Set the pause between cycles (default: 1 second).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the source label attached to every metric (default: local hostname).
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Build the poller.
    pub fn build(self) -> Poller<S> {
        Poller {
            source: self.source,
            output: self.output.unwrap_or_else(|| Output::stdout(DEFAULT_PREFIX)),
            interval: self.interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            label: self.label.unwrap_or_else(local_hostname),
            previous: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use mongowatch_types::MetricName;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed list of fetch results.
    #[derive(Debug)]
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<Snapshot, FetchError>>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Snapshot, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn fetch(&self) -> Result<Snapshot, FetchError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::EmptyBody))
        }

        fn description(&self) -> &str {
            "scripted"
        }
    }

    fn status(inserts: u64) -> Snapshot {
        Snapshot::from_value(json!({
            "indexCounters": { "btree": { "hits": 100, "misses": 20, "missRatio": 0.2 } },
            "connections": { "current": 5, "available": 95 },
            "globalLock": { "lockTime": 10, "totalTime": 1000 },
            "mem": { "resident": 18, "virtual": 1359, "mapped": 160 },
            "opcounters": { "insert": inserts, "query": 10 }
        }))
    }

    fn inserts(records: &[MetricRecord]) -> f64 {
        records
            .iter()
            .find(|r| r.name == MetricName::OpsInserts)
            .map(|r| r.value)
            .unwrap()
    }

    fn poller(script: Vec<Result<Snapshot, FetchError>>) -> (
        Poller<ScriptedSource>,
        tokio::sync::mpsc::Receiver<Vec<MetricRecord>>,
    ) {
        let (output, rx) = Output::channel(16);
        let poller = Poller::builder(ScriptedSource::new(script))
            .output(output)
            .label("db1")
            .build();
        (poller, rx)
    }

    #[test]
    fn test_builder_defaults() {
        let poller = Poller::builder(ScriptedSource::new(vec![])).build();
        assert_eq!(poller.interval, Duration::from_secs(1));
        assert_eq!(poller.label, local_hostname());
        assert!(matches!(poller.output, Output::Stdout(ref prefix) if prefix == "MONGO_"));
        assert!(poller.previous().is_none());
    }

    #[tokio::test]
    async fn test_success_emits_and_retains() {
        let (mut poller, mut rx) = poller(vec![Ok(status(500)), Ok(status(520))]);

        assert_eq!(poller.poll_once().await.unwrap(), CycleOutcome::Emitted(16));
        let first = rx.recv().await.unwrap();
        assert_eq!(inserts(&first), 500.0);
        assert_eq!(poller.previous(), Some(&status(500)));

        assert_eq!(poller.poll_once().await.unwrap(), CycleOutcome::Emitted(16));
        let second = rx.recv().await.unwrap();
        assert_eq!(inserts(&second), 20.0);
        assert!(second.iter().all(|r| r.source == "db1"));
        assert_eq!(poller.previous(), Some(&status(520)));
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_and_keeps_baseline() {
        let (mut poller, mut rx) = poller(vec![
            Ok(status(500)),
            Err(FetchError::Server { status: 500 }),
            Ok(status(530)),
        ]);

        poller.poll_once().await.unwrap();
        rx.recv().await.unwrap();

        assert_eq!(poller.poll_once().await.unwrap(), CycleOutcome::Skipped);
        assert!(rx.try_recv().is_err());
        assert_eq!(poller.previous(), Some(&status(500)));

        poller.poll_once().await.unwrap();
        let records = rx.recv().await.unwrap();
        assert_eq!(inserts(&records), 30.0);
    }

    #[tokio::test]
    async fn test_missing_group_skips_cycle() {
        let (mut poller, mut rx) = poller(vec![Ok(status(500)), Ok(Snapshot::empty())]);

        poller.poll_once().await.unwrap();
        rx.recv().await.unwrap();

        assert_eq!(poller.poll_once().await.unwrap(), CycleOutcome::Skipped);
        assert!(rx.try_recv().is_err());
        assert_eq!(poller.previous(), Some(&status(500)));
    }

    #[tokio::test]
    async fn test_closed_output_is_fatal() {
        let (mut poller, rx) = poller(vec![Ok(status(500))]);
        drop(rx);

        let result = poller.poll_once().await;
        assert!(matches!(result, Err(PollError::OutputClosed)));
        assert!(poller.previous().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_interval_after_each_cycle() {
        let (output, mut rx) = Output::channel(16);
        let poller = Poller::builder(ScriptedSource::new(vec![
            Ok(status(1)),
            Ok(status(2)),
            Ok(status(3)),
        ]))
        .output(output)
        .interval(Duration::from_secs(10))
        .label("db1")
        .build();

        let start = tokio::time::Instant::now();
        let task = tokio::spawn(poller.run());

        rx.recv().await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));

        rx.recv().await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11));

        rx.recv().await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(20) && elapsed < Duration::from_secs(21));

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_output_closes() {
        let (output, rx) = Output::channel(1);
        drop(rx);
        let poller = Poller::builder(ScriptedSource::new(vec![Ok(status(1))]))
            .output(output)
            .build();

        let result = poller.run().await;
        assert!(matches!(result, Err(PollError::OutputClosed)));
    }
}
