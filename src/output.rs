//! Output backends for emitting metric records.

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use mongowatch_types::MetricRecord;

use crate::error::PollError;

/// Destination for each cycle's metric records.
#[derive(Debug)]
pub enum Output {
    /// Write one line per metric to standard output.
    ///
    /// Lines look like `MONGO_CONNECTIONS 5 db1`; the string is the name prefix.
    Stdout(String),

    /// Send each cycle's records through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(mpsc::Sender<Vec<MetricRecord>>),
}

impl Output {
    /// Create a stdout output with the given metric name prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mongowatch::Output;
    ///
    /// let output = Output::stdout("MONGO_");
    /// ```
    pub fn stdout(prefix: impl Into<String>) -> Self {
        Output::Stdout(prefix.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mongowatch::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive one batch per successful cycle
    /// // while let Some(records) = rx.recv().await {
    /// //     println!("Got {} metrics", records.len());
    /// // }
    /// ```
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Vec<MetricRecord>>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Emit one cycle's records.
    pub(crate) async fn emit(&self, records: &[MetricRecord]) -> Result<(), PollError> {
        match self {
            Output::Stdout(prefix) => {
                // one write per cycle so lines from a cycle stay together
                let mut stdout = tokio::io::stdout();
                stdout.write_all(render_lines(records, prefix).as_bytes()).await?;
                stdout.flush().await?;
            }
            Output::Channel(tx) => {
                tx.send(records.to_vec())
                    .await
                    .map_err(|_| PollError::OutputClosed)?;
            }
        }
        Ok(())
    }
}

/// Render records as newline-terminated line-protocol entries.
pub fn render_lines(records: &[MetricRecord], prefix: &str) -> String {
    records
        .iter()
        .map(|record| record.to_line(prefix) + "\n")
        .collect()
}
