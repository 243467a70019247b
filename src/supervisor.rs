//! Process-level supervision of the poll loop.
//!
//! Cycle errors never reach this level. Anything that does (an output
//! failure, a panic, a broken signal handler) is fatal and the binary exits
//! with [`FATAL_EXIT_CODE`].

use std::future::Future;
use std::io;
use std::panic::UnwindSafe;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::poller::Poller;
use crate::source::SnapshotSource;

/// Exit status for fatal faults.
pub const FATAL_EXIT_CODE: i32 = -1;

/// Run the poll loop until it fails or the process receives Ctrl-C.
pub async fn supervise<S: SnapshotSource + 'static>(poller: Poller<S>) -> Result<()> {
    supervise_until(poller, tokio::signal::ctrl_c()).await
}

/// Run the poll loop until it fails or `shutdown` completes.
///
/// A shutdown future that resolves to `Err` is treated as fatal, since the
/// process could otherwise never be stopped cleanly.
pub async fn supervise_until<S, F>(poller: Poller<S>, shutdown: F) -> Result<()>
where
    S: SnapshotSource + 'static,
    F: Future<Output = io::Result<()>>,
{
    let mut task = tokio::spawn(poller.run());

    tokio::select! {
        joined = &mut task => match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err.into()),
            Err(err) if err.is_panic() => Err(anyhow!("poll loop panicked")),
            Err(err) => Err(err.into()),
        },
        signal = shutdown => {
            task.abort();
            signal.context("failed to listen for the shutdown signal")?;
            info!("Shutting down");
            Ok(())
        }
    }
}

/// Run `f`, turning a panic into an error so it exits like any other fatal fault.
pub fn guarded<F>(f: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + UnwindSafe,
{
    std::panic::catch_unwind(f).unwrap_or_else(|_| Err(anyhow!("panicked")))
}
