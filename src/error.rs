//! Error types for the collector.
//!
//! Cycle errors ([`FetchError`], [`MissingFieldError`]) skip a single poll
//! cycle. A [`PollError`] ends the poll loop.

use thiserror::Error;

pub use mongowatch_types::MissingFieldError;

/// Errors that can occur while fetching a status snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request itself failed (DNS, connection refused, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than 200 OK.
    #[error("server returned status {status} - recheck the configured host and port")]
    Server {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The response body was empty.
    #[error("server statistics returned empty")]
    EmptyBody,

    /// The response body is not valid JSON.
    #[error("server statistics are invalid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),
}

/// Anything that causes a single poll cycle to be skipped.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
}

/// Faults that stop the poll loop.
#[derive(Debug, Error)]
pub enum PollError {
    /// Writing metric lines failed.
    #[error("failed to write metrics: {0}")]
    Output(#[from] std::io::Error),

    /// The receiving end of a channel output was dropped.
    #[error("metric channel closed")]
    OutputClosed,
}
