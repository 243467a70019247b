//! MongoDB HTTP status interface source.
//!
//! `mongod` serves its `serverStatus` document as JSON at `/_status` on the
//! HTTP interface, which by convention listens 1000 ports above the data port
//! (28017 for a default install).
//!
//! ## Example
//!
//! ```rust,no_run
//! use mongowatch::StatusFetcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = StatusFetcher::builder()
//!         .url("http://localhost:28017/_status")
//!         .credentials("admin", "secret")
//!         .build()?;
//!
//!     let snapshot = fetcher.fetch().await?;
//!     println!("Got {} sections", snapshot.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use mongowatch_types::Snapshot;

use super::SnapshotSource;
use crate::config::{CollectorConfig, Credentials, DEFAULT_HTTP_PORT, DEFAULT_TIMEOUT};
use crate::error::FetchError;

/// Fetches `serverStatus` snapshots over HTTP.
#[derive(Debug, Clone)]
pub struct StatusFetcher {
    client: Client,
    url: String,
    credentials: Option<Credentials>,
    description: String,
}

impl StatusFetcher {
    /// Create a new builder for configuring the fetcher.
    pub fn builder() -> StatusFetcherBuilder {
        StatusFetcherBuilder::default()
    }

    /// Build a fetcher from resolved collector configuration.
    pub fn from_config(config: &CollectorConfig) -> Result<Self, FetchError> {
        let mut builder = Self::builder()
            .url(config.status_url())
            .timeout(config.timeout);
        if let Some(credentials) = &config.credentials {
            builder = builder.credentials(&credentials.username, &credentials.password);
        }
        builder.build()
    }

    /// The status URL being polled.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one GET against the status URL.
    pub async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let mut request = self.client.get(&self.url);

        // reqwest sends basic auth up front, not in response to a challenge
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Server {
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        parse_status(&body)
    }
}

#[async_trait]
impl SnapshotSource for StatusFetcher {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        StatusFetcher::fetch(self).await
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Parse a status response body.
///
/// The snapshot is the `serverStatus` member of the document. A document
/// without one parses to an empty snapshot rather than an error.
pub fn parse_status(body: &[u8]) -> Result<Snapshot, FetchError> {
    if body.is_empty() {
        return Err(FetchError::EmptyBody);
    }

    let document: Value = serde_json::from_slice(body).map_err(FetchError::MalformedJson)?;

    let snapshot = match document {
        Value::Object(mut fields) => fields
            .remove("serverStatus")
            .map(Snapshot::from_value)
            .unwrap_or_default(),
        _ => Snapshot::empty(),
    };

    Ok(snapshot)
}

/// Builder for StatusFetcher.
#[derive(Debug, Default)]
pub struct StatusFetcherBuilder {
    url: Option<String>,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
}

impl StatusFetcherBuilder {
    /// Set the status URL (e.g., "http://localhost:28017/_status").
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the username and password for basic authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<StatusFetcher, FetchError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        let url = self
            .url
            .unwrap_or_else(|| format!("http://127.0.0.1:{}/_status", DEFAULT_HTTP_PORT));

        Ok(StatusFetcher {
            client,
            description: format!("http: {}", url),
            url,
            credentials: self.credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let fetcher = StatusFetcher::builder().build().unwrap();
        assert_eq!(fetcher.url(), "http://127.0.0.1:28017/_status");
        assert!(fetcher.credentials.is_none());
        assert_eq!(fetcher.description(), "http: http://127.0.0.1:28017/_status");
    }

    #[test]
    fn test_builder_custom() {
        let fetcher = StatusFetcher::builder()
            .url("http://mongo.local:28018/_status")
            .credentials("admin", "secret")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        assert_eq!(fetcher.url(), "http://mongo.local:28018/_status");
        let credentials = fetcher.credentials.unwrap();
        assert_eq!(credentials.username, "admin");
        assert_eq!(credentials.password, "secret");
    }

    #[test]
    fn test_parse_status_extracts_server_status() {
        let body = br#"{"serverStatus": {"connections": {"current": 5, "available": 95}}}"#;
        let snapshot = parse_status(body).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.group("connections").unwrap().gauge("current"), 5.0);
    }

    #[test]
    fn test_parse_status_without_server_status_is_empty() {
        let snapshot = parse_status(br#"{"listDatabases": {}}"#).unwrap();
        assert!(snapshot.is_empty());

        let snapshot = parse_status(b"[1, 2, 3]").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_parse_status_empty_body() {
        assert!(matches!(parse_status(b""), Err(FetchError::EmptyBody)));
    }

    #[test]
    fn test_parse_status_malformed() {
        assert!(matches!(
            parse_status(b"<html>not json</html>"),
            Err(FetchError::MalformedJson(_))
        ));
    }
}
