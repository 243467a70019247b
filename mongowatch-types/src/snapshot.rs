//! Snapshot - one parsed `serverStatus` document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{numeric, parse_numeric};

/// A point-in-time copy of the server's `serverStatus` document.
///
/// The document is kept as the nested JSON mapping the server sent. Sections
/// are looked up with [`Snapshot::group`], which fails when a section is
/// missing, while individual fields inside a section are read leniently.
///
/// # Example
///
/// ```rust
/// use mongowatch_types::Snapshot;
/// use serde_json::json;
///
/// let snapshot = Snapshot::from_value(json!({
///     "connections": { "current": 5, "available": 95 }
/// }));
///
/// let connections = snapshot.group("connections").unwrap();
/// assert_eq!(connections.gauge("current"), 5.0);
/// assert!(snapshot.group("mem").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    /// An empty snapshot, as produced when the response carries no `serverStatus`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from a JSON value. Anything but an object yields an empty snapshot.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::empty(),
        }
    }

    /// Check if the snapshot has no sections at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level sections.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Look up a section by dotted path, e.g. `"indexCounters.btree"`.
    ///
    /// Every segment must exist and be an object.
    pub fn group(&self, path: &str) -> Result<Group<'_>, MissingFieldError> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut map = self
            .0
            .get(first)
            .and_then(Value::as_object)
            .ok_or_else(|| MissingFieldError::new(path))?;

        for segment in segments {
            map = map
                .get(segment)
                .and_then(Value::as_object)
                .ok_or_else(|| MissingFieldError::new(path))?;
        }

        Ok(Group { fields: map })
    }
}

/// A borrowed section of a [`Snapshot`].
#[derive(Debug, Clone, Copy)]
pub struct Group<'a> {
    fields: &'a Map<String, Value>,
}

impl Group<'_> {
    /// Read a counter field. Absent and non-numeric fields are `None`.
    pub fn counter(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(numeric)
    }

    /// Read a gauge field. Absent and non-numeric fields read as 0.
    pub fn gauge(&self, field: &str) -> f64 {
        self.fields.get(field).map(parse_numeric).unwrap_or(0.0)
    }
}

/// A required section is missing from the server status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("server status is missing `{path}`")]
pub struct MissingFieldError {
    /// Dotted path of the missing section.
    pub path: String,
}

impl MissingFieldError {
    /// Create an error for the given dotted path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}
