//! The record-store collaborator interface.
//!
//! Persistence is a collaborator, not a core concern: the store moves opaque
//! JSON records by `(kind, id)` and knows nothing about span semantics or
//! note structure. Typed access is layered on top via the provided
//! `get`/`put` helpers.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// The three record kinds the store distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Note,
    Folder,
    /// Singleton; conventionally stored under the id `"settings"`.
    Settings,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Note => "note",
            RecordKind::Folder => "folder",
            RecordKind::Settings => "settings",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyed record storage over opaque JSON values.
///
/// Implementations must treat record bodies as opaque: a note's `highlights`
/// array round-trips byte-for-byte whether or not the store predates the
/// highlight feature.
pub trait RecordStore {
    /// Fetch a raw record, or `None` if absent.
    fn get_raw(&self, kind: RecordKind, id: &str) -> Result<Option<serde_json::Value>>;

    /// Insert or replace a raw record.
    fn put_raw(&mut self, kind: RecordKind, id: &str, value: serde_json::Value) -> Result<()>;

    /// Delete a record. Returns whether anything was removed.
    fn delete_raw(&mut self, kind: RecordKind, id: &str) -> Result<bool>;

    /// List all ids of a kind, in unspecified order.
    fn list_ids(&self, kind: RecordKind) -> Result<Vec<String>>;

    /// Fetch and deserialize a record.
    fn get<T: DeserializeOwned>(&self, kind: RecordKind, id: &str) -> Result<Option<T>> {
        match self.get_raw(kind, id)? {
            Some(value) => Ok(Some(serde_json::from_value(value).map_err(crate::error::MarginError::from)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a record.
    fn put<T: Serialize>(&mut self, kind: RecordKind, id: &str, record: &T) -> Result<()> {
        let value = serde_json::to_value(record).map_err(crate::error::MarginError::from)?;
        self.put_raw(kind, id, value)
    }
}
