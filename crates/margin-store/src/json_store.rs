//! `RecordStore` implementations: a single-document JSON file store and an
//! in-memory store for tests and embedding.
//!
//! The file store keeps everything in one JSON document:
//! `{"notes": {...}, "folders": {...}, "settings": {...}}` keyed by record
//! id. Every mutation rewrites the file; for a local note tool the document
//! is small and the simplicity wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use margin_common::{RecordKind, RecordStore, Result};

type RecordMap = BTreeMap<String, serde_json::Value>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    notes: RecordMap,
    #[serde(default)]
    folders: RecordMap,
    #[serde(default)]
    settings: RecordMap,
}

impl Document {
    fn map(&self, kind: RecordKind) -> &RecordMap {
        match kind {
            RecordKind::Note => &self.notes,
            RecordKind::Folder => &self.folders,
            RecordKind::Settings => &self.settings,
        }
    }

    fn map_mut(&mut self, kind: RecordKind) -> &mut RecordMap {
        match kind {
            RecordKind::Note => &mut self.notes,
            RecordKind::Folder => &mut self.folders,
            RecordKind::Settings => &mut self.settings,
        }
    }
}

/// In-memory record store. Also the backing state of `JsonFileStore`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    doc: Document,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get_raw(&self, kind: RecordKind, id: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.doc.map(kind).get(id).cloned())
    }

    fn put_raw(&mut self, kind: RecordKind, id: &str, value: serde_json::Value) -> Result<()> {
        self.doc.map_mut(kind).insert(id.to_string(), value);
        Ok(())
    }

    fn delete_raw(&mut self, kind: RecordKind, id: &str) -> Result<bool> {
        Ok(self.doc.map_mut(kind).remove(id).is_some())
    }

    fn list_ids(&self, kind: RecordKind) -> Result<Vec<String>> {
        Ok(self.doc.map(kind).keys().cloned().collect())
    }
}

/// JSON-file-backed record store.
pub struct JsonFileStore {
    path: PathBuf,
    doc: Document,
}

impl JsonFileStore {
    /// Open the store at `path`, loading the existing document if present.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Document::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, doc })
    }

    fn flush(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.doc)?;
        std::fs::write(&self.path, text)?;
        tracing::trace!(target: "margin::store", path = %self.path.display(), "document flushed");
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn get_raw(&self, kind: RecordKind, id: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.doc.map(kind).get(id).cloned())
    }

    fn put_raw(&mut self, kind: RecordKind, id: &str, value: serde_json::Value) -> Result<()> {
        self.doc.map_mut(kind).insert(id.to_string(), value);
        self.flush()
    }

    fn delete_raw(&mut self, kind: RecordKind, id: &str) -> Result<bool> {
        let removed = self.doc.map_mut(kind).remove(id).is_some();
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    fn list_ids(&self, kind: RecordKind) -> Result<Vec<String>> {
        Ok(self.doc.map(kind).keys().cloned().collect())
    }
}
