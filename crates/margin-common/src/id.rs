//! Record id newtypes.
//!
//! Ids are opaque strings at the store boundary; the newtypes exist so a
//! `NoteId` cannot be passed where a `FolderId` is expected. `SmolStr` keeps
//! clones cheap (ids are short and shared widely).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(SmolStr);

        impl $name {
            /// Wrap an existing id string.
            pub fn new(id: impl Into<SmolStr>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh id, unique within this process.
            pub fn generate() -> Self {
                Self(SmolStr::new(fresh_id($prefix)))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

id_type!(
    /// Identifier of a note record.
    NoteId,
    "note"
);
id_type!(
    /// Identifier of a folder record.
    FolderId,
    "folder"
);

/// Monotonic tiebreaker so two ids generated in the same millisecond differ.
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn fresh_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{millis:x}-{n:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = NoteId::generate();
        let b = NoteId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_roundtrip_serde() {
        let id = NoteId::new("note-abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"note-abc\"");
        let back: NoteId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_prefixes() {
        assert!(NoteId::generate().as_str().starts_with("note-"));
        assert!(FolderId::generate().as_str().starts_with("folder-"));
    }
}
