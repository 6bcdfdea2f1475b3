//! margin-store: persisted data model and record stores.
//!
//! Holds the `Note`/`Folder`/`Settings` records, the highlight `Span` model,
//! tag/wiki-link derivation, the backlink index, fractional ordering keys,
//! and `RecordStore` implementations (in-memory and JSON file).

pub mod backlinks;
pub mod derive;
pub mod json_store;
pub mod models;
pub mod order;
pub mod workspace;

pub use backlinks::BacklinkIndex;
pub use derive::{WikiLink, tags, wiki_link_targets, wiki_links};
pub use json_store::{JsonFileStore, MemoryStore};
pub use models::{Folder, Note, Settings, Span};
pub use workspace::Workspace;
