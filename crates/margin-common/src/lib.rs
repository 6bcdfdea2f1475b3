//! margin-common: shared error taxonomy, id newtypes, and the record-store
//! collaborator trait used by every other margin crate.

pub mod error;
pub mod id;
pub mod store;

pub use error::{MarginError, Result, SerDeError};
pub use id::{FolderId, NoteId};
pub use store::{RecordKind, RecordStore};
