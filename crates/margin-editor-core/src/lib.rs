//! margin-editor-core: pure editor logic for the note surface.
//!
//! This crate provides:
//! - `TextBuffer` trait and the ropey-backed `EditorRope`
//! - `MarkerArena` - live self-adjusting highlight ranges
//! - highlight mutation, reconciliation, and application
//! - regex search/replace routed through the buffer
//! - `EditorSession` - per-open-note state, mode control, debounce timers

pub mod highlight;
pub mod marker;
pub mod search;
pub mod session;
pub mod text;
pub mod types;

pub use highlight::{HighlightError, PreviewPipeline, apply_highlight, apply_spans, reconcile, remove_highlight};
pub use marker::{MarkerArena, MarkerHandle, MarkerPosition};
pub use search::{SearchMatch, replace_all, search};
pub use session::{AUTOSAVE_DEBOUNCE, EditorSession, PREVIEW_SYNC_DEBOUNCE};
pub use text::{EditDelta, EditorRope, TextBuffer};
pub use types::{Mode, Selection};
