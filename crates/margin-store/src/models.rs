//! Persisted data model: notes, folders, settings, and highlight spans.
//!
//! Serde field names are locked to the on-disk record shape (camelCase for
//! compound names, `previewText` on spans), so records written by earlier
//! versions of the application load unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use margin_common::{FolderId, NoteId};

use crate::derive;

/// A persisted highlighted text range.
///
/// `from`/`to` are absolute character offsets into the owning note's
/// `content`. They are correct at creation and after every reconciliation;
/// after an external bulk content replacement they may be transiently out of
/// bounds until the next highlight-application pass skips them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub from: usize,
    pub to: usize,
    /// Raw source substring at capture time.
    #[serde(default)]
    pub text: String,
    /// Plain-text rendering of `text` through the markdown pipeline,
    /// captured once at creation. Not refreshed on later edits.
    #[serde(rename = "previewText", default)]
    pub preview_text: String,
    pub color: String,
}

impl Span {
    pub fn new(
        from: usize,
        to: usize,
        text: impl Into<String>,
        preview_text: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to,
            text: text.into(),
            preview_text: preview_text.into(),
            color: color.into(),
        }
    }

    /// Bounds invariant: `0 <= from < to <= len`.
    pub fn in_bounds(&self, content_len: usize) -> bool {
        self.from < self.to && self.to <= content_len
    }

    /// Interval intersection test. `b.to <= a.from || b.from >= a.to` is
    /// non-overlap; touching endpoints do not intersect.
    pub fn intersects(&self, from: usize, to: usize) -> bool {
        !(self.to <= from || self.from >= to)
    }

    /// Whether a caret offset falls on or inside this span (ends inclusive).
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.from <= offset && offset <= self.to
    }
}

/// A note record. Exclusively owns its `highlights`; `tags` and `links` are
/// derived from `content` and recomputed on load and save, never hand-edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Markdown source; the authoritative text.
    pub content: String,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Wiki-link targets found in `content`.
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<Span>,
    /// Fractional sort key within the owning folder.
    pub order: f64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        let mut note = Self {
            id: NoteId::generate(),
            title: title.into(),
            content: content.into(),
            folder_id: None,
            tags: Vec::new(),
            links: Vec::new(),
            highlights: Vec::new(),
            order: 0.0,
            created: now,
            modified: now,
        };
        note.refresh_derived();
        note
    }

    /// Character length of the content (the unit `Span` offsets live in).
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Recompute `tags` and `links` from the current content.
    pub fn refresh_derived(&mut self) {
        self.tags = derive::tags(&self.content);
        self.links = derive::wiki_link_targets(&self.content);
    }

    /// Stamp a modification time.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    // === Span store ===

    pub fn add_span(&mut self, span: Span) {
        self.highlights.push(span);
    }

    /// Remove every span intersecting `[from, to)`. Returns how many were
    /// removed. Spans are removed in full; there is no splitting.
    pub fn remove_overlapping(&mut self, from: usize, to: usize) -> usize {
        let before = self.highlights.len();
        self.highlights.retain(|s| !s.intersects(from, to));
        before - self.highlights.len()
    }

    /// Remove every span whose interval contains the caret offset.
    pub fn remove_containing(&mut self, offset: usize) -> usize {
        let before = self.highlights.len();
        self.highlights.retain(|s| !s.contains_offset(offset));
        before - self.highlights.len()
    }

    pub fn spans(&self) -> &[Span] {
        &self.highlights
    }
}

/// A folder record. Folders nest via `parent_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    /// Fractional sort key among siblings.
    pub order: f64,
}

impl Folder {
    pub fn new(name: impl Into<String>, order: f64) -> Self {
        Self {
            id: FolderId::generate(),
            name: name.into(),
            parent_id: None,
            order,
        }
    }
}

/// Singleton application settings record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Currently selected highlight color (CSS color string).
    pub highlight_color: String,
    /// Mode new sessions open in: "edit", "preview", or "split".
    pub default_mode: String,
    /// Notes open as tabs, in tab order.
    #[serde(default)]
    pub open_tabs: Vec<NoteId>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            highlight_color: "#ffe066".to_string(),
            default_mode: "edit".to_string(),
            open_tabs: Vec::new(),
        }
    }
}
