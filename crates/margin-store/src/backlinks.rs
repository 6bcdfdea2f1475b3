//! Backlink index: which notes link to a given note.
//!
//! Built by inverting the derived `links` lists, so it is only as fresh as
//! the last `refresh_derived` pass over each note. Targets are note titles
//! (wiki-links address notes by title, not id).

use std::collections::HashMap;

use margin_common::NoteId;

use crate::models::Note;

/// Map from link target (note title) to the ids of notes linking to it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BacklinkIndex {
    by_target: HashMap<String, Vec<NoteId>>,
}

impl BacklinkIndex {
    /// Build the index from a set of notes.
    pub fn build<'a>(notes: impl IntoIterator<Item = &'a Note>) -> Self {
        let mut by_target: HashMap<String, Vec<NoteId>> = HashMap::new();
        for note in notes {
            for target in &note.links {
                let sources = by_target.entry(target.clone()).or_default();
                if !sources.contains(&note.id) {
                    sources.push(note.id.clone());
                }
            }
        }
        // Deterministic ordering for display and tests.
        for sources in by_target.values_mut() {
            sources.sort();
        }
        Self { by_target }
    }

    /// Notes linking to the note with the given title.
    pub fn sources_for(&self, title: &str) -> &[NoteId] {
        self.by_target.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}
