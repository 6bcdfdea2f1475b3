//! Workspace operations over a record store: note/folder CRUD, duplication,
//! tree reordering, settings, and the backlink index.
//!
//! This is the layer UI commands call into. It owns nothing editor-shaped;
//! the open note's live state belongs to the editor session, which persists
//! through `save_note` at its checkpoints.

use margin_common::{FolderId, NoteId, RecordKind, RecordStore, Result};

use crate::backlinks::BacklinkIndex;
use crate::models::{Folder, Note, Settings};
use crate::order;

pub struct Workspace<S> {
    store: S,
}

impl<S: RecordStore> Workspace<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // === Notes ===

    /// Create a note at the end of its folder's sibling list.
    pub fn create_note(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        folder_id: Option<FolderId>,
    ) -> Result<Note> {
        let mut note = Note::new(title, content);
        note.folder_id = folder_id;
        let last = self
            .notes()?
            .into_iter()
            .filter(|n| n.folder_id == note.folder_id)
            .map(|n| n.order)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
        note.order = order::after(last);
        self.store.put(RecordKind::Note, note.id.as_str(), &note)?;
        Ok(note)
    }

    /// Load a note, recomputing its derived tags and links.
    pub fn load_note(&self, id: &NoteId) -> Result<Option<Note>> {
        let mut note: Option<Note> = self.store.get(RecordKind::Note, id.as_str())?;
        if let Some(n) = note.as_mut() {
            n.refresh_derived();
        }
        Ok(note)
    }

    /// Persist a note, refreshing derived fields and the modified stamp.
    pub fn save_note(&mut self, note: &mut Note) -> Result<()> {
        note.refresh_derived();
        note.touch();
        self.store.put(RecordKind::Note, note.id.as_str(), note)
    }

    /// Delete a note. Its highlights die with it; nothing else holds spans.
    pub fn delete_note(&mut self, id: &NoteId) -> Result<bool> {
        self.store.delete_raw(RecordKind::Note, id.as_str())
    }

    /// Duplicate a note: content and highlights copied, fresh id, placed
    /// right after the original. Copied spans are valid by construction
    /// (same content), so the duplicate opens with all highlights live.
    pub fn duplicate_note(&mut self, id: &NoteId) -> Result<Option<Note>> {
        let Some(original) = self.load_note(id)? else {
            return Ok(None);
        };
        let mut copy = Note::new(format!("{} (copy)", original.title), original.content.clone());
        copy.folder_id = original.folder_id.clone();
        copy.highlights = original.highlights.clone();

        let next = self
            .notes()?
            .into_iter()
            .filter(|n| n.folder_id == original.folder_id && n.order > original.order)
            .map(|n| n.order)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))));
        copy.order = match order::between(Some(original.order), next) {
            Some(key) => key,
            None => {
                self.renormalize_folder(original.folder_id.as_ref())?;
                // After renormalization the original moved; reload its key.
                let reloaded = self.load_note(id)?.map(|n| n.order).unwrap_or(0.0);
                order::after(Some(reloaded))
            }
        };
        self.store.put(RecordKind::Note, copy.id.as_str(), &copy)?;
        Ok(Some(copy))
    }

    /// All notes, ordered by folder then sort key.
    pub fn notes(&self) -> Result<Vec<Note>> {
        let mut notes = Vec::new();
        for id in self.store.list_ids(RecordKind::Note)? {
            if let Some(note) = self.store.get::<Note>(RecordKind::Note, &id)? {
                notes.push(note);
            }
        }
        notes.sort_by(|a, b| {
            (a.folder_id.as_ref(), a.order)
                .partial_cmp(&(b.folder_id.as_ref(), b.order))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(notes)
    }

    /// Move a note into a folder (or the root), keeping its place at the
    /// end of the new sibling list.
    pub fn move_note(&mut self, id: &NoteId, folder_id: Option<FolderId>) -> Result<()> {
        let Some(mut note) = self.load_note(id)? else {
            return Ok(());
        };
        let last = self
            .notes()?
            .into_iter()
            .filter(|n| n.folder_id == folder_id && n.id != *id)
            .map(|n| n.order)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
        note.folder_id = folder_id;
        note.order = order::after(last);
        self.save_note(&mut note)
    }

    /// Drop a note between two siblings (drag-and-drop reorder). Either
    /// neighbor may be absent (drop at an end). Renormalizes the sibling
    /// list when the keys have no room left between them.
    pub fn reorder_note(
        &mut self,
        id: &NoteId,
        before: Option<&NoteId>,
        after: Option<&NoteId>,
    ) -> Result<()> {
        let Some(mut note) = self.load_note(id)? else {
            return Ok(());
        };
        let lo = match before {
            Some(b) => self.load_note(b)?.map(|n| n.order),
            None => None,
        };
        let hi = match after {
            Some(a) => self.load_note(a)?.map(|n| n.order),
            None => None,
        };
        note.order = match order::between(lo, hi) {
            Some(key) => key,
            None => {
                self.renormalize_folder(note.folder_id.as_ref())?;
                let lo = match before {
                    Some(b) => self.load_note(b)?.map(|n| n.order),
                    None => None,
                };
                let hi = match after {
                    Some(a) => self.load_note(a)?.map(|n| n.order),
                    None => None,
                };
                order::between(lo, hi).unwrap_or(0.0)
            }
        };
        self.save_note(&mut note)
    }

    fn renormalize_folder(&mut self, folder_id: Option<&FolderId>) -> Result<()> {
        tracing::debug!(
            target: "margin::store",
            folder = folder_id.map(|f| f.as_str()).unwrap_or("<root>"),
            "sort keys exhausted, renormalizing"
        );
        let siblings: Vec<Note> = self
            .notes()?
            .into_iter()
            .filter(|n| n.folder_id.as_ref() == folder_id)
            .collect();
        for (mut note, key) in siblings.into_iter().zip(order::sequence(usize::MAX)) {
            note.order = key;
            self.store.put(RecordKind::Note, note.id.as_str(), &note)?;
        }
        Ok(())
    }

    // === Folders ===

    pub fn create_folder(&mut self, name: impl Into<String>) -> Result<Folder> {
        let last = self
            .folders()?
            .into_iter()
            .map(|f| f.order)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
        let folder = Folder::new(name, order::after(last));
        self.store
            .put(RecordKind::Folder, folder.id.as_str(), &folder)?;
        Ok(folder)
    }

    pub fn folders(&self) -> Result<Vec<Folder>> {
        let mut folders = Vec::new();
        for id in self.store.list_ids(RecordKind::Folder)? {
            if let Some(folder) = self.store.get::<Folder>(RecordKind::Folder, &id)? {
                folders.push(folder);
            }
        }
        folders.sort_by(|a, b| a.order.partial_cmp(&b.order).unwrap_or(std::cmp::Ordering::Equal));
        Ok(folders)
    }

    /// Delete a folder. Its notes fall back to the root and its child
    /// folders are reparented to the deleted folder's own parent, so the
    /// tree never holds a dangling `parent_id`.
    pub fn delete_folder(&mut self, id: &FolderId) -> Result<bool> {
        let parent = self
            .store
            .get::<Folder>(RecordKind::Folder, id.as_str())?
            .and_then(|f| f.parent_id);

        let orphans: Vec<NoteId> = self
            .notes()?
            .into_iter()
            .filter(|n| n.folder_id.as_ref() == Some(id))
            .map(|n| n.id)
            .collect();
        for note_id in orphans {
            self.move_note(&note_id, None)?;
        }

        let children: Vec<Folder> = self
            .folders()?
            .into_iter()
            .filter(|f| f.parent_id.as_ref() == Some(id))
            .collect();
        for mut child in children {
            child.parent_id = parent.clone();
            self.store
                .put(RecordKind::Folder, child.id.as_str(), &child)?;
        }

        self.store.delete_raw(RecordKind::Folder, id.as_str())
    }

    // === Settings & indexes ===

    pub fn settings(&self) -> Result<Settings> {
        Ok(self
            .store
            .get(RecordKind::Settings, "settings")?
            .unwrap_or_default())
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Result<()> {
        self.store.put(RecordKind::Settings, "settings", settings)
    }

    /// Backlink index over every note's derived links.
    pub fn backlinks(&self) -> Result<BacklinkIndex> {
        Ok(BacklinkIndex::build(self.notes()?.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_store::MemoryStore;
    use crate::models::Span;

    fn workspace() -> Workspace<MemoryStore> {
        Workspace::new(MemoryStore::new())
    }

    #[test]
    fn test_create_orders_sequentially() {
        let mut ws = workspace();
        let a = ws.create_note("A", "", None).unwrap();
        let b = ws.create_note("B", "", None).unwrap();
        assert!(a.order < b.order);
    }

    #[test]
    fn test_reorder_between_neighbors() {
        let mut ws = workspace();
        let a = ws.create_note("A", "", None).unwrap();
        let b = ws.create_note("B", "", None).unwrap();
        let c = ws.create_note("C", "", None).unwrap();

        // Drag C between A and B.
        ws.reorder_note(&c.id, Some(&a.id), Some(&b.id)).unwrap();
        let titles: Vec<String> = ws.notes().unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_duplicate_copies_highlights() {
        let mut ws = workspace();
        let mut note = ws.create_note("Orig", "highlight me", None).unwrap();
        note.add_span(Span::new(0, 9, "highlight", "highlight", "#a"));
        ws.save_note(&mut note).unwrap();

        let copy = ws.duplicate_note(&note.id).unwrap().unwrap();
        assert_eq!(copy.title, "Orig (copy)");
        assert_eq!(copy.content, note.content);
        assert_eq!(copy.highlights, note.highlights);
        assert_ne!(copy.id, note.id);
        // Placed right after the original.
        let titles: Vec<String> = ws.notes().unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Orig", "Orig (copy)"]);
    }

    #[test]
    fn test_move_note_and_delete_folder() {
        let mut ws = workspace();
        let folder = ws.create_folder("Projects").unwrap();
        let note = ws.create_note("N", "", None).unwrap();

        ws.move_note(&note.id, Some(folder.id.clone())).unwrap();
        assert_eq!(
            ws.load_note(&note.id).unwrap().unwrap().folder_id,
            Some(folder.id.clone())
        );

        // Deleting the folder orphans the note back to the root.
        assert!(ws.delete_folder(&folder.id).unwrap());
        assert_eq!(ws.load_note(&note.id).unwrap().unwrap().folder_id, None);
    }

    #[test]
    fn test_delete_folder_reparents_children() {
        let mut ws = workspace();
        let top = ws.create_folder("Top").unwrap();
        let mut middle = ws.create_folder("Middle").unwrap();
        middle.parent_id = Some(top.id.clone());
        ws.store_mut()
            .put(RecordKind::Folder, middle.id.as_str(), &middle)
            .unwrap();
        let mut leaf = ws.create_folder("Leaf").unwrap();
        leaf.parent_id = Some(middle.id.clone());
        ws.store_mut()
            .put(RecordKind::Folder, leaf.id.as_str(), &leaf)
            .unwrap();

        // Deleting the middle folder hands its children to its own parent.
        assert!(ws.delete_folder(&middle.id).unwrap());
        let folders = ws.folders().unwrap();
        let leaf = folders.iter().find(|f| f.name == "Leaf").unwrap();
        assert_eq!(leaf.parent_id, Some(top.id.clone()));

        // Deleting a top-level folder leaves its children at the root.
        assert!(ws.delete_folder(&top.id).unwrap());
        let folders = ws.folders().unwrap();
        let leaf = folders.iter().find(|f| f.name == "Leaf").unwrap();
        assert_eq!(leaf.parent_id, None);
    }

    #[test]
    fn test_settings_default_and_roundtrip() {
        let mut ws = workspace();
        let settings = ws.settings().unwrap();
        assert_eq!(settings.default_mode, "edit");

        let mut changed = settings;
        changed.highlight_color = "#ff00ff".to_string();
        ws.save_settings(&changed).unwrap();
        assert_eq!(ws.settings().unwrap(), changed);
    }

    #[test]
    fn test_backlinks_via_workspace() {
        let mut ws = workspace();
        let a = ws.create_note("Alpha", "see [[Beta]]", None).unwrap();
        ws.create_note("Beta", "nothing", None).unwrap();
        let index = ws.backlinks().unwrap();
        assert_eq!(index.sources_for("Beta"), &[a.id]);
    }

    #[test]
    fn test_delete_note() {
        let mut ws = workspace();
        let note = ws.create_note("Gone", "", None).unwrap();
        assert!(ws.delete_note(&note.id).unwrap());
        assert!(ws.load_note(&note.id).unwrap().is_none());
    }
}
