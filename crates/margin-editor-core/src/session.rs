//! The editor session: all state for the currently open note.
//!
//! One `EditorSession` exists per open note and is replaced wholesale when
//! another note is opened; the live marker set, debounce deadlines, and
//! scroll state never outlive it. The concurrency model is single-threaded
//! and cooperative: mutations run synchronously inside one callback, and the
//! only deferred work is the two debounce timers, driven by explicit
//! `tick(now)` calls from the host loop.

use std::ops::Range;

use web_time::{Duration, Instant};

use margin_common::{RecordKind, RecordStore, Result};
use margin_store::Note;

use crate::highlight::{self, HighlightError, PreviewPipeline};
use crate::marker::MarkerArena;
use crate::text::{EditorRope, TextBuffer};
use crate::types::{Mode, Selection};

/// Autosave fires this long after the last edit, if nothing supersedes it.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(3);

/// Preview-to-source sync fires this long after the last preview edit.
pub const PREVIEW_SYNC_DEBOUNCE: Duration = Duration::from_millis(800);

pub struct EditorSession<P = ()> {
    note: Note,
    buffer: EditorRope,
    markers: MarkerArena,
    mode: Mode,
    selection: Option<Selection>,
    highlight_color: String,
    pipeline: P,
    autosave_due: Option<Instant>,
    preview_sync_due: Option<Instant>,
    /// Full source text produced by the editable preview, awaiting sync.
    pending_preview_source: Option<String>,
    /// Scroll position as a fraction of total scrollable range, shared by
    /// both surfaces so mode switches land at the same relative spot.
    scroll_fraction: f64,
}

impl<P: PreviewPipeline> EditorSession<P> {
    /// Open a note: load its content into the buffer and apply its spans as
    /// live markers.
    pub fn open(note: Note, mode: Mode, highlight_color: impl Into<String>, pipeline: P) -> Self {
        let buffer = EditorRope::from_str(&note.content);
        let mut markers = MarkerArena::new();
        markers.rebuild(note.spans(), buffer.len_chars());
        tracing::debug!(
            target: "margin::session",
            note = %note.id,
            spans = note.spans().len(),
            live = markers.len(),
            "session opened"
        );
        Self {
            note,
            buffer,
            markers,
            mode,
            selection: None,
            highlight_color: highlight_color.into(),
            pipeline,
            autosave_due: None,
            preview_sync_due: None,
            pending_preview_source: None,
            scroll_fraction: 0.0,
        }
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn content(&self) -> String {
        self.buffer.to_string()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn set_highlight_color(&mut self, color: impl Into<String>) {
        self.highlight_color = color.into();
    }

    /// Live `(from, to, color)` ranges currently applied to the surface.
    pub fn live_highlights(&self) -> Vec<(usize, usize, String)> {
        self.markers
            .live_ranges()
            .into_iter()
            .map(|(f, t, c)| (f, t, c.to_string()))
            .collect()
    }

    // === Editing ===

    /// Replace a char range with text; live markers shift with the edit.
    pub fn edit(&mut self, range: Range<usize>, text: &str) {
        self.buffer.replace(range, text);
        if let Some(delta) = self.buffer.last_edit() {
            self.markers.apply_delta(&delta);
        }
        self.schedule_autosave(Instant::now());
    }

    pub fn insert(&mut self, offset: usize, text: &str) {
        self.edit(offset..offset, text);
    }

    pub fn delete(&mut self, range: Range<usize>) {
        self.edit(range, "");
    }

    /// Bulk content replacement (import, duplicate, clear). Live markers are
    /// superseded wholesale; spans that no longer fit the new content are
    /// skipped by the rebuild but stay in the span store.
    pub fn replace_content(&mut self, text: &str) {
        self.buffer = EditorRope::from_str(text);
        self.markers.rebuild(self.note.spans(), self.buffer.len_chars());
        self.schedule_autosave(Instant::now());
    }

    // === Highlights ===

    /// Create a highlight over the selection with the current color.
    ///
    /// Reconciles first so overlap resolution tests intervals against
    /// current offsets, not the offsets spans were captured at.
    pub fn apply_highlight(&mut self, selection: Selection) -> Result<(), HighlightError> {
        highlight::reconcile(&mut self.note, &self.markers);
        let color = self.highlight_color.clone();
        highlight::apply_highlight(
            &mut self.note,
            &mut self.markers,
            &self.buffer,
            selection,
            &color,
            &self.pipeline,
        )?;
        self.schedule_autosave(Instant::now());
        Ok(())
    }

    /// Remove highlights at the selection (caret: containing spans,
    /// range: intersecting spans). A selection touching nothing is a silent
    /// no-op and does not arm the autosave.
    pub fn remove_highlight(&mut self, selection: Selection) {
        highlight::reconcile(&mut self.note, &self.markers);
        let removed =
            highlight::remove_highlight(&mut self.note, &mut self.markers, &self.buffer, selection);
        if removed > 0 {
            self.schedule_autosave(Instant::now());
        }
    }

    /// Pull live marker positions back into the span store.
    pub fn reconcile(&mut self) {
        highlight::reconcile(&mut self.note, &self.markers);
    }

    // === Persistence checkpoints ===

    /// Reconcile and persist the note. Checkpoint for explicit save and
    /// autosave.
    pub fn save<S: RecordStore>(&mut self, store: &mut S) -> Result<()> {
        highlight::reconcile(&mut self.note, &self.markers);
        self.note.content = self.buffer.to_string();
        self.note.refresh_derived();
        self.note.touch();
        store.put(RecordKind::Note, &self.note.id.to_string(), &self.note)?;
        self.autosave_due = None;
        tracing::debug!(target: "margin::session", note = %self.note.id, "note saved");
        Ok(())
    }

    /// Switch to a different note: flush pending preview edits, reconcile
    /// and persist the outgoing note, then load the incoming one. The old
    /// marker set is superseded, not torn down one by one.
    pub fn open_note<S: RecordStore>(&mut self, next: Note, store: &mut S) -> Result<()> {
        self.flush_preview_sync();
        self.save(store)?;

        self.note = next;
        self.buffer = EditorRope::from_str(&self.note.content);
        self.markers.rebuild(self.note.spans(), self.buffer.len_chars());
        self.selection = None;
        self.autosave_due = None;
        self.preview_sync_due = None;
        self.pending_preview_source = None;
        tracing::debug!(target: "margin::session", note = %self.note.id, "switched note");
        Ok(())
    }

    /// Close the session (last tab for this note): flush, reconcile, persist.
    pub fn close<S: RecordStore>(&mut self, store: &mut S) -> Result<()> {
        self.flush_preview_sync();
        self.save(store)
    }

    // === Mode controller ===

    /// Switch surfaces. Leaving `Preview` with a pending debounced sync
    /// flushes it synchronously first; otherwise edits made in the editable
    /// preview would be lost with the surface.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == Mode::Preview && mode != Mode::Preview {
            self.flush_preview_sync();
        }
        self.mode = mode;
    }

    /// Record an edit made in the editable preview. The converted source
    /// text replaces the buffer after the debounce window (or on flush).
    ///
    /// The preview is only editable in `Preview` mode; in `Edit` and `Split`
    /// the editing surface is authoritative, so preview events there are
    /// dropped rather than queued against it.
    pub fn preview_edited(&mut self, source: String) {
        if self.mode != Mode::Preview {
            tracing::debug!(
                target: "margin::session",
                mode = self.mode.as_str(),
                "preview edit ignored outside preview mode"
            );
            return;
        }
        self.pending_preview_source = Some(source);
        self.preview_sync_due = Some(Instant::now() + PREVIEW_SYNC_DEBOUNCE);
    }

    /// Cancel the preview-sync debounce and run the sync now.
    pub fn flush_preview_sync(&mut self) {
        self.preview_sync_due = None;
        if let Some(source) = self.pending_preview_source.take() {
            // Capture live positions before the surface content is replaced.
            highlight::reconcile(&mut self.note, &self.markers);
            self.replace_content(&source);
            tracing::debug!(target: "margin::session", "preview sync flushed");
        }
    }

    // === Debounce timers ===

    fn schedule_autosave(&mut self, now: Instant) {
        self.autosave_due = Some(now + AUTOSAVE_DEBOUNCE);
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave_due.is_some()
    }

    pub fn preview_sync_pending(&self) -> bool {
        self.preview_sync_due.is_some()
    }

    /// Fire any debounce deadline that has passed. The host calls this from
    /// its timer loop; each qualifying event restarts its timer, so only the
    /// final scheduled firing executes.
    pub fn tick<S: RecordStore>(&mut self, now: Instant, store: &mut S) -> Result<()> {
        if self.preview_sync_due.is_some_and(|due| due <= now) {
            self.flush_preview_sync();
        }
        if self.autosave_due.is_some_and(|due| due <= now) {
            self.save(store)?;
        }
        Ok(())
    }

    // === Scroll translation ===

    /// Record the leaving surface's scroll offset against its total
    /// scrollable range.
    pub fn set_scroll(&mut self, offset: f64, total: f64) {
        self.scroll_fraction = if total > 0.0 {
            (offset / total).clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Scroll offset for the entering surface, given its total range.
    pub fn scroll_offset_for(&self, total: f64) -> f64 {
        self.scroll_fraction * total.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use margin_store::MemoryStore;

    fn session(content: &str) -> EditorSession {
        EditorSession::open(Note::new("t", content), Mode::Edit, "#ffe066", ())
    }

    fn reload<S: RecordStore>(store: &S, session: &EditorSession) -> Note {
        store
            .get(RecordKind::Note, session.note().id.as_str())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_open_applies_spans() {
        let mut note = Note::new("t", "hello world");
        note.add_span(margin_store::Span::new(0, 5, "hello", "hello", "#a"));
        let session: EditorSession = EditorSession::open(note, Mode::Edit, "#ffe066", ());
        assert_eq!(session.live_highlights(), vec![(0, 5, "#a".to_string())]);
    }

    #[test]
    fn test_edit_shifts_highlights() {
        let mut session = session("abcXYZdef");
        session.apply_highlight(Selection::new(3, 6)).unwrap();
        session.insert(0, "123");
        assert_eq!(session.content(), "123abcXYZdef");
        assert_eq!(session.live_highlights(), vec![(6, 9, "#ffe066".to_string())]);
    }

    #[test]
    fn test_save_reconciles_offsets() {
        let mut store = MemoryStore::new();
        let mut session = session("abcXYZdef");
        session.apply_highlight(Selection::new(3, 6)).unwrap();
        session.insert(0, "123");
        session.save(&mut store).unwrap();

        let saved = reload(&store, &session);
        assert_eq!(saved.content, "123abcXYZdef");
        let span = &saved.highlights[0];
        assert_eq!((span.from, span.to), (6, 9));
    }

    #[test]
    fn test_round_trip_rebuild_count() {
        // N in-bounds spans persisted and reloaded yield exactly N markers.
        let mut store = MemoryStore::new();
        let mut session = session("0123456789");
        session.apply_highlight(Selection::new(0, 2)).unwrap();
        session.apply_highlight(Selection::new(4, 6)).unwrap();
        session.apply_highlight(Selection::new(8, 10)).unwrap();
        session.save(&mut store).unwrap();

        let reloaded = reload(&store, &session);
        let fresh: EditorSession = EditorSession::open(reloaded, Mode::Edit, "#ffe066", ());
        assert_eq!(fresh.live_highlights().len(), 3);
    }

    #[test]
    fn test_switch_note_persists_outgoing() {
        let mut store = MemoryStore::new();
        let mut session = session("abcXYZdef");
        session.apply_highlight(Selection::new(3, 6)).unwrap();
        session.insert(0, "__");
        let first_id = session.note().id.clone();

        session.open_note(Note::new("next", "other"), &mut store).unwrap();
        assert_eq!(session.content(), "other");
        assert!(session.live_highlights().is_empty());

        let first: Note = store
            .get(RecordKind::Note, first_id.as_str())
            .unwrap()
            .unwrap();
        assert_eq!((first.highlights[0].from, first.highlights[0].to), (5, 8));
    }

    #[test]
    fn test_autosave_debounce_restarts() {
        let mut store = MemoryStore::new();
        let mut session = session("text");
        session.insert(4, "!");
        assert!(session.autosave_pending());

        // Not due yet: nothing persisted.
        session.tick(Instant::now(), &mut store).unwrap();
        assert!(session.autosave_pending());
        assert!(store
            .get_raw(RecordKind::Note, session.note().id.as_str())
            .unwrap()
            .is_none());

        // Past the window: saved and deadline cleared.
        session
            .tick(Instant::now() + AUTOSAVE_DEBOUNCE + Duration::from_millis(1), &mut store)
            .unwrap();
        assert!(!session.autosave_pending());
        assert_eq!(reload(&store, &session).content, "text!");
    }

    #[test]
    fn test_flush_on_mode_exit() {
        let mut session = session("original");
        session.set_mode(Mode::Preview);
        session.preview_edited("edited in preview".to_string());
        assert!(session.preview_sync_pending());

        // Leave preview before the 800ms debounce fires.
        session.set_mode(Mode::Edit);
        assert!(!session.preview_sync_pending());
        assert_eq!(session.content(), "edited in preview");
    }

    #[test]
    fn test_preview_sync_fires_on_tick() {
        let mut store = MemoryStore::new();
        let mut session = session("original");
        session.set_mode(Mode::Preview);
        session.preview_edited("synced".to_string());
        session
            .tick(Instant::now() + PREVIEW_SYNC_DEBOUNCE + Duration::from_millis(1), &mut store)
            .unwrap();
        assert_eq!(session.content(), "synced");
    }

    #[test]
    fn test_preview_edit_ignored_in_split_mode() {
        // In Split the editing surface is authoritative; a preview event must
        // not queue a sync that would later clobber editor edits.
        let mut store = MemoryStore::new();
        let mut session = session("original");
        session.apply_highlight(Selection::new(0, 4)).unwrap();
        session.set_mode(Mode::Split);

        session.preview_edited("stale preview text".to_string());
        assert!(!session.preview_sync_pending());

        session.insert(8, " plus edits");
        session
            .tick(Instant::now() + PREVIEW_SYNC_DEBOUNCE + Duration::from_millis(1), &mut store)
            .unwrap();
        assert_eq!(session.content(), "original plus edits");
        assert_eq!(session.live_highlights().len(), 1);
    }

    #[test]
    fn test_preview_edit_ignored_in_edit_mode() {
        let mut session = session("original");
        session.preview_edited("never applied".to_string());
        assert!(!session.preview_sync_pending());
        session.set_mode(Mode::Preview);
        // Leaving preview flushes nothing; no source was queued.
        session.set_mode(Mode::Edit);
        assert_eq!(session.content(), "original");
    }

    #[test]
    fn test_remove_nothing_skips_autosave() {
        let mut session = session("0123456789");
        session.remove_highlight(Selection::caret(4));
        assert!(!session.autosave_pending());

        session.apply_highlight(Selection::new(0, 3)).unwrap();
        assert!(session.autosave_pending());
    }

    #[test]
    fn test_mode_switch_without_pending_sync() {
        let mut session = session("unchanged");
        session.set_mode(Mode::Preview);
        session.set_mode(Mode::Split);
        assert_eq!(session.content(), "unchanged");
        assert_eq!(session.mode(), Mode::Split);
    }

    #[test]
    fn test_replace_content_guards_stale_spans() {
        let mut session = session("a longer piece of content");
        session.apply_highlight(Selection::new(9, 14)).unwrap();
        session.replace_content("tiny");
        // Span survives in the store, marker set is empty.
        assert_eq!(session.note().spans().len(), 1);
        assert!(session.live_highlights().is_empty());
    }

    #[test]
    fn test_scroll_fraction_translation() {
        let mut session = session("text");
        session.set_scroll(250.0, 1000.0);
        assert_eq!(session.scroll_offset_for(500.0), 125.0);
        session.set_scroll(10.0, 0.0);
        assert_eq!(session.scroll_offset_for(400.0), 0.0);
    }

    #[test]
    fn test_empty_selection_rejected_via_session() {
        let mut session = session("text");
        let err = session.apply_highlight(Selection::caret(2)).unwrap_err();
        assert_eq!(err, HighlightError::EmptySelection);
        assert!(session.note().spans().is_empty());
    }
}
