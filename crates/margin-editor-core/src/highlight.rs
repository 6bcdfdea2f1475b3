//! Highlight mutation and synchronization: overlap resolution on
//! create/remove, reconciliation of live marker positions back into the span
//! store, and rebuild orchestration.

use margin_store::{Note, Span};

use crate::marker::MarkerArena;
use crate::text::TextBuffer;
use crate::types::Selection;

/// Errors surfaced by highlight operations. Everything else in this
/// subsystem degrades silently.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// Highlighting was attempted on a zero-width selection.
    #[error("cannot highlight an empty selection")]
    EmptySelection,
}

/// Supplies the markdown-strip pipeline used to capture a span's
/// `preview_text`. Implemented by the renderer; the unit impl (identity)
/// keeps the core usable without one.
pub trait PreviewPipeline {
    fn strip_to_text(&self, markdown: &str) -> String;
}

impl PreviewPipeline for () {
    fn strip_to_text(&self, markdown: &str) -> String {
        markdown.to_string()
    }
}

impl PreviewPipeline for fn(&str) -> String {
    fn strip_to_text(&self, markdown: &str) -> String {
        self(markdown)
    }
}

/// Create a highlight over `selection`, replacing every intersecting span
/// wholly (no splitting), then rebuild the live marker set.
///
/// `buffer` must hold the note's current text; the captured `text` is the
/// raw selected substring and `preview_text` its markdown-stripped form,
/// both frozen at creation time.
pub fn apply_highlight<B: TextBuffer, P: PreviewPipeline>(
    note: &mut Note,
    arena: &mut MarkerArena,
    buffer: &B,
    selection: Selection,
    color: &str,
    pipeline: &P,
) -> Result<(), HighlightError> {
    if selection.is_empty() {
        return Err(HighlightError::EmptySelection);
    }
    let (from, to) = (selection.start(), selection.end());
    let text = buffer
        .slice(from..to)
        .map(|s| s.to_string())
        .unwrap_or_default();
    let preview_text = pipeline.strip_to_text(&text);

    let removed = note.remove_overlapping(from, to);
    note.add_span(Span::new(from, to, text, preview_text, color));
    tracing::debug!(
        target: "margin::highlight",
        from,
        to,
        removed,
        "highlight applied"
    );

    arena.rebuild(note.spans(), buffer.len_chars());
    Ok(())
}

/// Remove highlights: a caret removes any span containing it (ends
/// inclusive), a non-empty selection removes every intersecting span.
/// No-op when nothing matches. Returns how many spans were removed.
pub fn remove_highlight<B: TextBuffer>(
    note: &mut Note,
    arena: &mut MarkerArena,
    buffer: &B,
    selection: Selection,
) -> usize {
    let removed = if selection.is_empty() {
        note.remove_containing(selection.start())
    } else {
        note.remove_overlapping(selection.start(), selection.end())
    };
    if removed > 0 {
        tracing::debug!(target: "margin::highlight", removed, "highlights removed");
        arena.rebuild(note.spans(), buffer.len_chars());
    }
    removed
}

/// Reconciliation: overwrite span offsets with current live marker
/// positions. The single synchronization point between ground truth now
/// (markers) and ground truth at rest (the span store). Spans whose marker
/// was cleared keep their last-known offsets.
pub fn reconcile(note: &mut Note, arena: &MarkerArena) {
    for position in arena.read_back() {
        if let Some(span) = note.highlights.get_mut(position.span_index) {
            span.from = position.from;
            span.to = position.to;
        }
    }
    tracing::trace!(
        target: "margin::highlight",
        spans = note.highlights.len(),
        "reconciled span offsets"
    );
}

/// Highlight application: (re)create the live marker set for the current
/// content. Used on note open, bulk content replacement, and after any
/// highlight mutation.
pub fn apply_spans<B: TextBuffer>(note: &Note, arena: &mut MarkerArena, buffer: &B) {
    arena.rebuild(note.spans(), buffer.len_chars());
}
