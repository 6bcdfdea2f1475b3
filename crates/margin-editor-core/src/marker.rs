//! Live marker arena: self-adjusting text ranges for the open note.
//!
//! Each persisted span gets one live marker while its note is open. Markers
//! are not persisted and carry no identity across note switches; `rebuild`
//! replaces the whole set. Between rebuilds, every buffer mutation is fed in
//! as an `EditDelta` and marker boundaries shift so they keep bounding the
//! same text no matter how much editing happens elsewhere in the document.
//!
//! Boundary rules:
//! - insertion at `from` pushes the marker right (typed text at the left
//!   edge does not join the highlight); insertion at `to` stays outside;
//!   insertion strictly inside grows the marker.
//! - a deletion covering the whole interior clears the marker. Cleared
//!   markers stop reporting a range and are skipped by `read_back`, leaving
//!   the span's last reconciled offsets untouched.

use margin_store::Span;

use crate::text::EditDelta;

/// Opaque handle to a live marker. Invalidated wholesale by `rebuild`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkerHandle(usize);

#[derive(Clone, Debug)]
struct Marker {
    from: usize,
    to: usize,
    color: String,
    /// Index of the paired span in the owning note's span store, for
    /// markers created by `rebuild`.
    span_index: Option<usize>,
    cleared: bool,
}

/// Current position of a span-paired live marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerPosition {
    pub span_index: usize,
    pub from: usize,
    pub to: usize,
}

/// Arena of live markers for the currently open note.
#[derive(Clone, Debug, Default)]
pub struct MarkerArena {
    markers: Vec<Marker>,
}

impl MarkerArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unpaired marker (the raw range-marking primitive).
    pub fn mark(&mut self, from: usize, to: usize, color: impl Into<String>) -> MarkerHandle {
        self.markers.push(Marker {
            from,
            to,
            color: color.into(),
            span_index: None,
            cleared: from >= to,
        });
        MarkerHandle(self.markers.len() - 1)
    }

    /// Current range of a marker, or `None` once it has been cleared.
    pub fn range_of(&self, handle: MarkerHandle) -> Option<(usize, usize)> {
        let marker = self.markers.get(handle.0)?;
        (!marker.cleared).then_some((marker.from, marker.to))
    }

    /// Clear a marker explicitly.
    pub fn clear(&mut self, handle: MarkerHandle) {
        if let Some(marker) = self.markers.get_mut(handle.0) {
            marker.cleared = true;
        }
    }

    pub fn clear_all(&mut self) {
        self.markers.clear();
    }

    /// Replace the whole marker set from a span store.
    ///
    /// One marker per in-bounds span; spans failing the bounds check are
    /// skipped (display-only guard leaving the span store untouched).
    /// Idempotent: the same inputs always produce an equivalent set.
    pub fn rebuild(&mut self, spans: &[Span], content_len: usize) {
        self.markers.clear();
        for (index, span) in spans.iter().enumerate() {
            if !span.in_bounds(content_len) {
                tracing::debug!(
                    target: "margin::markers",
                    from = span.from,
                    to = span.to,
                    content_len,
                    "skipping out-of-bounds span"
                );
                continue;
            }
            self.markers.push(Marker {
                from: span.from,
                to: span.to,
                color: span.color.clone(),
                span_index: Some(index),
                cleared: false,
            });
        }
    }

    /// Current offsets of every span-paired, still-live marker.
    pub fn read_back(&self) -> Vec<MarkerPosition> {
        self.markers
            .iter()
            .filter(|m| !m.cleared)
            .filter_map(|m| {
                m.span_index.map(|span_index| MarkerPosition {
                    span_index,
                    from: m.from,
                    to: m.to,
                })
            })
            .collect()
    }

    /// Live `(from, to, color)` triples in creation order, cleared markers
    /// excluded.
    pub fn live_ranges(&self) -> Vec<(usize, usize, &str)> {
        self.markers
            .iter()
            .filter(|m| !m.cleared)
            .map(|m| (m.from, m.to, m.color.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.markers.iter().filter(|m| !m.cleared).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shift every marker for one buffer mutation.
    pub fn apply_delta(&mut self, delta: &EditDelta) {
        for marker in &mut self.markers {
            if marker.cleared {
                continue;
            }
            // Deletion first: collapse positions inside the deleted range
            // onto its start.
            if delta.deleted > 0 {
                marker.from = shift_for_delete(marker.from, delta.at, delta.deleted);
                marker.to = shift_for_delete(marker.to, delta.at, delta.deleted);
                if marker.from >= marker.to {
                    marker.cleared = true;
                    tracing::trace!(
                        target: "margin::markers",
                        at = delta.at,
                        deleted = delta.deleted,
                        "marker cleared by deletion"
                    );
                    continue;
                }
            }
            // Then insertion at the same position.
            if delta.inserted > 0 {
                if marker.from >= delta.at {
                    marker.from += delta.inserted;
                }
                if marker.to > delta.at {
                    marker.to += delta.inserted;
                }
            }
        }
    }
}

fn shift_for_delete(pos: usize, at: usize, deleted: usize) -> usize {
    if pos <= at {
        pos
    } else if pos >= at + deleted {
        pos - deleted
    } else {
        at
    }
}
