//! Core editor types: selections and modes.

use std::ops::Range;

/// Text selection with anchor and head positions, in character offsets.
///
/// The anchor is where the selection started, the head is where the cursor
/// is now. They may be in any order; use `start()`/`end()` for ordered
/// bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// A collapsed selection (caret).
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_caret(&self) -> bool {
        self.anchor == self.head
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.is_caret()
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

/// Which surface is visible and authoritative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Editing surface visible, preview hidden.
    #[default]
    Edit,
    /// Preview visible and editable, editing surface hidden.
    Preview,
    /// Both visible; the editing surface is authoritative, preview read-only.
    Split,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Edit => "edit",
            Mode::Preview => "preview",
            Mode::Split => "split",
        }
    }

    /// Parse a persisted mode string; unknown values fall back to `Edit`.
    pub fn from_str(s: &str) -> Self {
        match s {
            "preview" => Mode::Preview,
            "split" => Mode::Split,
            _ => Mode::Edit,
        }
    }
}
