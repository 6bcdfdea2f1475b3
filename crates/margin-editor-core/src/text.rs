//! Text buffer abstraction for the editing surface.
//!
//! All offsets are in Unicode scalar values (chars), not bytes. Every
//! mutation reports an `EditDelta`; the marker arena consumes these to keep
//! live highlight ranges in step with the document.

use std::ops::Range;

use smol_str::{SmolStr, ToSmolStr};

/// One text mutation, reduced to what range adjustment needs: `deleted`
/// chars removed at `at`, then `inserted` chars added at `at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditDelta {
    pub at: usize,
    pub inserted: usize,
    pub deleted: usize,
}

impl EditDelta {
    pub fn insertion(at: usize, inserted: usize) -> Self {
        Self {
            at,
            inserted,
            deleted: 0,
        }
    }

    pub fn deletion(at: usize, deleted: usize) -> Self {
        Self {
            at,
            inserted: 0,
            deleted,
        }
    }

    /// Net change in document length.
    pub fn len_delta(&self) -> isize {
        self.inserted as isize - self.deleted as isize
    }
}

/// A text buffer supporting efficient editing and offset conversion.
pub trait TextBuffer {
    /// Total length in bytes (UTF-8).
    fn len_bytes(&self) -> usize;

    /// Total length in chars.
    fn len_chars(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Insert text at char offset.
    fn insert(&mut self, char_offset: usize, text: &str);

    /// Delete char range.
    fn delete(&mut self, char_range: Range<usize>);

    /// Replace char range with text, reported as a single delta.
    fn replace(&mut self, char_range: Range<usize>, text: &str);

    /// Get a slice as SmolStr. Returns None if the range is invalid.
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    /// Character at offset, if in bounds.
    fn char_at(&self, char_offset: usize) -> Option<char>;

    /// The whole buffer as a String.
    fn to_string(&self) -> String;

    /// Convert char offset to byte offset.
    fn char_to_byte(&self, char_offset: usize) -> usize;

    /// Convert byte offset to char offset.
    fn byte_to_char(&self, byte_offset: usize) -> usize;

    /// Delta of the most recent mutation, if any.
    fn last_edit(&self) -> Option<EditDelta>;
}

/// Ropey-backed buffer: O(log n) edits and offset conversions.
#[derive(Clone, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
    last_edit: Option<EditDelta>,
}

impl EditorRope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
            last_edit: None,
        }
    }

    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }
}

impl TextBuffer for EditorRope {
    fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.rope.insert(char_offset, text);
        self.last_edit = Some(EditDelta::insertion(char_offset, text.chars().count()));
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let deleted = char_range.len();
        self.rope.remove(char_range.clone());
        self.last_edit = Some(EditDelta::deletion(char_range.start, deleted));
    }

    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        let deleted = char_range.len();
        self.rope.remove(char_range.clone());
        self.rope.insert(char_range.start, text);
        self.last_edit = Some(EditDelta {
            at: char_range.start,
            inserted: text.chars().count(),
            deleted,
        });
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.end > self.len_chars() || char_range.start > char_range.end {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.len_chars() {
            return None;
        }
        Some(self.rope.char(char_offset))
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn char_to_byte(&self, char_offset: usize) -> usize {
        self.rope.char_to_byte(char_offset)
    }

    fn byte_to_char(&self, byte_offset: usize) -> usize {
        self.rope.byte_to_char(byte_offset)
    }

    fn last_edit(&self) -> Option<EditDelta> {
        self.last_edit
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for EditorRope {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}
