//! Regex search and replace over note content.
//!
//! Malformed patterns never error: search yields zero matches (the tool is
//! best-effort, there is nothing useful to do with a half-typed regex).
//! Replacement goes through the text buffer one match at a time so live
//! highlight markers shift correctly with each edit.

use regex::Regex;

use crate::marker::MarkerArena;
use crate::text::TextBuffer;

/// One search hit, in char offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchMatch {
    pub from: usize,
    pub to: usize,
}

/// All matches of `pattern` in `content`. An invalid pattern is treated as
/// matching nothing.
pub fn search(content: &str, pattern: &str) -> Vec<SearchMatch> {
    let Ok(re) = Regex::new(pattern) else {
        tracing::debug!(target: "margin::search", pattern, "invalid search pattern");
        return Vec::new();
    };
    // Zero-width matches would loop replace_all below and mean nothing to
    // highlight; skip them.
    let mut out = Vec::new();
    let mut chars_before = 0usize;
    let mut last_byte = 0usize;
    for m in re.find_iter(content) {
        if m.start() == m.end() {
            continue;
        }
        chars_before += content[last_byte..m.start()].chars().count();
        let from = chars_before;
        chars_before += content[m.start()..m.end()].chars().count();
        last_byte = m.end();
        out.push(SearchMatch {
            from,
            to: chars_before,
        });
    }
    out
}

/// Replace every match of `pattern`, applying each edit through the buffer
/// and shifting the marker arena. Capture-group references (`$1`) in
/// `replacement` are expanded. Returns the number of replacements.
pub fn replace_all<B: TextBuffer>(
    buffer: &mut B,
    arena: &mut MarkerArena,
    pattern: &str,
    replacement: &str,
) -> usize {
    let Ok(re) = Regex::new(pattern) else {
        return 0;
    };
    let content = buffer.to_string();
    let matches = search(&content, pattern);

    // Back to front so earlier match offsets stay valid.
    for m in matches.iter().rev() {
        let matched = buffer
            .slice(m.from..m.to)
            .map(|s| s.to_string())
            .unwrap_or_default();
        let new_text = re.replace(&matched, replacement).into_owned();
        buffer.replace(m.from..m.to, &new_text);
        if let Some(delta) = buffer.last_edit() {
            arena.apply_delta(&delta);
        }
    }
    matches.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::EditorRope;

    #[test]
    fn test_plain_search() {
        let matches = search("one two one", "one");
        assert_eq!(
            matches,
            vec![SearchMatch { from: 0, to: 3 }, SearchMatch { from: 8, to: 11 }]
        );
    }

    #[test]
    fn test_invalid_pattern_yields_nothing() {
        assert!(search("anything", "[unclosed").is_empty());
        let mut buffer = EditorRope::from_str("anything");
        let mut arena = MarkerArena::new();
        assert_eq!(replace_all(&mut buffer, &mut arena, "[unclosed", "x"), 0);
        assert_eq!(buffer.to_string(), "anything");
    }

    #[test]
    fn test_char_offsets_with_multibyte() {
        // 'é' is one char, two bytes; offsets must be char-based.
        let matches = search("héllo world", "world");
        assert_eq!(matches, vec![SearchMatch { from: 6, to: 11 }]);
    }

    #[test]
    fn test_replace_all_shifts_markers() {
        let mut buffer = EditorRope::from_str("aaa XYZ aaa");
        let mut arena = MarkerArena::new();
        arena.mark(4, 7, "#a");

        let n = replace_all(&mut buffer, &mut arena, "aaa", "bbbbb");
        assert_eq!(n, 2);
        assert_eq!(buffer.to_string(), "bbbbb XYZ bbbbb");
        // Marker still bounds XYZ after the earlier text grew by two.
        assert_eq!(arena.live_ranges(), vec![(6, 9, "#a")]);
        assert_eq!(buffer.slice(6..9).as_deref(), Some("XYZ"));
    }

    #[test]
    fn test_replace_with_capture_groups() {
        let mut buffer = EditorRope::from_str("2024-01-31");
        let mut arena = MarkerArena::new();
        replace_all(&mut buffer, &mut arena, r"(\d{4})-(\d{2})", "$2/$1");
        assert_eq!(buffer.to_string(), "01/2024-31");
    }

    #[test]
    fn test_zero_width_matches_skipped() {
        assert!(search("abc", "x*").is_empty());
    }
}
