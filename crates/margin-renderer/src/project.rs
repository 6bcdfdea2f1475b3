//! Preview projection: locating highlight text inside the rendered tree.
//!
//! Source character offsets mean nothing in the preview (markdown syntax is
//! gone, links and tags are substituted), so spans are re-anchored by text
//! search over the tree's text nodes. Longest match text goes first so a
//! short highlight cannot consume text out of the middle of a longer one.
//! A span whose text cannot be found simply shows no marker; it stays intact
//! in the span store and in the editing surface.

use margin_store::Span;

use crate::html::{HtmlNode, HtmlTree};
use crate::render::strip_to_text;

/// Tag used for injected highlight markers.
pub const MARK_TAG: &str = "mark";

/// Project spans onto the rendered tree. Returns how many spans were
/// actually wrapped (the rest are silent misses).
pub fn project(tree: &mut HtmlTree, spans: &[Span]) -> usize {
    // (match_text, color), longest first. Stable sort keeps creation order
    // among equal lengths.
    let mut targets: Vec<(String, &str)> = spans
        .iter()
        .filter_map(|span| {
            let text = if !span.preview_text.is_empty() {
                span.preview_text.clone()
            } else {
                // Older spans predate preview_text capture; re-strip the
                // current source text as a best effort.
                strip_to_text(&span.text)
            };
            (!text.is_empty()).then_some((text, span.color.as_str()))
        })
        .collect();
    targets.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

    let mut wrapped = 0;
    for (needle, color) in &targets {
        if wrap_first(&mut tree.children, needle, color) {
            wrapped += 1;
        } else {
            tracing::debug!(target: "margin::project", needle = %needle, "no preview match for span");
        }
    }
    wrapped
}

/// Find the first text node containing `needle`, split it into
/// before/match/after, and wrap the match in a `<mark>`. At most one wrap.
/// Text already inside an injected marker is not re-matched.
fn wrap_first(children: &mut Vec<HtmlNode>, needle: &str, color: &str) -> bool {
    let mut i = 0;
    while i < children.len() {
        match &mut children[i] {
            HtmlNode::Text(text) => {
                if let Some(at) = text.find(needle) {
                    let before = text[..at].to_string();
                    let after = text[at + needle.len()..].to_string();

                    let mut mark = HtmlNode::element_with_attrs(
                        MARK_TAG,
                        vec![
                            ("class".into(), "note-highlight".to_string()),
                            ("style".into(), format!("background-color: {color};")),
                        ],
                    );
                    mark.push_child(HtmlNode::text(needle));

                    let mut replacement = Vec::with_capacity(3);
                    if !before.is_empty() {
                        replacement.push(HtmlNode::Text(before));
                    }
                    replacement.push(mark);
                    if !after.is_empty() {
                        replacement.push(HtmlNode::Text(after));
                    }
                    children.splice(i..=i, replacement);
                    return true;
                }
            }
            HtmlNode::Element { tag, children: kids, .. } => {
                if tag != MARK_TAG && wrap_first(kids, needle, color) {
                    return true;
                }
            }
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;

    fn span(preview_text: &str, color: &str) -> Span {
        Span::new(0, 1, preview_text, preview_text, color)
    }

    #[test]
    fn test_basic_projection() {
        let mut tree = render("hello world");
        let spans = vec![span("world", "#ffe066")];
        assert_eq!(project(&mut tree, &spans), 1);
        let html = tree.to_html();
        assert!(
            html.contains("hello <mark class=\"note-highlight\" style=\"background-color: #ffe066;\">world</mark>"),
            "{html}"
        );
    }

    #[test]
    fn test_longest_first_ordering() {
        // "cat" must not consume the middle of "category".
        let mut tree = render("a category of cats");
        let spans = vec![span("cat", "#a"), span("category", "#b")];
        assert_eq!(project(&mut tree, &spans), 2);
        let html = tree.to_html();
        assert!(
            html.contains("background-color: #b;\">category</mark>"),
            "category wrapped as one unit: {html}"
        );
        // The short span lands on "cats", not inside the longer mark.
        assert!(html.contains("of <mark"), "{html}");
        assert!(html.contains(">cat</mark>s"), "{html}");
    }

    #[test]
    fn test_miss_is_silent() {
        let mut tree = render("nothing relevant here");
        let before = tree.clone();
        let spans = vec![span("absent text", "#a")];
        assert_eq!(project(&mut tree, &spans), 0);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_at_most_one_wrap_per_span() {
        let mut tree = render("echo echo echo");
        let spans = vec![span("echo", "#a")];
        project(&mut tree, &spans);
        let html = tree.to_html();
        assert_eq!(html.matches("<mark").count(), 1, "{html}");
    }

    #[test]
    fn test_fallback_strips_current_text() {
        // preview_text empty: projector re-strips the raw source text.
        let mut tree = render("some **bold move** here");
        let spans = vec![Span::new(5, 18, "**bold move**", "", "#a")];
        assert_eq!(project(&mut tree, &spans), 1);
        assert!(tree.to_html().contains(">bold move</mark>"));
    }

    #[test]
    fn test_empty_match_text_skipped() {
        let mut tree = render("text");
        let spans = vec![Span::new(0, 1, "", "", "#a")];
        assert_eq!(project(&mut tree, &spans), 0);
    }

    #[test]
    fn test_match_inside_nested_element() {
        let mut tree = render("intro\n\n> quoted *deep* words");
        let spans = vec![span("deep", "#a")];
        assert_eq!(project(&mut tree, &spans), 1);
        assert!(tree.to_html().contains("<em><mark"));
    }
}
