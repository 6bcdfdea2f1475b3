//! Markdown → sanitized preview tree.
//!
//! Wiki-links and `#tags` are substituted into ordinary markdown links (with
//! `note:`/`tag:` destinations) before parsing, then the pulldown-cmark event
//! stream is folded into an `HtmlTree`. Raw HTML events are dropped rather
//! than emitted: inline tags are stripped (their inner text survives as
//! ordinary text events), block-level raw HTML is removed entirely. That is
//! the whole sanitize step; nothing script-bearing can reach the tree.

use std::sync::OnceLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use regex::Regex;
use smol_str::SmolStr;

use crate::html::{HtmlNode, HtmlTree};

/// Render markdown to the sanitized preview tree.
pub fn render(markdown: &str) -> HtmlTree {
    let source = preprocess(markdown);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(&source, options) {
        builder.event(event);
    }
    builder.finish()
}

/// The same pipeline flattened to plain text. Used to capture a span's
/// `preview_text` and as the projection fallback for older spans.
pub fn strip_to_text(markdown: &str) -> String {
    render(markdown).text_content()
}

/// `[[Target]]` / `[[Target|alias]]` → `[display](<note:Target>)` and
/// `#tag` → `[#tag](<tag:tag>)`. Runs on raw source before parsing; the
/// substitution is naive about code spans, same as the tag syntax itself.
fn preprocess(markdown: &str) -> String {
    static WIKI: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();
    let wiki = WIKI
        .get_or_init(|| Regex::new(r"\[\[([^\[\]|]+)(?:\|([^\[\]]+))?\]\]").unwrap());
    let tag = TAG
        .get_or_init(|| Regex::new(r"(^|\s)#([A-Za-z0-9_][A-Za-z0-9_/-]*)").unwrap());

    let pass1 = wiki.replace_all(markdown, |caps: &regex::Captures<'_>| {
        let target = caps[1].trim().to_string();
        let display = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| target.clone());
        format!("[{display}](<note:{target}>)")
    });
    tag.replace_all(&pass1, "$1[#$2](<tag:$2>)").into_owned()
}

#[derive(Default)]
struct TreeBuilder {
    tree: HtmlTree,
    stack: Vec<HtmlNode>,
    /// How many stack entries each open Start event pushed (code blocks
    /// push `pre` + `code`).
    opens: Vec<u8>,
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(_) => self.close(),
            Event::Text(text) => self.push_text(&text),
            Event::Code(text) => {
                let mut code = HtmlNode::element("code");
                code.push_child(HtmlNode::text(text.as_ref()));
                self.push_node(code);
            }
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.push_node(HtmlNode::element("br")),
            Event::Rule => self.push_node(HtmlNode::element("hr")),
            Event::TaskListMarker(checked) => {
                let mut attrs = vec![
                    (SmolStr::new("type"), "checkbox".to_string()),
                    (SmolStr::new("disabled"), String::new()),
                ];
                if checked {
                    attrs.push((SmolStr::new("checked"), String::new()));
                }
                self.push_node(HtmlNode::element_with_attrs("input", attrs));
            }
            Event::FootnoteReference(name) => {
                let mut sup = HtmlNode::element("sup");
                sup.push_child(HtmlNode::text(name.as_ref()));
                self.push_node(sup);
            }
            // Sanitize: raw HTML never reaches the tree.
            Event::Html(_) | Event::InlineHtml(_) => {}
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        let mut pushed = 1u8;
        let node = match tag {
            Tag::Paragraph => HtmlNode::element("p"),
            Tag::Heading { level, .. } => HtmlNode::element(heading_tag(level)),
            Tag::BlockQuote(_) => HtmlNode::element("blockquote"),
            Tag::CodeBlock(kind) => {
                let mut attrs = Vec::new();
                if let CodeBlockKind::Fenced(lang) = &kind {
                    if !lang.is_empty() {
                        attrs.push((SmolStr::new("class"), format!("language-{lang}")));
                    }
                }
                self.stack.push(HtmlNode::element("pre"));
                pushed = 2;
                HtmlNode::element_with_attrs("code", attrs)
            }
            Tag::List(Some(_)) => HtmlNode::element("ol"),
            Tag::List(None) => HtmlNode::element("ul"),
            Tag::Item => HtmlNode::element("li"),
            Tag::Emphasis => HtmlNode::element("em"),
            Tag::Strong => HtmlNode::element("strong"),
            Tag::Strikethrough => HtmlNode::element("del"),
            Tag::Link { dest_url, title, .. } => {
                let mut attrs = vec![(SmolStr::new("href"), dest_url.to_string())];
                if let Some(class) = link_class(&dest_url) {
                    attrs.push((SmolStr::new("class"), class.to_string()));
                }
                if !title.is_empty() {
                    attrs.push((SmolStr::new("title"), title.to_string()));
                }
                HtmlNode::element_with_attrs("a", attrs)
            }
            Tag::Image { dest_url, title, .. } => {
                let mut attrs = vec![(SmolStr::new("src"), dest_url.to_string())];
                if !title.is_empty() {
                    attrs.push((SmolStr::new("title"), title.to_string()));
                }
                HtmlNode::element_with_attrs("img", attrs)
            }
            Tag::Table(_) => HtmlNode::element("table"),
            Tag::TableHead => HtmlNode::element("tr"),
            Tag::TableRow => HtmlNode::element("tr"),
            Tag::TableCell => HtmlNode::element("td"),
            Tag::FootnoteDefinition(_) => HtmlNode::element("div"),
            _ => HtmlNode::element("div"),
        };
        self.stack.push(node);
        self.opens.push(pushed);
    }

    fn close(&mut self) {
        let Some(pushed) = self.opens.pop() else {
            return;
        };
        for _ in 0..pushed {
            if let Some(node) = self.stack.pop() {
                let node = finalize(node);
                self.push_node(node);
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        self.push_node(HtmlNode::text(text));
    }

    fn push_node(&mut self, node: HtmlNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.push_child(node),
            None => self.tree.push(node),
        }
    }

    fn finish(mut self) -> HtmlTree {
        // Unbalanced input; close whatever is still open.
        while !self.stack.is_empty() {
            self.opens.push(1);
            self.close();
        }
        self.tree
    }
}

/// Images carry their alt text as child events; fold it into the attribute.
fn finalize(node: HtmlNode) -> HtmlNode {
    match node {
        HtmlNode::Element { tag, mut attrs, children }
            if tag == "img" && !children.is_empty() =>
        {
            let mut alt = String::new();
            for child in &children {
                if let HtmlNode::Text(text) = child {
                    alt.push_str(text);
                }
            }
            attrs.push((SmolStr::new("alt"), alt));
            HtmlNode::Element {
                tag,
                attrs,
                children: Vec::new(),
            }
        }
        other => other,
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn link_class(dest: &str) -> Option<&'static str> {
    if dest.starts_with("note:") {
        Some("wikilink")
    } else if dest.starts_with("tag:") {
        Some("tag")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_paragraph() {
        let tree = render("hello *world*");
        assert_eq!(tree.to_html(), "<p>hello <em>world</em></p>");
        assert_eq!(tree.text_content(), "hello world");
    }

    #[test]
    fn test_heading_levels() {
        let tree = render("## Two");
        assert_eq!(tree.to_html(), "<h2>Two</h2>");
    }

    #[test]
    fn test_strip_removes_syntax() {
        assert_eq!(strip_to_text("**bold** and `code`"), "bold and code");
        assert_eq!(strip_to_text("# Heading"), "Heading");
    }

    #[test]
    fn test_wikilink_substitution() {
        let tree = render("see [[Other Note|the other]]");
        let html = tree.to_html();
        assert!(html.contains("<a href=\"note:Other Note\" class=\"wikilink\">the other</a>"), "{html}");
        assert_eq!(tree.text_content(), "see the other");
    }

    #[test]
    fn test_tag_substitution() {
        let tree = render("about #rust stuff");
        let html = tree.to_html();
        assert!(html.contains("<a href=\"tag:rust\" class=\"tag\">#rust</a>"), "{html}");
        assert_eq!(tree.text_content(), "about #rust stuff");
    }

    #[test]
    fn test_inline_html_stripped_keeps_text() {
        let tree = render("a <b>bold</b> claim");
        assert_eq!(tree.text_content(), "a bold claim");
        assert!(!tree.to_html().contains("<b>"));
    }

    #[test]
    fn test_script_never_reaches_tree() {
        let html = render("<script>alert(1)</script>").to_html();
        assert!(!html.contains("<script>"), "{html}");
    }

    #[test]
    fn test_code_block() {
        let tree = render("```rust\nlet x = 1;\n```");
        let html = tree.to_html();
        assert!(html.starts_with("<pre><code class=\"language-rust\">"), "{html}");
    }

    #[test]
    fn test_list_text_content() {
        let tree = render("- one\n- two");
        assert_eq!(tree.text_content(), "one\ntwo");
    }
}
