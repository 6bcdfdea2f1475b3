//! Owned HTML node tree for the preview surface.
//!
//! The preview is rebuilt from scratch on every render, so the tree is a
//! plain owned value with no parent pointers. Adjacent text siblings are
//! merged on insertion; the projector's text-node search depends on runs of
//! text not being split at arbitrary parser-event boundaries.

use std::fmt::Write;

use smol_str::SmolStr;

/// One node of the rendered preview tree.
#[derive(Clone, Debug, PartialEq)]
pub enum HtmlNode {
    Element {
        tag: SmolStr,
        attrs: Vec<(SmolStr, String)>,
        children: Vec<HtmlNode>,
    },
    Text(String),
}

impl HtmlNode {
    pub fn element(tag: &str) -> Self {
        HtmlNode::Element {
            tag: SmolStr::new(tag),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn element_with_attrs(tag: &str, attrs: Vec<(SmolStr, String)>) -> Self {
        HtmlNode::Element {
            tag: SmolStr::new(tag),
            attrs,
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        HtmlNode::Text(text.into())
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            HtmlNode::Element { tag, .. } => Some(tag),
            HtmlNode::Text(_) => None,
        }
    }

    /// Append a child, merging consecutive text nodes.
    pub fn push_child(&mut self, child: HtmlNode) {
        if let HtmlNode::Element { children, .. } = self {
            push_merged(children, child);
        }
    }
}

/// The rendered preview document (a forest of block nodes).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HtmlTree {
    pub children: Vec<HtmlNode>,
}

impl HtmlTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: HtmlNode) {
        push_merged(&mut self.children, node);
    }

    /// Concatenated text content of the whole tree, with newlines after
    /// block-level elements. This is what "the rendered text" means for
    /// preview projection fallbacks.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            collect_text(child, &mut out);
        }
        while out.ends_with('\n') {
            out.pop();
        }
        out
    }

    /// Serialize to an HTML string (attribute and text escaping applied).
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(child, &mut out);
        }
        out
    }
}

fn push_merged(children: &mut Vec<HtmlNode>, node: HtmlNode) {
    if let (Some(HtmlNode::Text(last)), HtmlNode::Text(new)) = (children.last_mut(), &node) {
        last.push_str(new);
        return;
    }
    children.push(node);
}

const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "pre", "div", "table", "tr",
];

fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

fn collect_text(node: &HtmlNode, out: &mut String) {
    match node {
        HtmlNode::Text(text) => out.push_str(text),
        HtmlNode::Element { tag, children, .. } => {
            if tag == "br" {
                out.push('\n');
                return;
            }
            for child in children {
                collect_text(child, out);
            }
            if is_block(tag) && !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }
}

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input"];

fn write_node(node: &HtmlNode, out: &mut String) {
    match node {
        HtmlNode::Text(text) => out.push_str(&escape_text(text)),
        HtmlNode::Element { tag, attrs, children } => {
            let _ = write!(out, "<{tag}");
            for (name, value) in attrs {
                let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
            }
            if VOID_TAGS.contains(&tag.as_str()) {
                out.push_str(" />");
                return;
            }
            out.push('>');
            for child in children {
                write_node(child, out);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}

/// Escape text content for HTML output.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = escape_text(value);
    out = out.replace('"', "&quot;");
    out
}
