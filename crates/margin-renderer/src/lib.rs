//! margin-renderer: markdown → sanitized preview tree, plain-text stripping,
//! and preview projection of highlight spans.

pub mod html;
pub mod project;
pub mod render;

pub use html::{HtmlNode, HtmlTree};
pub use project::{MARK_TAG, project};
pub use render::{render, strip_to_text};
