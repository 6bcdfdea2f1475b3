//! Derivation of tags and wiki-links from note content.
//!
//! Both lists on `Note` are caches of what the content already says; they are
//! recomputed on load and save so manual record edits can never leave them
//! stale.

use std::sync::OnceLock;

use regex::Regex;

/// `#tag` tokens: start-of-line or whitespace, then `#`, then a word-ish
/// body allowing `/` and `-` (nested tags like `#project/alpha`).
/// `# heading` does not match (space after the hash).
fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\s)#([A-Za-z0-9_][A-Za-z0-9_/-]*)").unwrap())
}

/// `[[Target]]` or `[[Target|alias]]`.
fn wiki_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[([^\[\]|]+)(?:\|([^\[\]]+))?\]\]").unwrap())
}

/// Extract tags in first-seen order, deduplicated.
pub fn tags(content: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cap in tag_re().captures_iter(content) {
        let tag = cap[1].to_string();
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// A wiki-link occurrence: the target note title and its display text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WikiLink {
    pub target: String,
    pub alias: Option<String>,
}

impl WikiLink {
    /// What the link renders as: the alias if present, else the target.
    pub fn display(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.target)
    }
}

/// Every wiki-link occurrence in order, duplicates included.
pub fn wiki_links(content: &str) -> Vec<WikiLink> {
    wiki_link_re()
        .captures_iter(content)
        .map(|cap| WikiLink {
            target: cap[1].trim().to_string(),
            alias: cap.get(2).map(|m| m.as_str().trim().to_string()),
        })
        .collect()
}

/// Distinct link targets in first-seen order (what `Note.links` stores).
pub fn wiki_link_targets(content: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for link in wiki_links(content) {
        if !out.contains(&link.target) {
            out.push(link.target);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_basic() {
        assert_eq!(tags("a #one b #two"), vec!["one", "two"]);
        assert_eq!(tags("#start of line"), vec!["start"]);
    }

    #[test]
    fn test_tags_skip_headings_and_mid_word() {
        // "# Heading" has a space after the hash; "foo#bar" is mid-word.
        assert!(tags("# Heading\nfoo#bar").is_empty());
    }

    #[test]
    fn test_tags_dedup_and_nesting() {
        assert_eq!(tags("#a #b #a #a/b"), vec!["a", "b", "a/b"]);
    }

    #[test]
    fn test_wiki_links_with_alias() {
        let links = wiki_links("see [[Target]] and [[Other|shown text]]");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].target, "Target");
        assert_eq!(links[0].display(), "Target");
        assert_eq!(links[1].target, "Other");
        assert_eq!(links[1].display(), "shown text");
    }

    #[test]
    fn test_wiki_link_targets_dedup() {
        let targets = wiki_link_targets("[[A]] [[B|x]] [[A|y]]");
        assert_eq!(targets, vec!["A", "B"]);
    }

    #[test]
    fn test_unclosed_link_ignored() {
        assert!(wiki_links("[[not closed").is_empty());
    }
}
