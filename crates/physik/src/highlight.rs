//! Search-term highlighting.
//!
//! The text algorithm is [`Matcher::segments`]: it splits a string into
//! literal and matched pieces whose concatenation is the input. Rendering is a
//! separate step, done here over [`ContentNode`] trees and in the browser
//! front end over live DOM text nodes, both using the marker constants below.

use regex::{Regex, RegexBuilder};

/// Tag wrapping each occurrence.
pub const MARK_TAG: &str = "mark";
/// Class on each occurrence marker; the stylesheet targets this.
pub const MARK_CLASS: &str = "search-highlight";
/// Class on the span that replaces a text node holding one or more markers.
pub const WRAPPER_CLASS: &str = "search-highlight-wrap";
/// Elements whose text is never scanned or touched.
pub const SKIPPED_TAGS: [&str; 2] = ["script", "style"];

pub fn is_skipped_tag(tag: &str) -> bool {
    SKIPPED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// One piece of a segmented string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    Literal(&'t str),
    Match(&'t str),
}

impl<'t> Segment<'t> {
    pub fn text(&self) -> &'t str {
        match self {
            Segment::Literal(s) | Segment::Match(s) => s,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Segment::Match(_))
    }
}

/// Case-insensitive literal matcher for one query.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Build a matcher. Returns `None` for an empty query; the query is
    /// matched literally, never as a pattern.
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        match RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
        {
            Ok(regex) => Some(Self { regex }),
            Err(e) => {
                log::warn!("highlight: cannot build matcher for {query:?}: {e}");
                None
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Split `text` into literal and matched segments, leftmost-first and
    /// non-overlapping. Empty literals are omitted.
    pub fn segments<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut out = Vec::new();
        let mut last = 0;
        for m in self.regex.find_iter(text) {
            if m.start() > last {
                out.push(Segment::Literal(&text[last..m.start()]));
            }
            out.push(Segment::Match(m.as_str()));
            last = m.end();
        }
        if last < text.len() {
            out.push(Segment::Literal(&text[last..]));
        }
        out
    }
}

/// Convenience wrapper around [`Matcher::segments`].
pub fn segment<'t>(text: &'t str, query: &str) -> Vec<Segment<'t>> {
    match Matcher::new(query) {
        Some(m) => m.segments(text),
        None if text.is_empty() => Vec::new(),
        None => vec![Segment::Literal(text)],
    }
}

/// A DOM-equivalent content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub class: Option<String>,
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn text(s: impl Into<String>) -> Self {
        ContentNode::Text(s.into())
    }

    pub fn element(tag: impl Into<String>, children: Vec<ContentNode>) -> Self {
        ContentNode::Element(Element {
            tag: tag.into(),
            class: None,
            children,
        })
    }

    pub fn with_class(
        tag: impl Into<String>,
        class: impl Into<String>,
        children: Vec<ContentNode>,
    ) -> Self {
        ContentNode::Element(Element {
            tag: tag.into(),
            class: Some(class.into()),
            children,
        })
    }

    /// Concatenated text of the subtree, like the DOM's `textContent`.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ContentNode::Text(s) => out.push_str(s),
            ContentNode::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Text nodes outside `script` / `style`, in document order. This is the
    /// text search classifies sections on.
    pub fn text_chunks(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_chunks(&mut out);
        out
    }

    /// Visible text of the subtree: `text_content` without skipped elements.
    pub fn visible_text(&self) -> String {
        self.text_chunks().concat()
    }

    fn collect_chunks<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ContentNode::Text(s) => out.push(s.as_str()),
            ContentNode::Element(el) if is_skipped_tag(&el.tag) => {}
            ContentNode::Element(el) => {
                for child in &el.children {
                    child.collect_chunks(out);
                }
            }
        }
    }

    /// Number of occurrence markers in the subtree.
    pub fn highlight_count(&self) -> usize {
        match self {
            ContentNode::Text(_) => 0,
            ContentNode::Element(el) => {
                let own = usize::from(el.is_marker());
                own + el.children.iter().map(|c| c.highlight_count()).sum::<usize>()
            }
        }
    }

    /// Mark every occurrence of `query`. Existing highlights are cleared
    /// first. Returns the number of markers inserted.
    pub fn apply_highlights(&mut self, query: &str) -> usize {
        self.clear_highlights();
        let Some(matcher) = Matcher::new(query) else {
            return 0;
        };
        match self {
            ContentNode::Element(el) => el.highlight_children(&matcher),
            // A bare text root has no parent to host a wrapper.
            ContentNode::Text(_) => 0,
        }
    }

    /// Remove all markers and wrappers, restoring the original text. No-op
    /// when nothing is highlighted.
    pub fn clear_highlights(&mut self) {
        if let ContentNode::Element(el) = self {
            el.clear_children();
        }
    }
}

impl Element {
    fn has_class(&self, class: &str) -> bool {
        self.class
            .as_deref()
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    fn is_marker(&self) -> bool {
        self.tag.eq_ignore_ascii_case(MARK_TAG) && self.has_class(MARK_CLASS)
    }

    fn is_wrapper(&self) -> bool {
        self.tag.eq_ignore_ascii_case("span") && self.has_class(WRAPPER_CLASS)
    }

    fn highlight_children(&mut self, matcher: &Matcher) -> usize {
        if is_skipped_tag(&self.tag) {
            return 0;
        }
        let mut inserted = 0;
        for child in &mut self.children {
            match child {
                ContentNode::Element(el) => inserted += el.highlight_children(matcher),
                ContentNode::Text(text) => {
                    if !matcher.is_match(text) {
                        continue;
                    }
                    let parts: Vec<ContentNode> = matcher
                        .segments(text)
                        .into_iter()
                        .map(|seg| match seg {
                            Segment::Literal(s) => ContentNode::text(s),
                            Segment::Match(s) => {
                                inserted += 1;
                                ContentNode::with_class(
                                    MARK_TAG,
                                    MARK_CLASS,
                                    vec![ContentNode::text(s)],
                                )
                            }
                        })
                        .collect();
                    *child = ContentNode::with_class("span", WRAPPER_CLASS, parts);
                }
            }
        }
        inserted
    }

    fn clear_children(&mut self) {
        let mut changed = false;
        let mut out = Vec::with_capacity(self.children.len());
        for child in self.children.drain(..) {
            match child {
                ContentNode::Element(mut el) if el.is_marker() || el.is_wrapper() => {
                    el.clear_children();
                    changed = true;
                    if el.is_marker() {
                        out.push(ContentNode::Text(
                            ContentNode::Element(el).text_content(),
                        ));
                    } else {
                        out.extend(el.children);
                    }
                }
                ContentNode::Element(mut el) => {
                    el.clear_children();
                    out.push(ContentNode::Element(el));
                }
                text => out.push(text),
            }
        }
        self.children = if changed { normalize(out) } else { out };
    }
}

/// Merge adjacent text nodes and drop empty ones.
fn normalize(nodes: Vec<ContentNode>) -> Vec<ContentNode> {
    let mut out: Vec<ContentNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            ContentNode::Text(s) if s.is_empty() => {}
            ContentNode::Text(s) => {
                if let Some(ContentNode::Text(prev)) = out.last_mut() {
                    prev.push_str(&s);
                } else {
                    out.push(ContentNode::Text(s));
                }
            }
            el => out.push(el),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> ContentNode {
        ContentNode::element(
            "section",
            vec![
                ContentNode::element("h2", vec![ContentNode::text("Quantenphysik")]),
                ContentNode::element(
                    "p",
                    vec![
                        ContentNode::text("Die QUANTENmechanik beschreibt "),
                        ContentNode::element("em", vec![ContentNode::text("quanten")]),
                        ContentNode::text(" und Wellen."),
                    ],
                ),
                ContentNode::element("script", vec![ContentNode::text("var quanten = 1;")]),
                ContentNode::element("style", vec![ContentNode::text(".quanten {}")]),
            ],
        )
    }

    #[test]
    fn visible_text_skips_script_and_style() {
        let s = section();
        let text = s.visible_text();
        assert!(text.starts_with("QuantenphysikDie QUANTENmechanik"));
        assert!(!text.contains("var quanten"));
        assert!(!text.contains(".quanten"));
        assert!(s.text_content().contains("var quanten"));
        assert_eq!(s.text_chunks().len(), 4);
    }

    #[test]
    fn segments_cover_input() {
        let segs = segment("aXa xa", "xa");
        assert_eq!(
            segs,
            vec![
                Segment::Literal("a"),
                Segment::Match("Xa"),
                Segment::Literal(" "),
                Segment::Match("xa"),
            ]
        );
        let joined: String = segs.iter().map(|s| s.text()).collect();
        assert_eq!(joined, "aXa xa");
    }

    #[test]
    fn segments_are_non_overlapping_leftmost_first() {
        let segs = segment("aaaa", "aa");
        assert_eq!(segs, vec![Segment::Match("aa"), Segment::Match("aa")]);
        let segs = segment("aaa", "aa");
        assert_eq!(segs, vec![Segment::Match("aa"), Segment::Literal("a")]);
    }

    #[test]
    fn query_is_literal_not_pattern() {
        let segs = segment("f(x) = x.y", "x.");
        assert_eq!(
            segs,
            vec![Segment::Literal("f(x) = "), Segment::Match("x."), Segment::Literal("y")]
        );
        assert_eq!(segment("a+b", "(").len(), 1);
    }

    #[test]
    fn empty_query_is_single_literal() {
        assert_eq!(segment("abc", ""), vec![Segment::Literal("abc")]);
        assert!(segment("", "").is_empty());
    }

    #[test]
    fn unicode_text_slices_on_char_boundaries() {
        let segs = segment("Schwingungsdämpfung Dämpfung", "dämpfung");
        let matched: Vec<&str> = segs.iter().filter(|s| s.is_match()).map(|s| s.text()).collect();
        assert_eq!(matched, vec!["dämpfung", "Dämpfung"]);
    }

    #[test]
    fn apply_marks_every_visible_occurrence() {
        let mut s = section();
        let n = s.apply_highlights("quanten");
        assert_eq!(n, 3);
        assert_eq!(s.highlight_count(), 3);
    }

    #[test]
    fn script_and_style_untouched() {
        let mut s = section();
        s.apply_highlights("quanten");
        let ContentNode::Element(root) = &s else { panic!() };
        assert_eq!(
            root.children[2],
            ContentNode::element("script", vec![ContentNode::text("var quanten = 1;")])
        );
        assert_eq!(
            root.children[3],
            ContentNode::element("style", vec![ContentNode::text(".quanten {}")])
        );
    }

    #[test]
    fn apply_then_clear_restores_text_and_structure() {
        let original = section();
        let mut s = original.clone();
        s.apply_highlights("quanten");
        assert_eq!(s.text_content(), original.text_content());
        s.clear_highlights();
        assert_eq!(s.text_content(), original.text_content());
        assert_eq!(s, original);
        assert_eq!(s.highlight_count(), 0);
    }

    #[test]
    fn reapply_does_not_nest() {
        let mut s = section();
        s.apply_highlights("quanten");
        s.apply_highlights("wellen");
        assert_eq!(s.highlight_count(), 1);
        s.clear_highlights();
        assert_eq!(s, section());
    }

    #[test]
    fn clear_without_highlights_is_noop() {
        let mut s = ContentNode::element(
            "p",
            vec![ContentNode::text("a"), ContentNode::text("b")],
        );
        let before = s.clone();
        s.clear_highlights();
        assert_eq!(s, before);
    }

    #[test]
    fn clear_coalesces_fragments() {
        let mut s = ContentNode::element("p", vec![ContentNode::text("xx welle yy")]);
        s.apply_highlights("welle");
        s.clear_highlights();
        assert_eq!(
            s,
            ContentNode::element("p", vec![ContentNode::text("xx welle yy")])
        );
    }

    #[test]
    fn whole_text_match_leaves_no_empty_nodes() {
        let mut s = ContentNode::element("p", vec![ContentNode::text("Welle")]);
        assert_eq!(s.apply_highlights("welle"), 1);
        let ContentNode::Element(p) = &s else { panic!() };
        let ContentNode::Element(wrap) = &p.children[0] else { panic!() };
        assert_eq!(wrap.children.len(), 1);
        s.clear_highlights();
        assert_eq!(s, ContentNode::element("p", vec![ContentNode::text("Welle")]));
    }
}
