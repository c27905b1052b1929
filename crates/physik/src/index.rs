//! Flat index of the page's show/hide-able content sections.

/// One content section as captured at startup.
///
/// Text is kept per visible text node, the same unit highlighting works on,
/// so a section only matches where a highlight can be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    /// Lowercased visible text nodes.
    chunks: Vec<String>,
    pub visible: bool,
}

impl Section {
    /// A section with a single text node.
    pub fn new(id: impl Into<String>, text: &str) -> Self {
        Self::from_chunks(id, [text])
    }

    /// A section from its visible text nodes, in document order.
    pub fn from_chunks<I, S>(id: impl Into<String>, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.into(),
            chunks: chunks
                .into_iter()
                .map(|c| c.as_ref().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
            visible: true,
        }
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// True if some single text node contains `query`.
    pub fn matches(&self, query: &str) -> bool {
        self.chunks.iter().any(|c| c.contains(query))
    }
}

/// Classification of one section against a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Position of the section in the index.
    pub index: usize,
    pub id: String,
    pub matched: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SectionIndex {
    sections: Vec<Section>,
}

impl SectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Classify every section. `query` must already be normalized; an empty
    /// query matches everything.
    pub fn filter(&self, query: &str) -> Vec<MatchResult> {
        self.sections
            .iter()
            .enumerate()
            .map(|(index, s)| MatchResult {
                index,
                id: s.id.clone(),
                matched: query.is_empty() || s.matches(query),
            })
            .collect()
    }

    /// Record the visibility applied to the page.
    pub fn set_visible(&mut self, index: usize, visible: bool) {
        if let Some(s) = self.sections.get_mut(index) {
            s.visible = visible;
        }
    }

    pub fn visible_count(&self) -> usize {
        self.sections.iter().filter(|s| s.visible).count()
    }
}

impl FromIterator<Section> for SectionIndex {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

/// Lowercase and trim raw input.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SectionIndex {
        [
            Section::new("mechanik", "Mechanik: Kräfte und Schwingungen"),
            Section::new("wellen", "Wellen und Optik"),
            Section::new("quanten", "Quantenphysik und Welle-Teilchen-Dualismus"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn filter_is_total_and_ordered() {
        let idx = index();
        for q in ["", "welle", "zzz", "und"] {
            let res = idx.filter(q);
            assert_eq!(res.len(), idx.len());
            let ids: Vec<&str> = res.iter().map(|r| r.id.as_str()).collect();
            assert_eq!(ids, vec!["mechanik", "wellen", "quanten"]);
        }
    }

    #[test]
    fn substring_match_on_lowercased_text() {
        let res = index().filter("welle");
        let matched: Vec<bool> = res.iter().map(|r| r.matched).collect();
        assert_eq!(matched, vec![false, true, true]);
    }

    #[test]
    fn match_must_lie_within_one_text_node() {
        let s = Section::from_chunks("quanten", ["Quanten", "mechanik"]);
        assert!(s.matches("quanten"));
        assert!(s.matches("mechanik"));
        assert!(!s.matches("quantenmechanik"));
        assert_eq!(s.chunks(), ["quanten", "mechanik"]);
    }

    #[test]
    fn empty_query_matches_all() {
        assert!(index().filter("").iter().all(|r| r.matched));
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_query("  QuanTEN \n"), "quanten");
        assert_eq!(normalize_query("   "), "");
    }
}
