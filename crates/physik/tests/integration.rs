//! Integration tests: search pipeline over content trees, pendulum decay.

use approx::assert_relative_eq;
use physik::{
    ContentNode, ManualTimers, Pendulum, PendulumConfig, SearchController, SearchView, Section,
    SectionIndex,
};

/// A page of sections backed by content trees.
struct TreePage {
    sections: Vec<ContentNode>,
    visible: Vec<bool>,
    no_results: bool,
    url_query: Option<String>,
}

impl TreePage {
    fn new(sections: Vec<ContentNode>) -> Self {
        let n = sections.len();
        Self {
            sections,
            visible: vec![true; n],
            no_results: false,
            url_query: None,
        }
    }

    fn index(&self) -> SectionIndex {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, s)| Section::from_chunks(format!("s{i}"), s.text_chunks()))
            .collect()
    }

    fn highlight_total(&self) -> usize {
        self.sections.iter().map(|s| s.highlight_count()).sum()
    }
}

impl SearchView for TreePage {
    fn set_section_visible(&mut self, index: usize, visible: bool) {
        self.visible[index] = visible;
    }
    fn apply_highlights(&mut self, index: usize, query: &str) {
        self.sections[index].apply_highlights(query);
    }
    fn clear_highlights(&mut self, index: usize) {
        self.sections[index].clear_highlights();
    }
    fn show_no_results(&mut self) {
        self.no_results = true;
    }
    fn hide_no_results(&mut self) {
        self.no_results = false;
    }
    fn replace_query_param(&mut self, query: Option<&str>) {
        self.url_query = query.map(str::to_string);
    }
}

fn physics_page() -> Vec<ContentNode> {
    vec![
        ContentNode::element(
            "section",
            vec![
                ContentNode::element("h2", vec![ContentNode::text("Mechanik")]),
                ContentNode::element(
                    "p",
                    vec![ContentNode::text("Newton, Kräfte und harmonische Schwingungen.")],
                ),
            ],
        ),
        ContentNode::element(
            "section",
            vec![
                ContentNode::element("h2", vec![ContentNode::text("Quantenphysik")]),
                ContentNode::element(
                    "p",
                    vec![
                        ContentNode::text("Die "),
                        ContentNode::element("strong", vec![ContentNode::text("Quanten")]),
                        ContentNode::text("mechanik erklärt Quantensprünge."),
                    ],
                ),
                ContentNode::element("script", vec![ContentNode::text("let quanten = [];")]),
            ],
        ),
        ContentNode::element(
            "section",
            vec![
                ContentNode::element("h2", vec![ContentNode::text("Optik")]),
                ContentNode::element("p", vec![ContentNode::text("Licht als Welle und QUANTEN.")]),
            ],
        ),
    ]
}

#[test]
fn quanten_typed_then_cleared() {
    let original = physics_page();
    let mut page = TreePage::new(original.clone());
    let mut search = SearchController::new(page.index(), 300);
    let mut timers = ManualTimers::new();

    for (t, value) in [(0, "q"), (80, "quan"), (160, "quanten")] {
        timers.advance_to(t);
        search.on_input(value, &mut timers);
    }
    let fired = timers.advance_to(1_000);
    assert_eq!(fired.len(), 1);
    let eval = search.on_timer(fired[0].1, &mut page).unwrap();

    assert_eq!(eval.matched, 2);
    assert_eq!(page.visible, vec![false, true, true]);
    // h2 + strong + "Quantensprünge" in section 1, "QUANTEN" in section 2.
    assert_eq!(page.sections[1].highlight_count(), 3);
    assert_eq!(page.sections[2].highlight_count(), 1);
    assert_eq!(page.sections[0].highlight_count(), 0);
    assert_eq!(page.url_query.as_deref(), Some("quanten"));
    assert!(!page.no_results);

    search.on_input("", &mut timers);
    let fired = timers.advance_to(2_000);
    search.on_timer(fired[0].1, &mut page).unwrap();

    assert!(page.visible.iter().all(|v| *v));
    assert_eq!(page.highlight_total(), 0);
    assert_eq!(page.url_query, None);
    assert_eq!(page.sections, original);
}

#[test]
fn highlight_clear_restores_text_for_many_queries() {
    for query in ["e", "quanten", "welle und", "mechanik", "ä", "."] {
        let original = physics_page();
        let mut sections = original.clone();
        for s in &mut sections {
            let before = s.text_content();
            s.apply_highlights(query);
            assert_eq!(s.text_content(), before, "apply changed text for {query:?}");
            s.clear_highlights();
            assert_eq!(s.text_content(), before, "clear changed text for {query:?}");
        }
        assert_eq!(sections, original, "structure not restored for {query:?}");
    }
}

#[test]
fn unmatched_query_shows_indicator_and_hides_all() {
    let mut page = TreePage::new(physics_page());
    let mut search = SearchController::new(page.index(), 300);
    search.evaluate("thermodynamik", &mut page);
    assert!(page.no_results);
    assert!(page.visible.iter().all(|v| !*v));
    assert_eq!(page.highlight_total(), 0);

    search.evaluate("optik", &mut page);
    assert!(!page.no_results);
    assert_eq!(page.visible, vec![false, false, true]);
}

#[test]
fn new_query_replaces_old_highlights() {
    let mut page = TreePage::new(physics_page());
    let mut search = SearchController::new(page.index(), 300);
    search.evaluate("quanten", &mut page);
    search.evaluate("licht", &mut page);
    assert_eq!(page.sections[1].highlight_count(), 0);
    assert_eq!(page.sections[2].highlight_count(), 1);
}

#[test]
fn pendulum_velocity_decays() {
    let mut p = Pendulum::default();
    p.toggle();

    let mut early_peak: f64 = 0.0;
    for _ in 0..200 {
        p.step();
        early_peak = early_peak.max(p.state().angular_velocity.abs());
    }
    for _ in 200..9_800 {
        p.step();
    }
    let mut late_peak: f64 = 0.0;
    for _ in 9_800..10_000 {
        p.step();
        late_peak = late_peak.max(p.state().angular_velocity.abs());
    }

    assert!(early_peak > 0.0);
    assert!(
        late_peak * 10.0 < early_peak,
        "velocity did not decay: early {early_peak}, late {late_peak}"
    );
}

#[test]
fn damping_alone_never_grows_velocity() {
    let cfg = PendulumConfig {
        gravity: 0.0,
        initial_velocity: 0.05,
        ..Default::default()
    };
    let mut p = Pendulum::new(&cfg);
    p.toggle();

    let mut prev = p.state().angular_velocity.abs();
    assert!(prev > 0.0);
    for frame in 0..2_000 {
        p.step();
        let v = p.state().angular_velocity.abs();
        assert!(v <= prev, "velocity grew at frame {frame}: {prev} -> {v}");
        prev = v;
    }
    assert_relative_eq!(prev, 0.05 * 0.999f64.powi(2_000), max_relative = 1e-9);
}

#[test]
fn script_only_match_leaves_section_hidden() {
    let sections = vec![
        ContentNode::element(
            "section",
            vec![
                ContentNode::element("p", vec![ContentNode::text("Mechanik")]),
                ContentNode::element("script", vec![ContentNode::text("let quanten = 1;")]),
            ],
        ),
        ContentNode::element(
            "section",
            vec![ContentNode::element("p", vec![ContentNode::text("Quanten und Licht")])],
        ),
    ];
    let mut page = TreePage::new(sections);
    let mut search = SearchController::new(page.index(), 300);

    let eval = search.evaluate("quanten", &mut page);
    assert_eq!(eval.matched, 1);
    assert_eq!(page.visible, vec![false, true]);
    assert_eq!(page.sections[0].highlight_count(), 0);
    assert_eq!(page.sections[1].highlight_count(), 1);
}

#[test]
fn match_across_text_nodes_is_not_a_hit() {
    let sections = vec![ContentNode::element(
        "p",
        vec![
            ContentNode::element("strong", vec![ContentNode::text("Quanten")]),
            ContentNode::text("mechanik"),
        ],
    )];
    let mut page = TreePage::new(sections);
    let mut search = SearchController::new(page.index(), 300);

    let eval = search.evaluate("quantenmechanik", &mut page);
    assert_eq!(eval.matched, 0);
    assert!(page.no_results);
    assert_eq!(page.visible, vec![false]);

    search.evaluate("quanten", &mut page);
    assert_eq!(page.visible, vec![true]);
    assert_eq!(page.highlight_total(), 1);
}

/// Every visible section with a non-empty query carries at least one
/// highlight, and hidden sections carry none.
#[test]
fn visible_iff_highlighted() {
    for query in ["quanten", "welle", "licht", "newton", "optik", "ä", "zzz"] {
        let mut page = TreePage::new(physics_page());
        let mut search = SearchController::new(page.index(), 300);
        search.evaluate(query, &mut page);
        for (i, s) in page.sections.iter().enumerate() {
            assert_eq!(
                page.visible[i],
                s.highlight_count() > 0,
                "section {i} for {query:?}"
            );
        }
    }
}
