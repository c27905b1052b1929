//! Section search bound to the page: `#searchInput`, `.topic-section`
//! and the "no results" panel.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use physik::anim;
use physik::highlight::{is_skipped_tag, Matcher, Segment, MARK_CLASS, MARK_TAG, WRAPPER_CLASS};
use physik::search::ShowAction;
use physik::{
    NoResultsIndicator, SearchController, SearchView, Section, SectionIndex, SiteConfig, TimerId,
    Timers,
};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, HtmlInputElement, Node};

use crate::dom;
use crate::gsap::Gsap;

/// Every topic section on the page. Search, navigation and scroll effects
/// all walk the same list.
pub const SECTION_SELECTOR: &str = ".topic-section";
const NO_RESULTS_ID: &str = "noResults";
const NO_RESULTS_HTML: &str = r#"
    <div class="no-results-content">
        <i class="fas fa-search"></i>
        <h3>Keine Ergebnisse gefunden</h3>
        <p>Versuche andere Suchbegriffe wie "Schwingung", "Welle", "Quanten"</p>
        <button onclick="resetSearch(); document.getElementById('searchInput').value = ''">
            Suche zurücksetzen
        </button>
    </div>
"#;

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;

pub struct Search {
    controller: RefCell<SearchController>,
    view: RefCell<DomSearchView>,
    timers: RefCell<WebTimers>,
    input: Option<HtmlInputElement>,
}

impl Search {
    /// Index the page's sections and hook up the search box.
    pub fn install(cfg: &SiteConfig, gsap: Rc<Gsap>) -> Rc<Self> {
        let sections = dom::query_all(SECTION_SELECTOR);
        let index: SectionIndex = sections
            .iter()
            .map(|el| {
                if el.id().is_empty() {
                    log::debug!("search: {SECTION_SELECTOR} without id, no deep link");
                }
                let texts = visible_text_nodes(el).unwrap_or_else(|e| {
                    log::warn!("search: reading section text failed: {e:?}");
                    Vec::new()
                });
                Section::from_chunks(el.id(), texts.iter().map(|(_, t)| t))
            })
            .collect();
        log::info!("search: indexed {} sections", index.len());

        let view = DomSearchView {
            sections,
            indicator: Rc::new(RefCell::new(NoResultsIndicator::new())),
            gsap,
            param: cfg.search_param.clone(),
        };
        let input = dom::by_id::<HtmlInputElement>("searchInput");

        let search = Rc::new_cyclic(|weak: &Weak<Search>| Search {
            controller: RefCell::new(SearchController::new(index, cfg.debounce_ms)),
            view: RefCell::new(view),
            timers: RefCell::new(WebTimers {
                search: weak.clone(),
            }),
            input,
        });

        match &search.input {
            Some(input) => {
                let s = search.clone();
                let el = input.clone();
                dom::listen(input, "input", move |_: web_sys::Event| s.on_input(&el.value()));
            }
            None => log::debug!("search: #searchInput missing, input not wired"),
        }

        if let Some(q) = dom::query_param(&cfg.search_param).filter(|q| !q.trim().is_empty()) {
            if let Some(input) = &search.input {
                input.set_value(&q);
            }
            search.evaluate_now(&q);
        }
        search
    }

    pub fn input(&self) -> Option<&HtmlInputElement> {
        self.input.as_ref()
    }

    pub fn on_input(&self, raw: &str) {
        let armed = {
            let mut timers = self.timers.borrow_mut();
            self.controller.borrow_mut().on_input(raw, &mut *timers)
        };
        if !armed {
            self.evaluate_now(raw);
        }
    }

    pub fn evaluate_now(&self, raw: &str) {
        let mut view = self.view.borrow_mut();
        let eval = self.controller.borrow_mut().evaluate(raw, &mut *view);
        log::info!("search: {:?}, {}/{} sections", eval.query, eval.matched, eval.total);
    }

    /// Show every section again and drop highlights and the URL parameter.
    pub fn reset(&self) {
        let mut timers = self.timers.borrow_mut();
        let mut view = self.view.borrow_mut();
        self.controller.borrow_mut().reset(&mut *timers, &mut *view);
    }

    fn fire(&self, token: u64) {
        let mut view = self.view.borrow_mut();
        self.controller.borrow_mut().on_timer(token, &mut *view);
    }
}

struct WebTimers {
    search: Weak<Search>,
}

impl Timers for WebTimers {
    fn set_timeout(&mut self, delay_ms: u32, token: u64) -> Option<TimerId> {
        let search = self.search.clone();
        let id = dom::set_timeout(delay_ms, move || {
            if let Some(s) = search.upgrade() {
                s.fire(token);
            }
        });
        if id.is_none() {
            log::warn!("search: setTimeout refused");
        }
        id
    }

    fn clear_timeout(&mut self, id: TimerId) {
        dom::clear_timeout(id);
    }
}

struct DomSearchView {
    sections: Vec<Element>,
    indicator: Rc<RefCell<NoResultsIndicator>>,
    gsap: Rc<Gsap>,
    param: String,
}

impl SearchView for DomSearchView {
    fn set_section_visible(&mut self, index: usize, visible: bool) {
        if let Some(el) = self.sections.get(index) {
            dom::set_style(el, "display", if visible { "block" } else { "none" });
        }
    }

    fn apply_highlights(&mut self, index: usize, query: &str) {
        let (Some(el), Some(matcher)) = (self.sections.get(index), Matcher::new(query)) else {
            return;
        };
        clear_element(el);
        if let Err(e) = highlight_element(el, &matcher) {
            log::warn!("search: highlighting #{} failed: {e:?}", el.id());
        }
    }

    fn clear_highlights(&mut self, index: usize) {
        if let Some(el) = self.sections.get(index) {
            clear_element(el);
        }
    }

    fn show_no_results(&mut self) {
        let action = self.indicator.borrow_mut().show();
        let existing = dom::by_id::<Element>(NO_RESULTS_ID);
        let el = match (action, existing) {
            (ShowAction::Keep, Some(_)) => return,
            (_, Some(el)) => el,
            (_, None) => match create_no_results() {
                Some(el) => el,
                None => return,
            },
        };
        // Overwrite stops a running exit tween on the same element.
        let tween = anim::no_results_in().to("overwrite", true);
        self.gsap.animate_el(&el, &tween, None);
    }

    fn hide_no_results(&mut self) {
        let generation = self.indicator.borrow_mut().hide();
        let (Some(generation), Some(el)) = (generation, dom::by_id::<Element>(NO_RESULTS_ID))
        else {
            return;
        };
        let indicator = self.indicator.clone();
        let target = el.clone();
        self.gsap.animate_el(
            &el,
            &anim::no_results_out(),
            Some(Box::new(move || {
                if indicator.borrow_mut().exit_complete(generation) {
                    target.remove();
                }
            })),
        );
    }

    fn replace_query_param(&mut self, query: Option<&str>) {
        dom::replace_query_param(&self.param, query);
    }
}

fn create_no_results() -> Option<Element> {
    let Some(container) = dom::query(".main-content") else {
        log::debug!("search: .main-content missing, no indicator");
        return None;
    };
    let el = dom::document().create_element("div").ok()?;
    el.set_id(NO_RESULTS_ID);
    el.set_class_name("no-results glass-panel");
    el.set_inner_html(NO_RESULTS_HTML);
    container.append_child(&el).ok()?;
    Some(el)
}

fn in_skipped(node: &Node, root: &Element) -> bool {
    let mut cur = node.parent_element();
    while let Some(el) = cur {
        if is_skipped_tag(&el.tag_name()) {
            return true;
        }
        if el.is_same_node(Some(root)) {
            break;
        }
        cur = el.parent_element();
    }
    false
}

/// Text nodes under `root` outside `<script>`/`<style>`, in document order.
/// Indexing and highlighting both read this list, so a section is matched
/// exactly when it has something to highlight.
fn visible_text_nodes(root: &Element) -> Result<Vec<(Node, String)>, JsValue> {
    let walker = dom::document().create_tree_walker_with_what_to_show(root, SHOW_TEXT)?;
    let mut out = Vec::new();
    while let Some(node) = walker.next_node()? {
        if !in_skipped(&node, root) {
            let text = node.text_content().unwrap_or_default();
            out.push((node, text));
        }
    }
    Ok(out)
}

/// Wrap every match under `root` in `<mark>`. Text nodes are rebuilt from
/// segments, so page text is never reparsed as markup.
fn highlight_element(root: &Element, matcher: &Matcher) -> Result<usize, JsValue> {
    let doc = dom::document();
    let hits: Vec<_> = visible_text_nodes(root)?
        .into_iter()
        .filter(|(_, text)| matcher.is_match(text))
        .collect();
    for (node, text) in &hits {
        wrap_text(&doc, node, text, matcher)?;
    }
    Ok(hits.len())
}

fn wrap_text(doc: &Document, node: &Node, text: &str, matcher: &Matcher) -> Result<(), JsValue> {
    let Some(parent) = node.parent_node() else {
        return Ok(());
    };
    let wrapper = doc.create_element("span")?;
    wrapper.set_class_name(WRAPPER_CLASS);
    for seg in matcher.segments(text) {
        match seg {
            Segment::Literal(s) => {
                wrapper.append_child(&doc.create_text_node(s))?;
            }
            Segment::Match(s) => {
                let mark = doc.create_element(MARK_TAG)?;
                mark.set_class_name(MARK_CLASS);
                mark.set_text_content(Some(s));
                wrapper.append_child(&mark)?;
            }
        }
    }
    parent.replace_child(&wrapper, node)?;
    Ok(())
}

/// Undo [`highlight_element`]: marks become text, wrappers are unwrapped and
/// adjacent text nodes merged.
fn clear_element(root: &Element) {
    let doc = dom::document();
    for mark in dom::query_all_in(root, &format!("{MARK_TAG}.{MARK_CLASS}")) {
        if let Some(parent) = mark.parent_node() {
            let text = doc.create_text_node(&mark.text_content().unwrap_or_default());
            parent.replace_child(&text, &mark).ok();
        }
    }
    for wrapper in dom::query_all_in(root, &format!("span.{WRAPPER_CLASS}")) {
        let Some(parent) = wrapper.parent_node() else {
            continue;
        };
        while let Some(child) = wrapper.first_child() {
            parent.insert_before(&child, Some(&wrapper)).ok();
        }
        parent.remove_child(&wrapper).ok();
        parent.normalize();
    }
}

