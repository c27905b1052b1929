use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Function, Promise, Reflect};
use physik::anim::{self, Animator, ScrollCallbacks, ScrollSpec};
use physik::config::CONFIG_ELEMENT_ID;
use physik::confetti::{self, XorShift};
use physik::counter::Counter;
use physik::nav::{self, FabMenu, MenuState, Shortcut};
use physik::progress::reading_progress;
use physik::theme::BODY_CLASS;
use physik::widgets::{formula_icon, formula_opacity, SolutionPanel, SolutionToggle};
use physik::{SiteConfig, Theme};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, Event, KeyboardEvent};

use crate::dom;
use crate::gsap::Gsap;
use crate::logging;
use crate::search::{Search, SECTION_SELECTOR};
use crate::storage;
use crate::viz::Simulation;

pub async fn run() {
    let cfg = load_config();
    logging::set_level(cfg.log_level());

    let gsap = Rc::new(Gsap::detect());

    setup_theme(&cfg, &gsap);
    setup_menu(&gsap);
    setup_fab(&gsap);
    setup_nav_hover(&gsap);

    let search = Search::install(&cfg, gsap.clone());
    setup_suggestions(&search, &gsap);
    setup_shortcuts(search.clone());

    setup_solutions(&cfg, &gsap);
    setup_formulas(&gsap);
    setup_anchors();
    setup_progress(&gsap);
    setup_counters(&gsap);
    start_scroll_animations(&gsap);
    setup_active_nav(&gsap);

    let sim = Simulation::install(&cfg.pendulum);
    install_globals(search, sim, gsap);

    log::info!("physik: page ready");
    typeset_math().await;
}

fn load_config() -> SiteConfig {
    let Some(el) = dom::document().get_element_by_id(CONFIG_ELEMENT_ID) else {
        return SiteConfig::default();
    };
    let json = el.text_content().unwrap_or_default();
    match SiteConfig::from_json(&json) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("config: {e}, using defaults");
            SiteConfig::default()
        }
    }
}

// ── Theme ──────────────────────────────────────────────────────────────

fn apply_theme(theme: Theme) {
    if let Some(body) = dom::document().body() {
        dom::set_class_flag(&body, BODY_CLASS, theme.is_dark());
    }
    if let Some(meta) = dom::query(r#"meta[name="theme-color"]"#) {
        meta.set_attribute("content", theme.meta_color()).ok();
    }
    if let Some(icon) = dom::query("#themeToggle i") {
        icon.set_class_name(theme.toggle_icon());
    }
}

fn setup_theme(cfg: &SiteConfig, gsap: &Rc<Gsap>) {
    let theme = Rc::new(Cell::new(storage::load_theme(&cfg.theme_key)));
    apply_theme(theme.get());

    let Some(toggle) = dom::get_el("themeToggle") else {
        log::debug!("theme: no #themeToggle");
        return;
    };
    let key = cfg.theme_key.clone();
    let g = gsap.clone();
    dom::listen(&toggle, "click", move |_: Event| {
        let next = theme.get().toggled();
        theme.set(next);
        apply_theme(next);
        g.animate_all("body", &anim::body_theme_fade());
        storage::save_theme(&key, next);
    });
}

// ── Menus ──────────────────────────────────────────────────────────────

fn setup_menu(gsap: &Rc<Gsap>) {
    let Some(button) = dom::get_el("mobileMenu") else {
        log::debug!("nav: no #mobileMenu");
        return;
    };
    let state = Rc::new(Cell::new(MenuState::default()));
    let g = gsap.clone();
    dom::listen(&button, "click", move |_: Event| {
        let mut menu_state = state.get();
        let open = menu_state.toggle();
        state.set(menu_state);

        if let Some(menu) = dom::query(".nav-menu") {
            if open {
                dom::set_class_flag(&menu, "active", true);
                g.animate_el(&menu, &anim::menu_in(), None);
            } else {
                let target = menu.clone();
                let state = state.clone();
                g.animate_el(
                    &menu,
                    &anim::menu_out(),
                    Some(Box::new(move || {
                        if !state.get().is_open() {
                            dom::set_class_flag(&target, "active", false);
                        }
                    })),
                );
            }
        }

        let spans = dom::query_all("#mobileMenu span");
        for (span, tween) in spans.iter().zip(anim::hamburger(open).iter()) {
            g.animate_el(span, tween, None);
        }
    });
}

fn setup_fab(gsap: &Rc<Gsap>) {
    let (Some(main), Some(menu)) = (dom::get_el("fabMain"), dom::query(".fab-menu")) else {
        log::debug!("fab: no #fabMain / .fab-menu");
        return;
    };
    let fab = Rc::new(Cell::new(FabMenu::from_hidden(dom::has_class(&menu, "hidden"))));
    let g = gsap.clone();
    let icon = dom::query_in(&main, "i");
    dom::listen(&main, "click", move |_: Event| {
        let mut state = fab.get();
        let open = state.toggle();
        fab.set(state);

        if open {
            dom::set_class_flag(&menu, "hidden", false);
            g.animate_all(".fab-item", &anim::fab_items_in());
        } else {
            let fab = fab.clone();
            let menu = menu.clone();
            g.animate(
                &JsValue::from_str(".fab-item"),
                &anim::fab_items_out(),
                Some(Box::new(move || {
                    if !fab.get().is_open() {
                        dom::set_class_flag(&menu, "hidden", true);
                    }
                })),
            );
        }
        if let Some(icon) = &icon {
            g.animate_el(icon, &anim::fab_icon(open), None);
        }
    });
}

fn setup_nav_hover(gsap: &Rc<Gsap>) {
    for item in dom::query_all(".menu-item") {
        for (event, over) in [("mouseenter", true), ("mouseleave", false)] {
            let g = gsap.clone();
            let el = item.clone();
            dom::listen(&item, event, move |_: Event| {
                g.animate_el(&el, &anim::nav_hover(over), None);
            });
        }
    }
}

fn update_active_nav(active_id: Option<&str>) {
    for item in dom::query_all(".menu-item") {
        let href = item.get_attribute("href");
        dom::set_class_flag(&item, "active", nav::is_active_href(href.as_deref(), active_id));
    }
}

fn setup_active_nav(gsap: &Rc<Gsap>) {
    for section in dom::query_all(SECTION_SELECTOR) {
        let id = section.id();
        gsap.on_scroll(
            section.as_ref(),
            &ScrollSpec::default(),
            ScrollCallbacks {
                on_enter: Some(Box::new(move || {
                    update_active_nav(Some(id.as_str()).filter(|id| !id.is_empty()))
                })),
                on_leave: Some(Box::new(|| update_active_nav(None))),
                on_update: None,
            },
        );
    }
}

// ── Keyboard & scrolling ───────────────────────────────────────────────

fn setup_shortcuts(search: Rc<Search>) {
    dom::listen(&dom::document(), "keydown", move |e: KeyboardEvent| {
        let in_search = match (search.input(), dom::document().active_element()) {
            (Some(input), Some(active)) => active.is_same_node(Some(input)),
            _ => false,
        };
        let Some(shortcut) = Shortcut::from_key(&e.key(), e.ctrl_key(), e.meta_key(), in_search)
        else {
            return;
        };
        if shortcut.prevents_default() {
            e.prevent_default();
        }
        match shortcut {
            Shortcut::FocusSearch => {
                if let Some(input) = search.input() {
                    input.focus().ok();
                }
            }
            Shortcut::ResetSearch => {
                search.reset();
                if let Some(input) = search.input() {
                    input.blur().ok();
                }
            }
            Shortcut::NextSection => step_section(true),
            Shortcut::PrevSection => step_section(false),
        }
    });
}

/// Scroll to the next or previous section that isn't filtered out.
fn step_section(forward: bool) {
    let tops: Vec<f64> = dom::query_all(SECTION_SELECTOR)
        .iter()
        .filter(|s| dom::style_value(s, "display") != "none")
        .map(dom::page_top)
        .collect();
    let y = dom::window().scroll_y().unwrap_or(0.0);
    let next = if forward {
        nav::next_section(&tops, y)
    } else {
        nav::prev_section(&tops, y)
    };
    if let Some(i) = next {
        dom::smooth_scroll_to(nav::scroll_target(tops[i]));
    }
}

fn scroll_to_section(id: &str) {
    match dom::by_id::<Element>(id) {
        Some(el) => dom::smooth_scroll_to(nav::scroll_target(dom::page_top(&el))),
        None => log::debug!("nav: no section #{id}"),
    }
}

fn setup_anchors() {
    for anchor in dom::query_all(r##"a[href^="#"]"##) {
        let a = anchor.clone();
        dom::listen(&anchor, "click", move |e: Event| {
            e.prevent_default();
            let Some(href) = a.get_attribute("href") else {
                return;
            };
            if let Some(target) = dom::query(&href) {
                dom::smooth_scroll_to(nav::scroll_target(dom::page_top(&target)));
            }
        });
    }
}

// ── Search box extras ──────────────────────────────────────────────────

fn setup_suggestions(search: &Search, gsap: &Rc<Gsap>) {
    let Some(input) = search.input() else {
        return;
    };
    let g = gsap.clone();
    dom::listen(input, "focus", move |_: Event| {
        if let Some(s) = dom::query(".search-suggestions") {
            g.animate_el(&s, &anim::suggestions(true), None);
        }
    });
    let g = gsap.clone();
    dom::listen(input, "blur", move |_: Event| {
        let g = g.clone();
        dom::set_timeout(200, move || {
            if let Some(s) = dom::query(".search-suggestions") {
                g.animate_el(&s, &anim::suggestions(false), None);
            }
        });
    });
}

// ── Reading progress & counters ────────────────────────────────────────

fn setup_progress(gsap: &Rc<Gsap>) {
    let Some(bar) = dom::query(".progress-bar") else {
        return;
    };
    let g = gsap.clone();
    dom::listen(&dom::window(), "scroll", move |_: Event| {
        let Some(root) = dom::document().document_element() else {
            return;
        };
        let percent = reading_progress(
            root.scroll_top() as f64,
            root.scroll_height() as f64,
            root.client_height() as f64,
        );
        g.animate_el(&bar, &anim::progress_width(percent), None);
    });
}

fn setup_counters(gsap: &Rc<Gsap>) {
    let spec = ScrollSpec {
        start: Some("top 80%"),
        ..Default::default()
    };
    for el in dom::query_all(".counter") {
        let Some(counter) = el
            .get_attribute("data-target")
            .and_then(|t| Counter::from_attr(&t))
        else {
            log::debug!("counter: missing or non-numeric data-target");
            continue;
        };
        let counter = Rc::new(RefCell::new(counter));
        let target = el.clone();
        gsap.on_scroll(
            el.as_ref(),
            &spec,
            ScrollCallbacks {
                on_enter: Some(Box::new(move || run_counter(target.clone(), counter.clone()))),
                ..Default::default()
            },
        );
    }
}

fn run_counter(el: Element, counter: Rc<RefCell<Counter>>) {
    if counter.borrow().is_started() {
        return;
    }
    counter.borrow_mut().start(dom::now_ms());

    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let now = dom::now_ms();
        let done = {
            let c = counter.borrow();
            el.set_text_content(Some(&c.value_at(now).to_string()));
            c.is_done(now)
        };
        if done {
            let _ = f.borrow_mut().take();
            return;
        }
        if let Some(cb) = f.borrow().as_ref() {
            dom::request_animation_frame(cb);
        }
    }) as Box<dyn FnMut()>));

    if let Some(cb) = g.borrow().as_ref() {
        dom::request_animation_frame(cb);
    };
}

// ── Exercise widgets ───────────────────────────────────────────────────

fn setup_solutions(cfg: &SiteConfig, gsap: &Rc<Gsap>) {
    let count = cfg.confetti_count;
    let rng = Rc::new(RefCell::new(XorShift::new(dom::now_ms() as u64)));
    for button in dom::query_all(".solution-toggle") {
        let Some(solution) = button
            .parent_element()
            .and_then(|p| dom::query_in(&p, ".exercise-solution"))
        else {
            log::debug!("solution: toggle without .exercise-solution");
            continue;
        };
        let panel = Rc::new(Cell::new(SolutionPanel::from_hidden(dom::has_class(
            &solution, "hidden",
        ))));
        let g = gsap.clone();
        let rng = rng.clone();
        let btn = button.clone();
        dom::listen(&button, "click", move |_: Event| {
            let mut state = panel.get();
            let action = state.toggle();
            panel.set(state);

            match action {
                SolutionToggle::Reveal => {
                    dom::set_class_flag(&solution, "hidden", false);
                    g.animate_el(&solution, &anim::solution_in(), None);
                }
                SolutionToggle::Conceal => {
                    let panel = panel.clone();
                    let target = solution.clone();
                    g.animate_el(
                        &solution,
                        &anim::solution_out(),
                        Some(Box::new(move || {
                            if panel.get().is_hidden() {
                                dom::set_class_flag(&target, "hidden", true);
                            }
                        })),
                    );
                }
            }
            btn.set_inner_html(action.button_html());
            if action.celebrates() {
                burst_confetti(&btn, count, &mut rng.borrow_mut(), &g);
            }
        });
    }
}

fn burst_confetti(origin: &Element, count: usize, rng: &mut XorShift, gsap: &Gsap) {
    let Some(body) = dom::document().body() else {
        return;
    };
    let rect = origin.get_bounding_client_rect();
    let (left, top) = (rect.left() + rect.width() / 2.0, rect.top());
    for p in confetti::burst(count, rng) {
        let Ok(el) = dom::document().create_element("div") else {
            continue;
        };
        el.set_attribute("style", &confetti::particle_style(&p, left, top))
            .ok();
        if body.append_child(&el).is_err() {
            continue;
        }
        let target = el.clone();
        gsap.animate_el(&el, &confetti::flight(&p), Some(Box::new(move || target.remove())));
    }
}

fn setup_formulas(gsap: &Rc<Gsap>) {
    for button in dom::query_all(".formula-toggle") {
        let g = gsap.clone();
        let btn = button.clone();
        dom::listen(&button, "click", move |_: Event| {
            let Some(panel) = btn.closest(".formula-panel").ok().flatten() else {
                return;
            };
            for (i, card) in dom::query_all_in(&panel, ".formula-card").iter().enumerate() {
                let opacity = formula_opacity(&dom::style_value(card, "opacity"));
                g.animate_el(card, &anim::formula_card(opacity, i), None);
            }
            if let Some(icon) = dom::query_in(&btn, "i") {
                icon.set_class_name(formula_icon(&icon.class_name()));
            }
        });
    }
}

// ── Scroll-driven decoration ───────────────────────────────────────────

fn start_scroll_animations(gsap: &Gsap) {
    let hero = JsValue::from_str(".hero");

    let (tween, spec) = anim::navbar_solid();
    gsap.animate_on_scroll(&JsValue::from_str(".navbar"), &hero, &tween, &spec);

    for section in dom::query_all(SECTION_SELECTOR) {
        let (tween, spec) = anim::section_reveal();
        gsap.animate_on_scroll(section.as_ref(), section.as_ref(), &tween, &spec);
    }

    gsap.animate_all(".gradient-orb", &anim::orb_spin());

    let (tween, spec) = anim::hero_parallax();
    gsap.animate_on_scroll(&JsValue::from_str(".hero-bg"), &hero, &tween, &spec);
}

// ── Window globals for inline handlers ─────────────────────────────────

fn expose(name: &str, f: impl FnMut(JsValue) + 'static) {
    let cb = Closure::wrap(Box::new(f) as Box<dyn FnMut(JsValue)>);
    if let Err(e) = Reflect::set(&dom::window(), &JsValue::from_str(name), cb.as_ref()) {
        log::warn!("could not install window.{name}: {e:?}");
    }
    cb.forget();
}

fn install_globals(search: Rc<Search>, sim: Option<Rc<Simulation>>, gsap: Rc<Gsap>) {
    expose("resetSearch", move |_| search.reset());

    expose("toggleSimulation", move |_| match &sim {
        Some(sim) => {
            sim.toggle();
        }
        None => log::debug!("pendulum: not on this page"),
    });

    expose("scrollToSection", |id: JsValue| {
        if let Some(id) = id.as_string() {
            scroll_to_section(&id);
        }
    });

    expose("showQuickAccess", move |_| {
        if let Some(panel) = dom::get_el("quickAccess") {
            dom::set_class_flag(&panel, "hidden", false);
            gsap.animate_all(".quick-panel", &anim::quick_panel_in());
        }
    });

    let stubs = [
        ("openFormula", "formula collection"),
        ("openSimulation", "simulation"),
        ("openExercises", "exercises"),
        ("openGlossary", "glossary"),
        ("openNotes", "notes"),
        ("openCalculator", "calculator"),
        ("openBookmarks", "bookmarks"),
    ];
    for (name, what) in stubs {
        expose(name, move |arg: JsValue| match arg.as_string() {
            Some(kind) => log::info!("opening {what}: {kind}"),
            None => log::info!("opening {what}"),
        });
    }
}

/// Run `MathJax.typesetPromise()` when MathJax is on the page.
async fn typeset_math() {
    let Ok(mathjax) = Reflect::get(&js_sys::global(), &JsValue::from_str("MathJax")) else {
        return;
    };
    if mathjax.is_undefined() || mathjax.is_null() {
        return;
    }
    let Ok(typeset) = Reflect::get(&mathjax, &JsValue::from_str("typesetPromise"))
        .and_then(|f| f.dyn_into::<Function>())
    else {
        log::debug!("mathjax: no typesetPromise");
        return;
    };
    match typeset.call0(&mathjax).and_then(|p| p.dyn_into::<Promise>()) {
        Ok(promise) => {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("mathjax: typeset failed: {e:?}");
            }
        }
        Err(e) => log::warn!("mathjax: typeset failed: {e:?}"),
    }
}
