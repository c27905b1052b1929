//! GSAP / ScrollTrigger bridge.
//!
//! When the page doesn't load GSAP, transitions jump to their end state and
//! scroll triggers fall back to a plain scroll listener.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Array, Reflect, JSON};
use physik::anim::{Animator, ScrollCallbacks, ScrollSpec, Tween};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use crate::dom;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = gsap, js_name = to, catch)]
    fn gsap_to(target: &JsValue, vars: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = gsap, js_name = fromTo, catch)]
    fn gsap_from_to(target: &JsValue, from: &JsValue, to: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = gsap, js_name = registerPlugin, catch)]
    fn gsap_register_plugin(plugin: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = ScrollTrigger, js_name = create, catch)]
    fn scroll_trigger_create(vars: &JsValue) -> Result<JsValue, JsValue>;
}

pub struct Gsap {
    available: bool,
}

impl Gsap {
    pub fn detect() -> Self {
        let global = js_sys::global();
        let lookup = |name: &str| {
            Reflect::get(&global, &JsValue::from_str(name))
                .ok()
                .filter(|v| !v.is_undefined() && !v.is_null())
        };
        let available = match (lookup("gsap"), lookup("ScrollTrigger")) {
            (Some(_), Some(st)) => gsap_register_plugin(&st).is_ok(),
            _ => false,
        };
        if !available {
            log::info!("gsap not found, transitions apply instantly");
        }
        Gsap { available }
    }

    /// Animate every element matching `selector`.
    pub fn animate_all(&self, selector: &str, tween: &Tween) {
        self.animate(&JsValue::from_str(selector), tween, None);
    }

    pub fn animate_el(&self, el: &Element, tween: &Tween, on_complete: Option<Box<dyn FnOnce()>>) {
        self.animate(el.as_ref(), tween, on_complete);
    }
}

fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> Option<JsValue> {
    let json = serde_json::to_string(value).ok()?;
    JSON::parse(&json).ok()
}

fn set(obj: &JsValue, key: &str, value: &JsValue) {
    Reflect::set(obj, &JsValue::from_str(key), value).ok();
}

/// Resolve a target (selector, element or array of elements).
fn elements_of(target: &JsValue) -> Vec<Element> {
    if let Some(selector) = target.as_string() {
        return dom::query_all(&selector);
    }
    if let Some(el) = target.dyn_ref::<Element>() {
        return vec![el.clone()];
    }
    if Array::is_array(target) {
        return Array::from(target)
            .iter()
            .filter_map(|v| v.dyn_into::<Element>().ok())
            .collect();
    }
    Vec::new()
}

fn apply_end_state(target: &JsValue, tween: &Tween) {
    let styles = tween.end_styles();
    for el in elements_of(target) {
        for (prop, value) in &styles {
            dom::set_style(&el, prop, value);
        }
    }
}

/// Tween vars with `from` split out, ready for `gsap.to` / `gsap.fromTo`.
fn tween_vars(tween: &Tween) -> Option<(Option<JsValue>, JsValue)> {
    let to = to_js(tween)?;
    let from = match &tween.from {
        Some(f) => Some(to_js(f)?),
        None => None,
    };
    Some((from, to))
}

fn start(target: &JsValue, from: Option<&JsValue>, to: &JsValue) -> Result<JsValue, JsValue> {
    match from {
        Some(from) => gsap_from_to(target, from, to),
        None => gsap_to(target, to),
    }
}

impl Animator for Gsap {
    type Target = JsValue;

    fn animate(&self, target: &JsValue, tween: &Tween, on_complete: Option<Box<dyn FnOnce()>>) {
        let vars = if self.available { tween_vars(tween) } else { None };
        let Some((from, to)) = vars else {
            apply_end_state(target, tween);
            if let Some(done) = on_complete {
                done();
            }
            return;
        };

        let done = Rc::new(RefCell::new(on_complete));
        if done.borrow().is_some() {
            let slot = done.clone();
            let cb = Closure::once(move || {
                if let Some(f) = slot.borrow_mut().take() {
                    f();
                }
            });
            set(&to, "onComplete", cb.as_ref());
            cb.forget();
        }

        if let Err(e) = start(target, from.as_ref(), &to) {
            log::warn!("gsap tween failed: {e:?}");
            apply_end_state(target, tween);
            let pending = done.borrow_mut().take();
            if let Some(f) = pending {
                f();
            }
        }
    }

    fn animate_on_scroll(&self, target: &JsValue, trigger: &JsValue, tween: &Tween, spec: &ScrollSpec) {
        let vars = if self.available {
            tween_vars(tween).zip(to_js(spec))
        } else {
            None
        };
        let Some(((from, to), st)) = vars else {
            apply_end_state(target, tween);
            if let Some(class) = spec.toggle_class {
                for el in elements_of(target) {
                    dom::set_class_flag(&el, class, true);
                }
            }
            return;
        };
        set(&st, "trigger", trigger);
        set(&to, "scrollTrigger", &st);
        if let Err(e) = start(target, from.as_ref(), &to) {
            log::warn!("gsap scroll tween failed: {e:?}");
            apply_end_state(target, tween);
        }
    }

    fn on_scroll(&self, trigger: &JsValue, spec: &ScrollSpec, callbacks: ScrollCallbacks) {
        if self.available {
            if let Some(vars) = to_js(spec) {
                set(&vars, "trigger", trigger);
                register_callbacks(&vars, callbacks);
                if let Err(e) = scroll_trigger_create(&vars) {
                    log::warn!("ScrollTrigger.create failed: {e:?}");
                }
                return;
            }
        }
        let Some(el) = elements_of(trigger).into_iter().next() else {
            log::debug!("scroll trigger target missing");
            return;
        };
        fallback_scroll(el, callbacks);
    }
}

fn register_callbacks(vars: &JsValue, callbacks: ScrollCallbacks) {
    let ScrollCallbacks {
        on_enter,
        on_leave,
        on_update,
    } = callbacks;
    if let Some(mut f) = on_enter {
        let cb = Closure::wrap(Box::new(move || f()) as Box<dyn FnMut()>);
        set(vars, "onEnter", cb.as_ref());
        cb.forget();
    }
    if let Some(mut f) = on_leave {
        let cb = Closure::wrap(Box::new(move || f()) as Box<dyn FnMut()>);
        set(vars, "onLeave", cb.as_ref());
        cb.forget();
    }
    if let Some(mut f) = on_update {
        let cb = Closure::wrap(Box::new(move |st: JsValue| {
            let progress = Reflect::get(&st, &JsValue::from_str("progress"))
                .ok()
                .and_then(|p| p.as_f64())
                .unwrap_or(0.0);
            f(progress);
        }) as Box<dyn FnMut(JsValue)>);
        set(vars, "onUpdate", cb.as_ref());
        cb.forget();
    }
}

/// Enter/leave/progress from the element's position in the viewport.
fn fallback_scroll(el: Element, callbacks: ScrollCallbacks) {
    let ScrollCallbacks {
        mut on_enter,
        mut on_leave,
        mut on_update,
    } = callbacks;
    let inside = Cell::new(false);
    let mut check = move || {
        let vh = dom::window()
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        let rect = el.get_bounding_client_rect();
        let now_inside = rect.top() < vh * 0.8 && rect.bottom() > 0.0;
        if now_inside && !inside.get() {
            if let Some(f) = on_enter.as_mut() {
                f();
            }
        } else if !now_inside && inside.get() {
            if let Some(f) = on_leave.as_mut() {
                f();
            }
        }
        inside.set(now_inside);
        if let Some(f) = on_update.as_mut() {
            let span = vh + rect.height();
            let progress = if span > 0.0 {
                ((vh - rect.top()) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            f(progress);
        }
    };
    check();
    dom::listen(&dom::window(), "scroll", move |_: web_sys::Event| check());
}
