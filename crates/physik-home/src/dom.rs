use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement, Window};

pub fn window() -> Window {
    web_sys::window().expect("no global window")
}

pub fn document() -> Document {
    window().document().expect("no document")
}

/// Element by id, if present and of type `T`.
pub fn by_id<T: JsCast>(id: &str) -> Option<T> {
    document().get_element_by_id(id)?.dyn_into::<T>().ok()
}

pub fn get_el(id: &str) -> Option<HtmlElement> {
    by_id(id)
}

pub fn query(selector: &str) -> Option<Element> {
    document().query_selector(selector).ok().flatten()
}

pub fn query_in(parent: &Element, selector: &str) -> Option<Element> {
    parent.query_selector(selector).ok().flatten()
}

pub fn query_all(selector: &str) -> Vec<Element> {
    match document().query_selector_all(selector) {
        Ok(list) => node_list(&list),
        Err(_) => Vec::new(),
    }
}

pub fn query_all_in(parent: &Element, selector: &str) -> Vec<Element> {
    match parent.query_selector_all(selector) {
        Ok(list) => node_list(&list),
        Err(_) => Vec::new(),
    }
}

fn node_list(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

pub fn set_text(id: &str, text: &str) {
    if let Some(el) = document().get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn set_class_flag(el: &Element, class: &str, on: bool) {
    el.class_list().toggle_with_force(class, on).ok();
}

pub fn has_class(el: &Element, class: &str) -> bool {
    el.class_list().contains(class)
}

pub fn set_style(el: &Element, prop: &str, value: &str) {
    if let Some(el) = el.dyn_ref::<HtmlElement>() {
        el.style().set_property(prop, value).ok();
    }
}

pub fn style_value(el: &Element, prop: &str) -> String {
    el.dyn_ref::<HtmlElement>()
        .and_then(|el| el.style().get_property_value(prop).ok())
        .unwrap_or_default()
}

/// Attach a listener for the lifetime of the page.
pub fn listen<E, F>(target: &EventTarget, event: &str, f: F)
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let mut f = f;
    let cb = Closure::wrap(Box::new(move |e: web_sys::Event| {
        if let Ok(e) = e.dyn_into::<E>() {
            f(e);
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    target
        .add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
        .ok();
    cb.forget();
}

/// Run `f` once after `ms` milliseconds. Returns the handle for
/// [`clear_timeout`], or `None` if the browser refused.
pub fn set_timeout(ms: u32, f: impl FnOnce() + 'static) -> Option<i32> {
    let cb = Closure::once(f);
    let id = window()
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            ms as i32,
        )
        .ok()?;
    cb.forget();
    Some(id)
}

pub fn clear_timeout(id: i32) {
    window().clear_timeout_with_handle(id);
}

pub fn request_animation_frame(f: &Closure<dyn FnMut()>) {
    if let Err(e) = window().request_animation_frame(f.as_ref().unchecked_ref()) {
        log::error!("requestAnimationFrame failed: {e:?}");
    }
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Absolute document offset of an element's top edge.
pub fn page_top(el: &Element) -> f64 {
    el.get_bounding_client_rect().top() + window().scroll_y().unwrap_or(0.0)
}

pub fn smooth_scroll_to(top: f64) {
    let opts = web_sys::ScrollToOptions::new();
    opts.set_top(top);
    opts.set_behavior(web_sys::ScrollBehavior::Smooth);
    window().scroll_to_with_scroll_to_options(&opts);
}

/// Current value of a query parameter.
pub fn query_param(name: &str) -> Option<String> {
    let href = window().location().href().ok()?;
    let url = web_sys::Url::new(&href).ok()?;
    url.search_params().get(name)
}

/// Set or remove a query parameter in place, without navigation or a new
/// history entry.
pub fn replace_query_param(name: &str, value: Option<&str>) {
    let Ok(href) = window().location().href() else {
        return;
    };
    let Ok(url) = web_sys::Url::new(&href) else {
        return;
    };
    match value {
        Some(v) => url.search_params().set(name, v),
        None => url.search_params().delete(name),
    }
    if let Ok(history) = window().history() {
        if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(&url.href())) {
            log::warn!("replaceState failed: {e:?}");
        }
    }
}
