//! Property-transition descriptions handed to the page's animation library.
//!
//! The core only describes *what* should change; the front end decides how
//! (GSAP when present, an immediate style write otherwise).

use serde::Serialize;
use serde_json::{Map, Value};

/// A property transition: optional start values, end values and timing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tween {
    #[serde(skip)]
    pub from: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub to: Map<String, Value>,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ease: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stagger: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<i32>,
}

impl Tween {
    pub fn new(duration: f64) -> Self {
        Self {
            from: None,
            to: Map::new(),
            duration,
            delay: None,
            ease: None,
            stagger: None,
            repeat: None,
        }
    }

    pub fn to(mut self, prop: &str, value: impl Into<Value>) -> Self {
        self.to.insert(prop.to_string(), value.into());
        self
    }

    pub fn from(mut self, prop: &str, value: impl Into<Value>) -> Self {
        self.from
            .get_or_insert_with(Map::new)
            .insert(prop.to_string(), value.into());
        self
    }

    pub fn delay(mut self, secs: f64) -> Self {
        self.delay = Some(secs);
        self
    }

    pub fn ease(mut self, ease: &'static str) -> Self {
        self.ease = Some(ease);
        self
    }

    pub fn stagger(mut self, secs: f64) -> Self {
        self.stagger = Some(secs);
        self
    }

    pub fn repeat_forever(mut self) -> Self {
        self.repeat = Some(-1);
        self
    }

    /// End-state properties as `(name, css value)` pairs, for applying a
    /// transition instantly. Transform-style properties are skipped.
    pub fn end_styles(&self) -> Vec<(String, String)> {
        self.to
            .iter()
            .filter_map(|(k, v)| css_property(k, v))
            .collect()
    }
}

fn css_property(name: &str, value: &Value) -> Option<(String, String)> {
    let css_name = match name {
        "opacity" => "opacity",
        "width" => "width",
        "height" => "height",
        "visibility" => "visibility",
        "backgroundColor" => "background-color",
        "backdropFilter" => "backdrop-filter",
        _ => return None,
    };
    let css_value = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if name == "height" || name == "width" => format!("{n}px"),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some((css_name.to_string(), css_value))
}

/// Scroll-trigger registration parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle_class: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle_actions: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub scrub: bool,
}

/// Callbacks for a scroll trigger. `on_update` receives progress in `0..=1`.
#[derive(Default)]
pub struct ScrollCallbacks {
    pub on_enter: Option<Box<dyn FnMut()>>,
    pub on_leave: Option<Box<dyn FnMut()>>,
    pub on_update: Option<Box<dyn FnMut(f64)>>,
}

/// The animation library as seen by the page logic.
pub trait Animator {
    type Target: ?Sized;

    /// Schedule a transition; `on_complete` runs once it has been applied.
    fn animate(&self, target: &Self::Target, tween: &Tween, on_complete: Option<Box<dyn FnOnce()>>);

    /// Play `tween` when `trigger` scrolls into the range given by `spec`.
    fn animate_on_scroll(
        &self,
        target: &Self::Target,
        trigger: &Self::Target,
        tween: &Tween,
        spec: &ScrollSpec,
    );

    /// Register scroll callbacks for `trigger`.
    fn on_scroll(&self, trigger: &Self::Target, spec: &ScrollSpec, callbacks: ScrollCallbacks);
}

// Transitions used by the page.

pub fn menu_in() -> Tween {
    Tween::new(0.3).from("opacity", 0).from("y", -20).to("opacity", 1).to("y", 0)
}

pub fn menu_out() -> Tween {
    Tween::new(0.3).to("opacity", 0).to("y", -20)
}

/// Transforms for the three hamburger bars.
pub fn hamburger(open: bool) -> [Tween; 3] {
    if open {
        [
            Tween::new(0.3).to("rotation", 45).to("y", 6),
            Tween::new(0.3).to("opacity", 0),
            Tween::new(0.3).to("rotation", -45).to("y", -6),
        ]
    } else {
        [
            Tween::new(0.3).to("rotation", 0).to("y", 0),
            Tween::new(0.3).to("opacity", 1),
            Tween::new(0.3).to("rotation", 0).to("y", 0),
        ]
    }
}

pub fn fab_items_in() -> Tween {
    Tween::new(0.3)
        .from("opacity", 0)
        .from("x", 20)
        .to("opacity", 1)
        .to("x", 0)
        .stagger(0.1)
}

pub fn fab_items_out() -> Tween {
    Tween::new(0.2).to("opacity", 0).to("x", 20)
}

pub fn fab_icon(open: bool) -> Tween {
    Tween::new(0.3).to("rotation", if open { 45 } else { 0 })
}

pub fn nav_hover(over: bool) -> Tween {
    Tween::new(0.3)
        .to("scale", if over { 1.02 } else { 1.0 })
        .ease("power2.out")
}

pub fn solution_in() -> Tween {
    Tween::new(0.5)
        .from("opacity", 0)
        .from("height", 0)
        .to("opacity", 1)
        .to("height", "auto")
}

pub fn solution_out() -> Tween {
    Tween::new(0.3).to("opacity", 0).to("height", 0)
}

pub fn formula_card(opacity: f64, index: usize) -> Tween {
    Tween::new(0.3).to("opacity", opacity).delay(index as f64 * 0.1)
}

pub fn no_results_in() -> Tween {
    Tween::new(0.5).from("opacity", 0).from("y", 20).to("opacity", 1).to("y", 0)
}

pub fn no_results_out() -> Tween {
    Tween::new(0.3).to("opacity", 0).to("y", -20)
}

pub fn suggestions(show: bool) -> Tween {
    if show {
        Tween::new(0.3).to("opacity", 1).to("visibility", "visible").to("y", 0)
    } else {
        Tween::new(0.3).to("opacity", 0).to("visibility", "hidden").to("y", -10)
    }
}

pub fn quick_panel_in() -> Tween {
    Tween::new(0.5)
        .from("scale", 0.8)
        .from("opacity", 0)
        .to("scale", 1)
        .to("opacity", 1)
        .ease("back.out(1.7)")
}

pub fn section_reveal() -> (Tween, ScrollSpec) {
    (
        Tween::new(0.8).from("opacity", 0).from("y", 50).to("opacity", 1).to("y", 0),
        ScrollSpec {
            start: Some("top 80%"),
            end: Some("bottom 20%"),
            toggle_class: Some("visible"),
            ..Default::default()
        },
    )
}

pub fn navbar_solid() -> (Tween, ScrollSpec) {
    (
        Tween::new(0.5)
            .to("backgroundColor", "rgba(10, 10, 15, 0.95)")
            .to("backdropFilter", "blur(20px)"),
        ScrollSpec {
            start: Some("bottom center"),
            toggle_actions: Some("play none none reverse"),
            ..Default::default()
        },
    )
}

pub fn orb_spin() -> Tween {
    Tween::new(20.0).to("rotation", 360).ease("none").repeat_forever()
}

pub fn hero_parallax() -> (Tween, ScrollSpec) {
    (
        Tween::new(0.5).to("yPercent", -50),
        ScrollSpec {
            scrub: true,
            ..Default::default()
        },
    )
}

pub fn progress_width(percent: f64) -> Tween {
    Tween::new(0.1).to("width", format!("{percent:.2}%"))
}

pub fn body_theme_fade() -> Tween {
    Tween::new(0.5).ease("power2.inOut")
}
