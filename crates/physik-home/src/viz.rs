use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use physik::{Pendulum, PendulumConfig, RunState};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlInputElement};

use crate::dom;

const STROKE: &str = "#00d4ff";

/// Canvas renderer for the pendulum.
pub struct PendulumView {
    ctx: CanvasRenderingContext2d,
    canvas: HtmlCanvasElement,
    pendulum: Pendulum,
}

impl PendulumView {
    pub fn new(canvas: HtmlCanvasElement, cfg: &PendulumConfig) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("{e:?}"))?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "not a 2d context")?;
        Ok(PendulumView {
            ctx,
            canvas,
            pendulum: Pendulum::new(cfg),
        })
    }

    pub fn render(&self) {
        let w = self.canvas.width() as f64;
        let h = self.canvas.height() as f64;
        let scene = self.pendulum.scene(w);
        let (px, py) = scene.pivot;
        let (bx, by) = scene.bob;

        self.ctx.clear_rect(0.0, 0.0, w, h);

        self.ctx.begin_path();
        self.ctx.move_to(px, py);
        self.ctx.line_to(bx, by);
        self.ctx.set_stroke_style_str(STROKE);
        self.ctx.set_line_width(2.0);
        self.ctx.stroke();

        self.ctx.begin_path();
        self.ctx
            .arc(bx, by, scene.bob_radius, 0.0, std::f64::consts::TAU)
            .ok();
        self.ctx.set_fill_style_str(STROKE);
        self.ctx.fill();
    }
}

/// The `#pendulumSim` widget: canvas, controls and the frame loop.
pub struct Simulation {
    view: RefCell<PendulumView>,
    frame: RefCell<Option<Closure<dyn FnMut()>>>,
    /// A frame callback is queued with the browser.
    scheduled: Cell<bool>,
}

impl Simulation {
    pub fn install(cfg: &PendulumConfig) -> Option<Rc<Self>> {
        let Some(canvas) = dom::by_id::<HtmlCanvasElement>("pendulumSim") else {
            log::debug!("pendulum: no #pendulumSim canvas");
            return None;
        };
        let view = match PendulumView::new(canvas, cfg) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("pendulum: {e}");
                return None;
            }
        };

        let sim = Rc::new_cyclic(|weak: &Weak<Simulation>| {
            let weak = weak.clone();
            let frame = Closure::wrap(Box::new(move || {
                if let Some(sim) = weak.upgrade() {
                    sim.tick();
                }
            }) as Box<dyn FnMut()>);
            Simulation {
                view: RefCell::new(view),
                frame: RefCell::new(Some(frame)),
                scheduled: Cell::new(false),
            }
        });
        sim.view.borrow().render();

        if let Some(input) = dom::by_id::<HtmlInputElement>("amplitude") {
            let s = sim.clone();
            let el = input.clone();
            dom::listen(&input, "input", move |_: web_sys::Event| {
                s.set_control(&el.value(), "ampValue", Pendulum::set_amplitude);
            });
        }
        if let Some(input) = dom::by_id::<HtmlInputElement>("mass") {
            let s = sim.clone();
            let el = input.clone();
            dom::listen(&input, "input", move |_: web_sys::Event| {
                s.set_control(&el.value(), "massValue", Pendulum::set_mass);
            });
        }
        Some(sim)
    }

    fn set_control(
        &self,
        raw: &str,
        readout: &str,
        apply: fn(&mut Pendulum, &str) -> Result<f64, physik::ParamError>,
    ) {
        let mut view = self.view.borrow_mut();
        match apply(&mut view.pendulum, raw) {
            Ok(v) => {
                dom::set_text(readout, &v.to_string());
                if !view.pendulum.is_running() {
                    view.render();
                }
            }
            Err(e) => log::warn!("pendulum: {e}"),
        }
    }

    /// Start or stop. Starting never queues a second frame loop.
    pub fn toggle(&self) -> RunState {
        let state = self.view.borrow_mut().pendulum.toggle();
        if let Some(button) = dom::query(".sim-play") {
            button.set_inner_html(state.button_html());
        }
        if state == RunState::Running && !self.scheduled.get() {
            self.tick();
        }
        state
    }

    fn tick(&self) {
        if !self.view.borrow().pendulum.is_running() {
            self.scheduled.set(false);
            return;
        }
        {
            let mut view = self.view.borrow_mut();
            view.pendulum.step();
            view.render();
        }
        self.scheduled.set(true);
        if let Some(frame) = self.frame.borrow().as_ref() {
            dom::request_animation_frame(frame);
        }
    }
}
