//! Damped simple pendulum, advanced one fixed step per animation frame.
//!
//! Units are per frame: velocity is radians/frame and there is no wall-clock
//! delta, so the swing speed follows the display refresh rate.

use crate::config::PendulumConfig;
use crate::error::{parse_param, ParamError};

/// Angle multiplier applied to the amplitude control value.
pub const AMPLITUDE_TO_ANGLE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumState {
    /// Radians from vertical.
    pub angle: f64,
    /// Radians per frame.
    pub angular_velocity: f64,
    pub amplitude: f64,
    pub mass: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

impl RunState {
    /// Start/stop button markup for this state.
    pub fn button_html(self) -> &'static str {
        match self {
            RunState::Stopped => r#"<i class="fas fa-play"></i> Start"#,
            RunState::Running => r#"<i class="fas fa-pause"></i> Stop"#,
        }
    }
}

/// Geometry of one rendered frame, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    pub pivot: (f64, f64),
    pub bob: (f64, f64),
    pub bob_radius: f64,
}

#[derive(Debug, Clone)]
pub struct Pendulum {
    state: PendulumState,
    run: RunState,
    gravity: f64,
    length: f64,
    damping: f64,
    pivot_y: f64,
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new(&PendulumConfig::default())
    }
}

impl Pendulum {
    pub fn new(cfg: &PendulumConfig) -> Self {
        Self {
            state: PendulumState {
                angle: cfg.initial_angle,
                angular_velocity: cfg.initial_velocity,
                amplitude: cfg.initial_amplitude,
                mass: cfg.initial_mass,
            },
            run: RunState::Stopped,
            gravity: cfg.gravity,
            length: cfg.length,
            damping: cfg.damping,
            pivot_y: cfg.pivot_y,
        }
    }

    pub fn state(&self) -> &PendulumState {
        &self.state
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn is_running(&self) -> bool {
        self.run == RunState::Running
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Flip between stopped and running; returns the new state.
    pub fn toggle(&mut self) -> RunState {
        self.run = match self.run {
            RunState::Stopped => RunState::Running,
            RunState::Running => RunState::Stopped,
        };
        log::debug!("pendulum: {:?}", self.run);
        self.run
    }

    /// Advance one frame. Does nothing while stopped.
    pub fn step(&mut self) {
        if !self.is_running() {
            return;
        }
        self.integrate();
    }

    /// Semi-implicit Euler with multiplicative damping.
    fn integrate(&mut self) {
        let s = &mut self.state;
        let acc = -(self.gravity / self.length) * s.angle.sin();
        s.angular_velocity += acc;
        s.angle += s.angular_velocity;
        s.angular_velocity *= self.damping;
    }

    /// Amplitude control input. Resets the angle, leaves the velocity and run
    /// state alone. Bad input keeps the previous values.
    pub fn set_amplitude(&mut self, raw: &str) -> Result<f64, ParamError> {
        let amplitude = parse_param("amplitude", raw)?;
        self.state.amplitude = amplitude;
        self.state.angle = amplitude * AMPLITUDE_TO_ANGLE;
        Ok(amplitude)
    }

    /// Mass control input. Only the bob size changes.
    pub fn set_mass(&mut self, raw: &str) -> Result<f64, ParamError> {
        let mass = parse_param("mass", raw)?;
        self.state.mass = mass;
        Ok(mass)
    }

    pub fn bob_radius(&self) -> f64 {
        bob_radius(self.state.mass)
    }

    /// Frame geometry for a canvas `width` pixels wide.
    pub fn scene(&self, width: f64) -> Scene {
        let pivot = (width / 2.0, self.pivot_y);
        let (sin, cos) = self.state.angle.sin_cos();
        Scene {
            pivot,
            bob: (pivot.0 + self.length * sin, pivot.1 + self.length * cos),
            bob_radius: self.bob_radius(),
        }
    }
}

pub fn bob_radius(mass: f64) -> f64 {
    10.0 + mass * 10.0
}
