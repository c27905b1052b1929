//! Page-level configuration.
//!
//! Every field has a default, so a page without a config block (or with a
//! partial one) behaves like the stock site.

use serde::Deserialize;

use crate::error::ConfigError;

/// Id of the `<script type="application/json">` element holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "physik-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Quiet period before a search runs, in milliseconds.
    pub debounce_ms: u32,
    /// Query-string parameter mirroring the current search.
    pub search_param: String,
    /// `localStorage` key for the dark-mode flag.
    pub theme_key: String,
    pub pendulum: PendulumConfig,
    /// Particles per confetti burst.
    pub confetti_count: usize,
    /// `"debug"`, `"info"`, `"warn"` or `"error"`.
    pub log_level: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            search_param: "search".to_string(),
            theme_key: "darkMode".to_string(),
            pendulum: PendulumConfig::default(),
            confetti_count: 20,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PendulumConfig {
    pub gravity: f64,
    /// Arm length in canvas pixels.
    pub length: f64,
    /// Velocity multiplier applied every frame.
    pub damping: f64,
    /// Pivot height from the top of the canvas.
    pub pivot_y: f64,
    pub initial_angle: f64,
    /// Angular velocity at start, in radians per frame.
    pub initial_velocity: f64,
    pub initial_amplitude: f64,
    pub initial_mass: f64,
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            length: 200.0,
            damping: 0.999,
            pivot_y: 50.0,
            initial_angle: std::f64::consts::FRAC_PI_4,
            initial_velocity: 0.0,
            initial_amplitude: 0.1,
            initial_mass: 0.2,
        }
    }
}

impl SiteConfig {
    /// Parse overrides from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: SiteConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pendulum;
        if !(p.length.is_finite() && p.length > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pendulum.length must be positive, got {}",
                p.length
            )));
        }
        if !(p.damping.is_finite() && p.damping > 0.0 && p.damping <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "pendulum.damping must be in (0, 1], got {}",
                p.damping
            )));
        }
        if !p.gravity.is_finite() {
            return Err(ConfigError::Invalid("pendulum.gravity must be finite".into()));
        }
        if !(p.initial_angle.is_finite() && p.initial_velocity.is_finite()) {
            return Err(ConfigError::Invalid(
                "pendulum initial angle and velocity must be finite".into(),
            ));
        }
        if self.search_param.is_empty() {
            return Err(ConfigError::Invalid("search_param is empty".into()));
        }
        Ok(())
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        }
    }
}
