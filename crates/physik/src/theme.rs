//! Dark/light theme preference.

use crate::error::ThemeError;

pub const BODY_CLASS: &str = "dark-mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// `<meta name="theme-color">` content.
    pub fn meta_color(self) -> &'static str {
        match self {
            Theme::Dark => "#0a0a0f",
            Theme::Light => "#ffffff",
        }
    }

    /// Icon class for the toggle button; shows the theme you'd switch to.
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Dark => "fas fa-sun",
            Theme::Light => "fas fa-moon",
        }
    }

    /// Stored form of the dark-mode flag.
    pub fn encode(self) -> &'static str {
        if self.is_dark() {
            "true"
        } else {
            "false"
        }
    }

    pub fn decode(stored: &str) -> Result<Self, ThemeError> {
        match stored.trim() {
            "true" => Ok(Theme::Dark),
            "false" => Ok(Theme::Light),
            other => Err(ThemeError(other.to_string())),
        }
    }

    /// Theme at startup from an optional stored value. Missing or unreadable
    /// values fall back to dark.
    pub fn from_stored(stored: Option<&str>) -> Self {
        match stored.map(Theme::decode) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                log::warn!("theme: {e}, using dark");
                Theme::Dark
            }
            None => Theme::Dark,
        }
    }
}
