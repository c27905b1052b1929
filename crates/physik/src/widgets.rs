//! Disclosure panels for exercise solutions and formula collections.

pub const SHOW_SOLUTION_HTML: &str = r#"<i class="fas fa-lightbulb"></i> Lösung anzeigen"#;
pub const HIDE_SOLUTION_HTML: &str = r#"<i class="fas fa-eye-slash"></i> Lösung verstecken"#;

/// Opacity of dimmed formula cards.
pub const DIMMED_OPACITY: f64 = 0.3;

/// One exercise's solution panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionPanel {
    hidden: bool,
}

/// What toggling a solution panel does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionToggle {
    Reveal,
    Conceal,
}

impl SolutionToggle {
    /// Button markup after the toggle.
    pub fn button_html(self) -> &'static str {
        match self {
            SolutionToggle::Reveal => HIDE_SOLUTION_HTML,
            SolutionToggle::Conceal => SHOW_SOLUTION_HTML,
        }
    }

    /// Confetti only celebrates a reveal.
    pub fn celebrates(self) -> bool {
        self == SolutionToggle::Reveal
    }
}

impl SolutionPanel {
    /// `hidden` mirrors the panel's `hidden` class.
    pub fn from_hidden(hidden: bool) -> Self {
        Self { hidden }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn toggle(&mut self) -> SolutionToggle {
        self.hidden = !self.hidden;
        if self.hidden {
            SolutionToggle::Conceal
        } else {
            SolutionToggle::Reveal
        }
    }
}

/// Next opacity for a formula card given its current inline opacity.
pub fn formula_opacity(current: &str) -> f64 {
    match current.trim().parse::<f64>() {
        Ok(v) if (v - DIMMED_OPACITY).abs() < 1e-6 => 1.0,
        _ => DIMMED_OPACITY,
    }
}

/// Toggle the formula panel's eye icon class.
pub fn formula_icon(current: &str) -> &'static str {
    if current.contains("eye-slash") {
        "fas fa-eye"
    } else {
        "fas fa-eye-slash"
    }
}
