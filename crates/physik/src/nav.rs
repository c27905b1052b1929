//! Navigation state: mobile menu, floating action menu, keyboard shortcuts
//! and section stepping.

/// Vertical space kept free for the fixed header when scrolling to a section.
pub const HEADER_OFFSET: f64 = 80.0;

/// Mobile navigation menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns the new open state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }
}

/// Floating action button menu. Starts hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FabMenu {
    hidden: bool,
}

impl Default for FabMenu {
    fn default() -> Self {
        Self { hidden: true }
    }
}

impl FabMenu {
    /// Sync with the page (the `hidden` class may be set in markup).
    pub fn from_hidden(hidden: bool) -> Self {
        Self { hidden }
    }

    pub fn is_open(&self) -> bool {
        !self.hidden
    }

    /// Returns true if the menu is now open.
    pub fn toggle(&mut self) -> bool {
        self.hidden = !self.hidden;
        !self.hidden
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    FocusSearch,
    ResetSearch,
    NextSection,
    PrevSection,
}

impl Shortcut {
    /// Map a keydown. `in_search` is true when the search input has focus.
    pub fn from_key(key: &str, ctrl: bool, meta: bool, in_search: bool) -> Option<Self> {
        match key {
            "k" | "K" if ctrl || meta => Some(Shortcut::FocusSearch),
            "Escape" if in_search => Some(Shortcut::ResetSearch),
            "ArrowDown" if ctrl => Some(Shortcut::NextSection),
            "ArrowUp" if ctrl => Some(Shortcut::PrevSection),
            _ => None,
        }
    }

    /// Whether the browser's own handling of the key must be suppressed.
    pub fn prevents_default(self) -> bool {
        !matches!(self, Shortcut::ResetSearch)
    }
}

/// Whether a menu item with `href` is the active one.
pub fn is_active_href(href: Option<&str>, active_id: Option<&str>) -> bool {
    match (href, active_id) {
        (Some(h), Some(id)) if !id.is_empty() => h.strip_prefix('#') == Some(id),
        _ => false,
    }
}

/// Index of the first section whose anchor lies below the current position.
/// `tops` are absolute document offsets in page order.
pub fn next_section(tops: &[f64], scroll_y: f64) -> Option<usize> {
    tops.iter()
        .position(|&top| top - HEADER_OFFSET > scroll_y + 1.0)
}

/// Index of the last section whose anchor lies above the current position.
pub fn prev_section(tops: &[f64], scroll_y: f64) -> Option<usize> {
    tops.iter()
        .rposition(|&top| top - HEADER_OFFSET < scroll_y - 1.0)
}

/// Scroll target for a section top.
pub fn scroll_target(top: f64) -> f64 {
    (top - HEADER_OFFSET).max(0.0)
}
