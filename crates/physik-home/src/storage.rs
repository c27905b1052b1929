use physik::Theme;
use web_sys::Storage;

fn storage() -> Option<Storage> {
    crate::dom::window().local_storage().ok().flatten()
}

/// Stored theme, falling back to dark when storage is unavailable.
pub fn load_theme(key: &str) -> Theme {
    let stored = storage().and_then(|s| s.get_item(key).ok().flatten());
    Theme::from_stored(stored.as_deref())
}

pub fn save_theme(key: &str, theme: Theme) {
    if let Some(s) = storage() {
        if s.set_item(key, theme.encode()).is_err() {
            log::warn!("theme: could not persist preference");
        }
    }
}
