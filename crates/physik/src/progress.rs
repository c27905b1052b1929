//! Reading-progress bar.

/// Percentage of the document scrolled, clamped to `0..=100`.
///
/// A document that fits in the viewport reads as fully scrolled.
pub fn reading_progress(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let scrollable = scroll_height - client_height;
    if scrollable <= 0.0 || !scrollable.is_finite() {
        return 100.0;
    }
    (scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
}
