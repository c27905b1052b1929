//! Count-up animation for the statistics counters.

/// Seconds from zero to the target.
pub const COUNTER_DURATION: f64 = 2.0;

/// Cubic ease-out (GSAP's `power2.out`).
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// A counter animating from 0 to `target`, integer-snapped.
#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    target: i64,
    started_at: Option<f64>,
}

impl Counter {
    pub fn new(target: i64) -> Self {
        Self {
            target,
            started_at: None,
        }
    }

    /// Parse a `data-target` attribute. Non-numeric targets yield `None` and
    /// the counter is left alone.
    pub fn from_attr(raw: &str) -> Option<Self> {
        raw.trim().parse().ok().map(Self::new)
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start once; later calls are ignored.
    pub fn start(&mut self, now_ms: f64) {
        self.started_at.get_or_insert(now_ms);
    }

    /// Displayed value at `now_ms`.
    pub fn value_at(&self, now_ms: f64) -> i64 {
        let Some(t0) = self.started_at else {
            return 0;
        };
        let t = (now_ms - t0) / (COUNTER_DURATION * 1000.0);
        (self.target as f64 * ease_out_cubic(t)).round() as i64
    }

    pub fn is_done(&self, now_ms: f64) -> bool {
        self.started_at
            .is_some_and(|t0| now_ms - t0 >= COUNTER_DURATION * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_started() {
        let c = Counter::new(100);
        assert_eq!(c.value_at(5_000.0), 0);
        assert!(!c.is_done(5_000.0));
    }

    #[test]
    fn reaches_target_and_is_monotone() {
        let mut c = Counter::new(250);
        c.start(1_000.0);
        let mut last = 0;
        for ms in (1_000..=3_000).step_by(50) {
            let v = c.value_at(ms as f64);
            assert!(v >= last);
            last = v;
        }
        assert_eq!(c.value_at(3_000.0), 250);
        assert_eq!(c.value_at(10_000.0), 250);
        assert!(c.is_done(3_000.0));
    }

    #[test]
    fn restart_is_ignored() {
        let mut c = Counter::new(10);
        c.start(0.0);
        c.start(1_500.0);
        assert!(c.is_done(2_000.0));
    }

    #[test]
    fn non_numeric_attr_skipped() {
        assert!(Counter::from_attr("viele").is_none());
        assert_eq!(Counter::from_attr(" 42 ").map(|c| c.target()), Some(42));
    }
}
