//! Confetti burst parameters.

use crate::anim::Tween;

pub const COLORS: [&str; 4] = ["#00d4ff", "#8b5cf6", "#f472b6", "#10b981"];

/// Seconds each particle lives.
pub const LIFETIME: f64 = 1.0;

/// xorshift64 generator; deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct XorShift {
    state: u64,
}

impl XorShift {
    pub fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// One particle's color and flight, relative to its launch point.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub color: &'static str,
    /// Horizontal drift in pixels, `-100..100`.
    pub dx: f64,
    /// Vertical drift in pixels, `-150..-50` (upward).
    pub dy: f64,
    /// Rotation in degrees, `0..360`.
    pub rotation: f64,
}

pub fn burst(count: usize, rng: &mut XorShift) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let color = COLORS[(rng.next_f64() * COLORS.len() as f64) as usize % COLORS.len()];
            Particle {
                color,
                dx: (rng.next_f64() - 0.5) * 200.0,
                dy: rng.next_f64() * -100.0 - 50.0,
                rotation: rng.next_f64() * 360.0,
            }
        })
        .collect()
}

/// Inline style for a particle launched at `(left, top)`.
pub fn particle_style(p: &Particle, left: f64, top: f64) -> String {
    format!(
        "position:fixed;width:4px;height:4px;background:{};left:{left:.1}px;top:{top:.1}px;\
         border-radius:50%;pointer-events:none;z-index:9999",
        p.color
    )
}

/// Drift, spin and shrink to nothing over [`LIFETIME`].
pub fn flight(p: &Particle) -> Tween {
    Tween::new(LIFETIME)
        .to("x", p.dx)
        .to("y", p.dy)
        .to("rotation", p.rotation)
        .to("scale", 0)
        .ease("power2.out")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_ranges() {
        let mut rng = XorShift::new(42);
        let parts = burst(200, &mut rng);
        assert_eq!(parts.len(), 200);
        for p in &parts {
            assert!(COLORS.contains(&p.color));
            assert!((-100.0..100.0).contains(&p.dx));
            assert!((-150.0..=-50.0).contains(&p.dy));
            assert!((0.0..360.0).contains(&p.rotation));
        }
    }

    #[test]
    fn deterministic_for_seed() {
        let a = burst(5, &mut XorShift::new(7));
        let b = burst(5, &mut XorShift::new(7));
        assert_eq!(a, b);
    }

    #[test]
    fn zero_seed_still_moves() {
        let mut rng = XorShift::new(0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn style_has_position_and_color() {
        let p = Particle { color: COLORS[0], dx: 0.0, dy: -60.0, rotation: 0.0 };
        let s = particle_style(&p, 10.0, 20.0);
        assert!(s.contains("left:10.0px"));
        assert!(s.contains("background:#00d4ff"));
    }

    #[test]
    fn flight_has_no_instant_styles() {
        let p = Particle { color: COLORS[1], dx: 12.5, dy: -80.0, rotation: 90.0 };
        let t = flight(&p);
        assert_eq!(t.to["x"], serde_json::json!(12.5));
        assert_eq!(t.duration, LIFETIME);
        assert!(t.end_styles().is_empty());
    }
}
