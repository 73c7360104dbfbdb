//! Spin deceleration curves.

use rand::Rng;

/// Guide point of the cubic curve, in unit progress space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub x: f64,
    pub y: f64,
}

/// Cubic bezier ease from (0,0) to (1,1) through two guides, CSS-style:
/// x is time progress, y is rotation progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierEase {
    pub middle: Guide,
    pub end: Guide,
}

impl BezierEase {
    /// Default decelerate-to-stop shape.
    pub const fn standard() -> Self {
        Self {
            middle: Guide { x: 0.35, y: 0.9 },
            end: Guide { x: 0.825, y: 0.975 },
        }
    }

    /// Visually distinct spins: guides drawn from bounded ranges that keep
    /// the overall decelerate-to-stop shape.
    pub fn randomized<R: Rng>(rng: &mut R) -> Self {
        Self {
            middle: Guide {
                x: rng.gen_range(0.3..=0.4),
                y: rng.gen_range(0.8..=1.0),
            },
            end: Guide {
                x: rng.gen_range(0.75..=0.9),
                y: rng.gen_range(0.95..=1.0),
            },
        }
    }

    // One bezier coordinate with endpoints pinned to 0 and 1.
    fn coord(p1: f64, p2: f64, t: f64) -> f64 {
        3.0 * p1 * t * (1.0 - t).powi(2) + 3.0 * p2 * t * t * (1.0 - t) + t.powi(3)
    }

    /// Rotation progress for a time progress `x` in [0,1]. x(t) is monotonic
    /// for guides inside the unit square, so bisection on the curve
    /// parameter converges.
    pub fn progress(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        let (mut lo, mut hi) = (0.0f64, 1.0f64);
        for _ in 0..48 {
            let mid = 0.5 * (lo + hi);
            if Self::coord(self.middle.x, self.end.x, mid) < x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let t = 0.5 * (lo + hi);
        Self::coord(self.middle.y, self.end.y, t)
    }
}
