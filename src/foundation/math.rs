/// Linear blend between `a` and `b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Index of the greatest breakpoint `<= x`, or `0` when `x` is below every breakpoint.
///
/// `labels` must be strictly ascending. For `x` at or above the last breakpoint the last
/// index is returned.
pub fn find_stop_less_than_or_equal_to(labels: &[f64], x: f64) -> usize {
    labels.partition_point(|&l| l <= x).saturating_sub(1)
}

/// Interpolation factor in `[0, 1]` for `x` between two breakpoints of an exponential curve.
///
/// Two breakpoints fix the constants of `f(x) = a * base^x + b`; the ratio
/// `(base^(x - lower) - 1) / (base^(upper - lower) - 1)` is the blend factor between the two
/// breakpoint outputs without solving for `a` and `b`. `base == 1` is plain linear progress.
pub fn exponential_factor(x: f64, base: f64, lower: f64, upper: f64) -> f64 {
    let difference = upper - lower;
    let progress = x - lower;

    if difference == 0.0 {
        0.0
    } else if base == 1.0 {
        progress / difference
    } else {
        (base.powf(progress) - 1.0) / (base.powf(difference) - 1.0)
    }
}

/// Unit cubic Bézier easing curve through `(0, 0)`, `(p1x, p1y)`, `(p2x, p2y)`, `(1, 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitBezier {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl UnitBezier {
    const NEWTON_ITERATIONS: usize = 8;
    const BISECTION_ITERATIONS: usize = 64;
    const EPSILON: f64 = 1e-6;

    /// Build the polynomial coefficients for the given control points.
    pub fn new(p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> Self {
        let cx = 3.0 * p1x;
        let bx = 3.0 * (p2x - p1x) - cx;
        let ax = 1.0 - cx - bx;

        let cy = 3.0 * p1y;
        let by = 3.0 * (p2y - p1y) - cy;
        let ay = 1.0 - cy - by;

        Self {
            ax,
            bx,
            cx,
            ay,
            by,
            cy,
        }
    }

    fn sample_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    fn sample_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    fn sample_dx(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    /// Curve parameter whose X coordinate is `x`.
    ///
    /// Newton's method first, bisection when the derivative vanishes or Newton does not
    /// converge. Both loops are bounded.
    pub fn solve_x(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..Self::NEWTON_ITERATIONS {
            let err = self.sample_x(t) - x;
            if err.abs() < Self::EPSILON {
                return t;
            }
            let d = self.sample_dx(t);
            if d.abs() < Self::EPSILON {
                break;
            }
            t -= err / d;
        }

        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut t = x;
        if t < lo {
            return lo;
        }
        if t > hi {
            return hi;
        }
        for _ in 0..Self::BISECTION_ITERATIONS {
            let sx = self.sample_x(t);
            if (sx - x).abs() < Self::EPSILON {
                return t;
            }
            if x > sx {
                lo = t;
            } else {
                hi = t;
            }
            t = lo + (hi - lo) * 0.5;
        }
        t
    }

    /// Eased progress for linear progress `x` in `[0, 1]`.
    pub fn solve(&self, x: f64) -> f64 {
        self.sample_y(self.solve_x(x))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
