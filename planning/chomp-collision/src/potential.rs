//! Smoothed distance-to-cost potential.
//!
//! Maps a signed distance `d` to an obstacle cost with smoothing radius
//! `epsilon`:
//!
//! | Zone | Condition | Cost | Gradient |
//! |------|-----------|------|----------|
//! | Penetrating | `d < 0` | `-d + epsilon/2` | `-g` |
//! | Near | `0 <= d <= epsilon` | `(d - epsilon)^2 / (2 epsilon)` | `g * (d - epsilon) / (2 epsilon)` |
//! | Far | `d > epsilon` | `0` | `g` (unscaled) |
//!
//! The cost and its slope both vanish at `d = epsilon`, and the cost grows
//! linearly (slope `-1`) for deep penetration. A zero cost must be treated as
//! contributing no gradient: in the far zone the direction comes back
//! untouched.

use nalgebra::Vector3;

/// Cost and scaled gradient returned by [`smoothed_cost`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotentialSample {
    /// Obstacle cost (non-negative).
    pub cost: f64,
    /// The input direction scaled for the caller.
    pub gradient: Vector3<f64>,
}

impl PotentialSample {
    /// Returns `true` if the sample lies in the far zone (zero cost).
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.cost <= 0.0
    }

    /// Returns the gradient, or zero when the sample carries no cost.
    #[must_use]
    pub fn effective_gradient(&self) -> Vector3<f64> {
        if self.is_free() {
            Vector3::zeros()
        } else {
            self.gradient
        }
    }
}

/// Evaluates the smoothed cost potential.
///
/// `direction` is the unnormalized gradient seed (for example the distance
/// field gradient); it is returned scaled according to the zone of `distance`.
///
/// `epsilon` must be positive; callers validate it once at configuration time.
///
/// # Example
///
/// ```
/// use chomp_collision::smoothed_cost;
/// use nalgebra::Vector3;
///
/// // Touching: half the smoothing radius.
/// let touching = smoothed_cost(0.0, 0.2, Vector3::x());
/// assert!((touching.cost - 0.1).abs() < 1e-12);
///
/// // Far away: free.
/// assert_eq!(smoothed_cost(0.5, 0.2, Vector3::x()).cost, 0.0);
/// ```
#[must_use]
pub fn smoothed_cost(distance: f64, epsilon: f64, direction: Vector3<f64>) -> PotentialSample {
    debug_assert!(epsilon > 0.0, "smoothing radius must be positive");

    if distance < 0.0 {
        return PotentialSample {
            cost: -distance + 0.5 * epsilon,
            gradient: -direction,
        };
    }

    if distance <= epsilon {
        let f = distance - epsilon;
        return PotentialSample {
            cost: 0.5 * f * f / epsilon,
            gradient: direction * (0.5 * f / epsilon),
        };
    }

    PotentialSample {
        cost: 0.0,
        gradient: direction,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPS: f64 = 0.1;

    #[test]
    fn test_far_zone_is_free() {
        let sample = smoothed_cost(0.3, EPS, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(sample.cost, 0.0);
        assert!(sample.is_free());
        assert_eq!(sample.gradient, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(sample.effective_gradient(), Vector3::zeros());
    }

    #[test]
    fn test_boundary_is_zero() {
        let sample = smoothed_cost(EPS, EPS, Vector3::x());
        assert_eq!(sample.cost, 0.0);
        assert_eq!(sample.gradient, Vector3::zeros());
    }

    #[test]
    fn test_touching_costs_half_epsilon() {
        let sample = smoothed_cost(0.0, EPS, Vector3::y());
        assert_relative_eq!(sample.cost, 0.5 * EPS);
        assert_relative_eq!(sample.gradient, Vector3::y() * -0.5);
    }

    #[test]
    fn test_near_zone_values() {
        let d = 0.04;
        let f = d - EPS;
        let sample = smoothed_cost(d, EPS, Vector3::z() * 2.0);
        assert_relative_eq!(sample.cost, 0.5 * f * f / EPS, epsilon = 1e-15);
        assert_relative_eq!(sample.gradient.z, 2.0 * 0.5 * f / EPS, epsilon = 1e-15);
    }

    #[test]
    fn test_penetration_is_linear() {
        let a = smoothed_cost(-0.2, EPS, Vector3::x());
        let b = smoothed_cost(-0.3, EPS, Vector3::x());
        assert_relative_eq!(a.cost, 0.25, epsilon = 1e-12);
        assert_relative_eq!(b.cost - a.cost, 0.1, epsilon = 1e-12);
        assert_eq!(a.gradient, -Vector3::x());
    }

    #[test]
    fn test_continuous_at_zero() {
        let below = smoothed_cost(-1e-12, EPS, Vector3::x());
        let above = smoothed_cost(1e-12, EPS, Vector3::x());
        assert_relative_eq!(below.cost, above.cost, epsilon = 1e-9);
    }

    #[test]
    fn test_slope_vanishes_at_epsilon() {
        let h = 1e-6;
        let c0 = smoothed_cost(EPS - h, EPS, Vector3::x()).cost;
        let c1 = smoothed_cost(EPS - 2.0 * h, EPS, Vector3::x()).cost;
        let slope = (c0 - c1) / h;
        assert!(slope.abs() < 1e-4, "slope near epsilon was {slope}");
        assert!(c0 < 1e-10);
    }
}
