//! Joint limits, padding and clamping.
//!
//! Optimizers occasionally step a hair past a joint limit. Planning against
//! limits inset by a small fraction of each joint's range keeps the final
//! trajectory inside the raw limits.
//!
//! # Example
//!
//! ```
//! use chomp_types::JointLimits;
//! use nalgebra::DVector;
//!
//! let limits = JointLimits::new(DVector::from_element(1, -1.0), DVector::from_element(1, 1.0)).unwrap();
//! let padded = limits.padded(0.1).unwrap();
//!
//! let q = padded.clamped(&DVector::from_element(1, 1.5));
//! assert!((q[0] - 0.8).abs() < 1e-12);
//! ```

use nalgebra::DVector;

use crate::error::{PlanningError, PlanningResult};

/// Lower and upper position limits of the active degrees of freedom.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointLimits {
    lower: DVector<f64>,
    upper: DVector<f64>,
}

impl JointLimits {
    /// Creates joint limits.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::DimensionMismatch`] if the bounds differ in
    /// length and [`PlanningError::InvalidLimits`] if any bound is not finite
    /// or a lower bound exceeds its upper bound. Unbounded joints must be
    /// given explicit finite limits.
    pub fn new(lower: DVector<f64>, upper: DVector<f64>) -> PlanningResult<Self> {
        if lower.len() != upper.len() {
            return Err(PlanningError::DimensionMismatch {
                expected: lower.len(),
                actual: upper.len(),
            });
        }

        for (index, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(PlanningError::InvalidLimits {
                    index,
                    lower: lo,
                    upper: hi,
                });
            }
        }

        Ok(Self { lower, upper })
    }

    /// Creates limits from `(lower, upper)` pairs.
    ///
    /// # Errors
    ///
    /// See [`JointLimits::new`].
    pub fn from_pairs(pairs: &[(f64, f64)]) -> PlanningResult<Self> {
        let lower = DVector::from_iterator(pairs.len(), pairs.iter().map(|p| p.0));
        let upper = DVector::from_iterator(pairs.len(), pairs.iter().map(|p| p.1));
        Self::new(lower, upper)
    }

    /// Number of degrees of freedom.
    #[must_use]
    pub fn dof(&self) -> usize {
        self.lower.len()
    }

    /// Lower bounds.
    #[must_use]
    pub const fn lower(&self) -> &DVector<f64> {
        &self.lower
    }

    /// Upper bounds.
    #[must_use]
    pub const fn upper(&self) -> &DVector<f64> {
        &self.upper
    }

    /// Returns limits inset by `padding` times each joint's range at both ends.
    ///
    /// `upper' = upper - p * (upper - lower)` and
    /// `lower' = lower + p * (upper - lower)`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::InvalidPadding`] unless `0 <= padding < 0.5`.
    pub fn padded(&self, padding: f64) -> PlanningResult<Self> {
        if !(0.0..0.5).contains(&padding) {
            return Err(PlanningError::InvalidPadding(padding));
        }

        let interval = (&self.upper - &self.lower) * padding;
        Ok(Self {
            lower: &self.lower + &interval,
            upper: &self.upper - &interval,
        })
    }

    /// Returns `true` if every component lies within the limits.
    ///
    /// A configuration of the wrong dimension is never within limits.
    #[must_use]
    pub fn contains(&self, q: &DVector<f64>) -> bool {
        q.len() == self.dof()
            && q.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(&v, (&lo, &hi))| v >= lo && v <= hi)
    }

    /// Projects each out-of-range component onto its nearest bound, in place.
    ///
    /// Components beyond the limits' dimension are left untouched.
    pub fn clamp(&self, q: &mut DVector<f64>) {
        for (v, (&lo, &hi)) in q
            .iter_mut()
            .zip(self.lower.iter().zip(self.upper.iter()))
        {
            if *v > hi {
                *v = hi;
            } else if *v < lo {
                *v = lo;
            }
        }
    }

    /// Returns a clamped copy of `q`.
    #[must_use]
    pub fn clamped(&self, q: &DVector<f64>) -> DVector<f64> {
        let mut out = q.clone();
        self.clamp(&mut out);
        out
    }
}
