//! Trajectories of configuration vectors.
//!
//! A [`Trajectory`] holds the interior waypoints handed to the optimizer, one
//! configuration per row. The fixed start and goal configurations are kept
//! outside it and only joined back on when the full path is needed.
//!
//! # Example
//!
//! ```
//! use chomp_types::Trajectory;
//! use nalgebra::DVector;
//!
//! let q0 = DVector::from_element(1, 0.0);
//! let q1 = DVector::from_element(1, 10.0);
//!
//! let seed = Trajectory::straight_line(&q0, &q1, 4).unwrap();
//! let values: Vec<f64> = (0..seed.len()).map(|i| seed.waypoint(i)[0]).collect();
//! assert_eq!(values, vec![2.0, 4.0, 6.0, 8.0]);
//! ```

use nalgebra::{DMatrix, DVector};

use crate::error::{PlanningError, PlanningResult};
use crate::limits::JointLimits;

/// An ordered sequence of configuration vectors of equal dimension.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory {
    /// One waypoint per row.
    waypoints: DMatrix<f64>,
}

impl Trajectory {
    /// Wraps a waypoint matrix (one waypoint per row).
    #[must_use]
    pub const fn from_matrix(waypoints: DMatrix<f64>) -> Self {
        Self { waypoints }
    }

    /// Builds a trajectory from individual waypoints.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::ZeroWaypoints`] for an empty list and
    /// [`PlanningError::DimensionMismatch`] if the waypoints differ in length.
    pub fn from_waypoints(waypoints: &[DVector<f64>]) -> PlanningResult<Self> {
        let first = waypoints.first().ok_or(PlanningError::ZeroWaypoints)?;
        let dof = first.len();

        let mut matrix = DMatrix::zeros(waypoints.len(), dof);
        for (i, q) in waypoints.iter().enumerate() {
            if q.len() != dof {
                return Err(PlanningError::DimensionMismatch {
                    expected: dof,
                    actual: q.len(),
                });
            }
            matrix.set_row(i, &q.transpose());
        }

        Ok(Self { waypoints: matrix })
    }

    /// Builds the straight-line seed between `q0` and `q1`.
    ///
    /// Produces `n` interior waypoints; waypoint `i` (1-indexed) is
    /// `q0 + i * (q1 - q0) / (n + 1)`. The endpoints themselves are not
    /// included.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::ZeroWaypoints`] if `n == 0` and
    /// [`PlanningError::DimensionMismatch`] if `q0` and `q1` differ in length.
    pub fn straight_line(q0: &DVector<f64>, q1: &DVector<f64>, n: usize) -> PlanningResult<Self> {
        if n == 0 {
            return Err(PlanningError::ZeroWaypoints);
        }
        if q0.len() != q1.len() {
            return Err(PlanningError::DimensionMismatch {
                expected: q0.len(),
                actual: q1.len(),
            });
        }

        let step = (q1 - q0) / (n + 1) as f64;
        let mut waypoints = DMatrix::zeros(n, q0.len());
        for i in 0..n {
            let q = q0 + &step * (i + 1) as f64;
            waypoints.set_row(i, &q.transpose());
        }

        Ok(Self { waypoints })
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.nrows()
    }

    /// Returns `true` if the trajectory has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.nrows() == 0
    }

    /// Dimension of each waypoint.
    #[must_use]
    pub fn dof(&self) -> usize {
        self.waypoints.ncols()
    }

    /// Returns waypoint `i` as a column vector.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[must_use]
    pub fn waypoint(&self, i: usize) -> DVector<f64> {
        self.waypoints.row(i).transpose()
    }

    /// Iterates over the waypoints in order.
    pub fn iter(&self) -> impl Iterator<Item = DVector<f64>> + '_ {
        self.waypoints.row_iter().map(|row| row.transpose())
    }

    /// Returns the underlying matrix (one waypoint per row).
    #[must_use]
    pub const fn as_matrix(&self) -> &DMatrix<f64> {
        &self.waypoints
    }

    /// Returns a mutable reference to the underlying matrix.
    pub fn as_matrix_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.waypoints
    }

    /// Returns the full path `q0, waypoints.., q1`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::DimensionMismatch`] if either endpoint does
    /// not match the waypoint dimension.
    pub fn with_endpoints(&self, q0: &DVector<f64>, q1: &DVector<f64>) -> PlanningResult<Self> {
        for q in [q0, q1] {
            if q.len() != self.dof() {
                return Err(PlanningError::DimensionMismatch {
                    expected: self.dof(),
                    actual: q.len(),
                });
            }
        }

        let n = self.len();
        let mut full = DMatrix::zeros(n + 2, self.dof());
        full.set_row(0, &q0.transpose());
        full.rows_mut(1, n).copy_from(&self.waypoints);
        full.set_row(n + 1, &q1.transpose());

        Ok(Self { waypoints: full })
    }

    /// Returns the index of the first waypoint outside `limits`, if any.
    #[must_use]
    pub fn first_violation(&self, limits: &JointLimits) -> Option<usize> {
        self.iter().position(|q| !limits.contains(&q))
    }

    /// Returns `true` if every waypoint lies within `limits`.
    #[must_use]
    pub fn is_within(&self, limits: &JointLimits) -> bool {
        self.first_violation(limits).is_none()
    }

    /// Clamps every waypoint into `limits`.
    pub fn clamp_to(&mut self, limits: &JointLimits) {
        for i in 0..self.len() {
            let q = limits.clamped(&self.waypoint(i));
            self.waypoints.set_row(i, &q.transpose());
        }
    }
}
