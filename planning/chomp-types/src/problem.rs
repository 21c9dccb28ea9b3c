//! Planning problem setup.
//!
//! [`PlanningProblem::new`] performs the checks and preparation that must
//! happen before any optimization starts: validating the run configuration,
//! padding the joint limits, clamping both endpoints into the padded range and
//! building the straight-line seed.

use nalgebra::DVector;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::error::{PlanningError, PlanningResult};
use crate::limits::JointLimits;
use crate::trajectory::Trajectory;

/// A validated planning problem ready to hand to an optimizer.
///
/// # Example
///
/// ```
/// use chomp_types::{JointLimits, PlanningProblem, RunConfig};
/// use nalgebra::DVector;
///
/// let limits = JointLimits::from_pairs(&[(-1.0, 1.0), (-2.0, 2.0)]).unwrap();
/// let config = RunConfig::default().with_waypoints(8).with_joint_padding(0.1);
///
/// let problem = PlanningProblem::new(
///     config,
///     limits,
///     DVector::from_vec(vec![-1.5, 0.0]),
///     DVector::from_vec(vec![0.5, 1.0]),
/// )
/// .unwrap();
///
/// // The start was clamped into the padded range.
/// assert!((problem.start()[0] + 0.8).abs() < 1e-12);
/// assert_eq!(problem.seed().len(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct PlanningProblem {
    config: RunConfig,
    limits: JointLimits,
    padded_limits: JointLimits,
    start: DVector<f64>,
    goal: DVector<f64>,
    seed: Trajectory,
}

impl PlanningProblem {
    /// Sets up a planning problem.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the run configuration is invalid,
    /// or [`PlanningError::DimensionMismatch`] if either endpoint does not
    /// match the limits' dimension.
    pub fn new(
        config: RunConfig,
        limits: JointLimits,
        start: DVector<f64>,
        goal: DVector<f64>,
    ) -> PlanningResult<Self> {
        let config = config.validated()?;

        for q in [&start, &goal] {
            if q.len() != limits.dof() {
                return Err(PlanningError::DimensionMismatch {
                    expected: limits.dof(),
                    actual: q.len(),
                });
            }
            if let Some(index) = q.iter().position(|v| !v.is_finite()) {
                return Err(PlanningError::NonFiniteConfiguration { index });
            }
        }

        let padded_limits = limits.padded(config.joint_padding())?;
        let start = padded_limits.clamped(&start);
        let goal = padded_limits.clamped(&goal);
        debug_assert!(padded_limits.contains(&start));
        debug_assert!(padded_limits.contains(&goal));

        let seed = Trajectory::straight_line(&start, &goal, config.waypoints())?;
        // Interpolating between two points inside a box stays inside the box.
        debug_assert!(seed.is_within(&padded_limits));

        info!(
            "Planning problem: {} dof, {} waypoints, padding {}",
            limits.dof(),
            seed.len(),
            config.joint_padding()
        );
        debug!("Start {:?}, goal {:?}", start.as_slice(), goal.as_slice());

        Ok(Self {
            config,
            limits,
            padded_limits,
            start,
            goal,
            seed,
        })
    }

    /// Returns the run configuration.
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Returns the raw joint limits.
    #[must_use]
    pub const fn limits(&self) -> &JointLimits {
        &self.limits
    }

    /// Returns the padded joint limits every waypoint must respect.
    #[must_use]
    pub const fn padded_limits(&self) -> &JointLimits {
        &self.padded_limits
    }

    /// Returns the clamped start configuration.
    #[must_use]
    pub const fn start(&self) -> &DVector<f64> {
        &self.start
    }

    /// Returns the clamped goal configuration.
    #[must_use]
    pub const fn goal(&self) -> &DVector<f64> {
        &self.goal
    }

    /// Returns the straight-line seed trajectory.
    #[must_use]
    pub const fn seed(&self) -> &Trajectory {
        &self.seed
    }

    /// Consumes the problem and returns the seed trajectory.
    #[must_use]
    pub fn into_seed(self) -> Trajectory {
        self.seed
    }

    /// Returns the full path `start, trajectory.., goal` for an optimized
    /// interior trajectory.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::DimensionMismatch`] if the trajectory's
    /// dimension differs from the problem's.
    pub fn full_path(&self, trajectory: &Trajectory) -> PlanningResult<Trajectory> {
        trajectory.with_endpoints(&self.start, &self.goal)
    }
}
