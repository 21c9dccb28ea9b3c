//! Per-sphere cost oracle.
//!
//! [`SphereCollider`] owns the kinematic model and the sphere set of one
//! optimization run and combines the environment and self-collision channels
//! into the three quantities the optimizer consumes for each
//! (waypoint, active sphere) pair:
//!
//! - the scalar cost `obs_factor * c_env + obs_factor_self * c_self`
//! - the workspace gradient `cgrad` (3 entries)
//! - the configuration-space gradient matrix `dx_dq` (3 × dof)
//!
//! When the self cost exceeds the configured threshold:
//!
//! ```text
//! dx_dq = J * (obs_factor + obs_factor_self) - acc * obs_factor_self / c_self
//! cgrad = obs_factor * g_env + obs_factor_self * g_self / c_self
//! ```
//!
//! otherwise `dx_dq = J * obs_factor` and `cgrad = obs_factor * g_env`. Here
//! `J` is the Jacobian of the sphere center and `acc` the pair-cost weighted
//! sum of the other spheres' Jacobians.
//!
//! Pose application is a separate step ([`SphereCollider::set_configuration`]).
//! The [`CostOracle`] entry point keeps the batch contract of applying the
//! configuration when sphere 0 is requested.

use std::sync::Arc;

use chomp_types::{AdjacencySet, CollisionConfig, PlanningError, PlanningResult, SphereSet};
use nalgebra::{DMatrix, DVector, Vector3};
use tracing::{debug, info, trace};

use crate::environment::EnvironmentEvaluator;
use crate::field::DistanceField;
use crate::kinematics::KinematicModel;
use crate::potential::PotentialSample;
use crate::self_collision::SelfCollisionEvaluator;

/// Dimension of the workspace the spheres live in.
pub const WORKSPACE_DIM: usize = 3;

/// Cost and gradients of one sphere at one waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereGradient {
    /// Weighted scalar cost.
    pub cost: f64,
    /// Workspace gradient.
    pub workspace_gradient: Vector3<f64>,
    /// Configuration-space gradient matrix (3 × dof).
    pub dx_dq: DMatrix<f64>,
}

/// Per-sphere cost interface consumed by a trajectory optimizer.
pub trait CostOracle {
    /// Dimension of the workspace gradient.
    fn workspace_dim(&self) -> usize {
        WORKSPACE_DIM
    }

    /// Number of configuration variables.
    fn config_dim(&self) -> usize;

    /// Number of bodies (active spheres) evaluated per waypoint.
    fn num_bodies(&self) -> usize;

    /// Evaluates body `body_index` at configuration `q`.
    ///
    /// The configuration is applied when `body_index == 0`; callers must
    /// evaluate the bodies of one waypoint in increasing order starting at 0.
    ///
    /// # Errors
    ///
    /// See [`SphereCollider::set_configuration`] and
    /// [`SphereCollider::evaluate_sphere`].
    fn evaluate(&mut self, q: &DVector<f64>, body_index: usize) -> PlanningResult<SphereGradient>;
}

/// Sphere-based collision cost engine.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use chomp_collision::{
///     CostOracle, SerialChain, SphereCollider, SphereModelBuilder, SphereObstacle,
/// };
/// use chomp_types::{CollisionConfig, SphereSpec};
/// use nalgebra::{DVector, Isometry3, Point3, Vector3};
///
/// let arm = SerialChain::builder()
///     .fixed("base", None, Isometry3::identity())
///     .revolute("link1", Some(0), Isometry3::identity(), Vector3::z_axis())
///     .build()
///     .unwrap();
/// let spheres = SphereModelBuilder::new(&arm)
///     .with_robot_sphere(SphereSpec::new("link1", Point3::new(1.0, 0.0, 0.0), 0.1))
///     .build()
///     .unwrap();
/// let adjacency = arm.adjacency();
///
/// let mut collider = SphereCollider::new(arm, spheres, adjacency, CollisionConfig::default())
///     .unwrap()
///     .with_field(Arc::new(SphereObstacle::new(Point3::new(1.2, 0.0, 0.0), 0.05)));
///
/// let result = collider.evaluate(&DVector::zeros(1), 0).unwrap();
/// assert!(result.cost > 0.0);
/// assert_eq!(result.dx_dq.shape(), (3, 1));
/// ```
#[derive(Debug)]
pub struct SphereCollider<K> {
    model: K,
    spheres: SphereSet,
    environment: EnvironmentEvaluator,
    self_collision: SelfCollisionEvaluator,
    config: CollisionConfig,
}

impl<K: KinematicModel> SphereCollider<K> {
    /// Creates a collider with no distance fields.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::InvalidConfig`] if `config` fails validation.
    pub fn new(
        model: K,
        spheres: SphereSet,
        adjacency: impl Into<Arc<AdjacencySet>>,
        config: CollisionConfig,
    ) -> PlanningResult<Self> {
        let config = config.validated()?;
        let weights = config.weights();
        info!(
            "Sphere collider: {} active spheres, {} dof, env {}, self {}",
            spheres.num_active(),
            model.dof(),
            config.environment_collision(),
            config.self_collision()
        );
        Ok(Self {
            environment: EnvironmentEvaluator::new(weights.epsilon()),
            self_collision: SelfCollisionEvaluator::new(adjacency.into(), weights.epsilon_self()),
            model,
            spheres,
            config,
        })
    }

    /// Adds a distance field to the environment channel.
    #[must_use]
    pub fn with_field(mut self, field: Arc<dyn DistanceField>) -> Self {
        self.environment = self.environment.with_field(field);
        self
    }

    /// Adds several distance fields to the environment channel.
    #[must_use]
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Arc<dyn DistanceField>>) -> Self {
        self.environment = self.environment.with_fields(fields);
        self
    }

    /// The kinematic model.
    #[must_use]
    pub const fn model(&self) -> &K {
        &self.model
    }

    /// The spheres being evaluated.
    #[must_use]
    pub const fn spheres(&self) -> &SphereSet {
        &self.spheres
    }

    /// The collision configuration.
    #[must_use]
    pub const fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// The environment channel.
    #[must_use]
    pub const fn environment(&self) -> &EnvironmentEvaluator {
        &self.environment
    }

    /// Consumes the collider, returning the kinematic model.
    #[must_use]
    pub fn into_model(self) -> K {
        self.model
    }

    /// Applies configuration `q` to the kinematic model.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::NonFiniteConfiguration`] if `q` contains
    /// `NaN` or an infinity, or [`PlanningError::DimensionMismatch`] if its
    /// length differs from the model's dof.
    pub fn set_configuration(&mut self, q: &DVector<f64>) -> PlanningResult<()> {
        if let Some(index) = q.iter().position(|v| !v.is_finite()) {
            return Err(PlanningError::NonFiniteConfiguration { index });
        }
        if q.len() != self.model.dof() {
            return Err(PlanningError::DimensionMismatch {
                expected: self.model.dof(),
                actual: q.len(),
            });
        }
        debug!("Applying configuration {:?}", q.as_slice());
        self.model.apply_configuration(q)
    }

    /// Evaluates active sphere `body_index` at the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::SphereIndexOutOfRange`] if `body_index` is
    /// not an active sphere.
    pub fn evaluate_sphere(&self, body_index: usize) -> PlanningResult<SphereGradient> {
        let count = self.spheres.num_active();
        let sphere = self
            .spheres
            .active()
            .get(body_index)
            .ok_or(PlanningError::SphereIndexOutOfRange {
                index: body_index,
                count,
            })?;

        let dof = self.model.dof();
        let center = self.model.world_point(sphere.link(), sphere.pose());
        let free = PotentialSample {
            cost: 0.0,
            gradient: Vector3::zeros(),
        };

        let env = if self.config.environment_collision() {
            self.environment.evaluate(sphere, &center)
        } else {
            free
        };

        let mut acc = DMatrix::zeros(WORKSPACE_DIM, dof);
        let own = if self.config.self_collision() {
            self.self_collision
                .evaluate(&self.model, &self.spheres, body_index, &center, &mut acc)
        } else {
            free
        };

        let jacobian = self.model.jacobian(sphere.link(), &center);
        let weights = self.config.weights();
        let of = weights.obs_factor();
        let ofs = weights.obs_factor_self();

        let (dx_dq, workspace_gradient) = if own.cost > self.config.self_cost_threshold() {
            let scale = ofs / own.cost;
            (
                jacobian * (of + ofs) - acc * scale,
                env.gradient * of + own.gradient * scale,
            )
        } else {
            (jacobian * of, env.gradient * of)
        };

        let cost = of * env.cost + ofs * own.cost;
        trace!(
            "Sphere {}: env {:.6}, self {:.6}, total {:.6}",
            body_index, env.cost, own.cost, cost
        );

        Ok(SphereGradient {
            cost,
            workspace_gradient,
            dx_dq,
        })
    }

    /// Applies `q` once and evaluates every active sphere in index order.
    ///
    /// # Errors
    ///
    /// See [`SphereCollider::set_configuration`].
    pub fn evaluate_waypoint(&mut self, q: &DVector<f64>) -> PlanningResult<Vec<SphereGradient>> {
        self.set_configuration(q)?;
        (0..self.spheres.num_active())
            .map(|index| self.evaluate_sphere(index))
            .collect()
    }

    /// Total weighted cost of all active spheres at `q`.
    ///
    /// # Errors
    ///
    /// See [`SphereCollider::set_configuration`].
    pub fn waypoint_cost(&mut self, q: &DVector<f64>) -> PlanningResult<f64> {
        Ok(self.evaluate_waypoint(q)?.iter().map(|g| g.cost).sum())
    }
}

impl<K: KinematicModel> CostOracle for SphereCollider<K> {
    fn config_dim(&self) -> usize {
        self.model.dof()
    }

    fn num_bodies(&self) -> usize {
        self.spheres.num_active()
    }

    fn evaluate(&mut self, q: &DVector<f64>, body_index: usize) -> PlanningResult<SphereGradient> {
        if body_index == 0 {
            self.set_configuration(q)?;
        }
        self.evaluate_sphere(body_index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::field::SphereObstacle;
    use crate::kinematics::SerialChain;
    use crate::model::SphereModelBuilder;
    use approx::assert_relative_eq;
    use chomp_types::{CostWeights, SphereSpec};
    use nalgebra::{Isometry3, Point3};

    /// Two-link planar arm with a sphere at the tip and one on the base.
    ///
    /// At `q = 0` the tip sphere sits at (2, 0, 0) and the base sphere at
    /// (2, 0.15, 0), overlapping by 0.05.
    fn collider(config: CollisionConfig) -> SphereCollider<SerialChain> {
        collider_with_base(Point3::new(2.0, 0.15, 0.0), config)
    }

    /// Same arm with the fixed base sphere at `base`.
    fn collider_with_base(
        base: Point3<f64>,
        config: CollisionConfig,
    ) -> SphereCollider<SerialChain> {
        let arm = SerialChain::builder()
            .fixed("base", None, Isometry3::identity())
            .revolute("upper", Some(0), Isometry3::identity(), Vector3::z_axis())
            .revolute("fore", Some(1), Isometry3::translation(1.0, 0.0, 0.0), Vector3::z_axis())
            .build()
            .unwrap();
        let spheres = SphereModelBuilder::new(&arm)
            .with_robot_sphere(SphereSpec::new("fore", Point3::new(1.0, 0.0, 0.0), 0.1))
            .with_robot_sphere(SphereSpec::new("base", base, 0.1))
            .build()
            .unwrap();
        let adjacency = arm.adjacency();
        SphereCollider::new(arm, spheres, adjacency, config)
            .unwrap()
            .with_field(Arc::new(SphereObstacle::new(Point3::new(2.0, -0.35, 0.0), 0.2)))
    }

    #[test]
    fn test_self_cost_zero_reduces_to_scaled_jacobian() {
        let mut collider = collider(CollisionConfig::default().with_self_collision(false));
        let q = DVector::from_vec(vec![0.0, 0.0]);
        let result = collider.evaluate(&q, 0).unwrap();

        let jacobian = collider.model().jacobian(2, &Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(result.dx_dq, jacobian * 0.7, epsilon = 1e-12);

        // Obstacle surface at y = -0.15, sphere surface at y = -0.1: clearance 0.05.
        let f: f64 = 0.05 - 0.1;
        assert_relative_eq!(result.cost, 0.7 * 0.5 * f * f / 0.1, epsilon = 1e-12);
        assert_relative_eq!(
            result.workspace_gradient,
            Vector3::y() * (0.7 * 0.5 * f / 0.1),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_combined_channels() {
        let mut collider = collider(CollisionConfig::default());
        let result = collider.evaluate(&DVector::zeros(2), 0).unwrap();

        let f: f64 = 0.05 - 0.1;
        let env_cost = 0.5 * f * f / 0.1;
        let self_cost = 0.05 + 0.02;
        assert_relative_eq!(result.cost, 0.7 * env_cost + 0.3 * self_cost, epsilon = 1e-12);

        // The base sphere never moves, so the accumulator stays zero.
        let jacobian = collider.model().jacobian(2, &Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(result.dx_dq, jacobian * 1.0, epsilon = 1e-12);

        // Self direction is -Y, negated under penetration and normalized by the cost.
        let expected = Vector3::y() * (0.7 * 0.5 * f / 0.1) + Vector3::y() * 0.3;
        assert_relative_eq!(result.workspace_gradient, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_self_cost_below_threshold_ignored_in_gradient() {
        let mut collider = collider(
            CollisionConfig::default()
                .with_environment_collision(false)
                .with_self_cost_threshold(1.0),
        );
        let result = collider.evaluate(&DVector::zeros(2), 0).unwrap();

        // Cost still carries the self channel.
        assert_relative_eq!(result.cost, 0.3 * 0.07, epsilon = 1e-12);
        assert_eq!(result.workspace_gradient, Vector3::zeros());
        let jacobian = collider.model().jacobian(2, &Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(result.dx_dq, jacobian * 0.7, epsilon = 1e-12);
    }

    /// Tip sphere Jacobian at `q = 0`, computed the way the collider does.
    fn tip_jacobian(collider: &SphereCollider<SerialChain>) -> DMatrix<f64> {
        let center = collider.model().world_point(2, &Point3::new(1.0, 0.0, 0.0));
        collider.model().jacobian(2, &center)
    }

    #[test]
    fn test_tiny_self_cost_under_default_threshold() {
        // Clearance 5e-5 inside the self radius: cost 0.5 * (5e-5)^2 / 0.04.
        let base = Point3::new(2.0, 0.2 + 0.04 - 5e-5, 0.0);
        let config = CollisionConfig::default().with_environment_collision(false);
        assert_eq!(config.self_cost_threshold(), 1e-7);
        let mut collider = collider_with_base(base, config);
        let result = collider.evaluate(&DVector::zeros(2), 0).unwrap();

        assert!(result.cost > 0.0);
        assert!(result.cost <= 0.3 * 1e-7);
        assert_relative_eq!(result.cost, 0.3 * 3.125e-8, epsilon = 1e-12);

        assert_eq!(result.dx_dq, tip_jacobian(&collider) * 0.7);
        assert!(result.workspace_gradient.iter().all(|v| v.is_finite()));
        assert_eq!(result.workspace_gradient, Vector3::zeros());
    }

    #[test]
    fn test_pair_beyond_self_radius_reduces_to_scaled_jacobian() {
        let base = Point3::new(2.0, 0.241, 0.0);
        let mut collider = collider_with_base(
            base,
            CollisionConfig::default().with_environment_collision(false),
        );
        let result = collider.evaluate(&DVector::zeros(2), 0).unwrap();

        assert_eq!(result.cost, 0.0);
        assert_eq!(result.dx_dq, tip_jacobian(&collider) * 0.7);
        assert_eq!(result.workspace_gradient, Vector3::zeros());
    }

    #[test]
    fn test_both_channels_disabled() {
        let mut collider = collider(
            CollisionConfig::default()
                .with_environment_collision(false)
                .with_self_collision(false),
        );
        let result = collider.evaluate(&DVector::zeros(2), 0).unwrap();
        assert_eq!(result.cost, 0.0);
        assert_eq!(result.workspace_gradient, Vector3::zeros());
    }

    #[test]
    fn test_configuration_applied_on_first_body() {
        let mut collider = collider(CollisionConfig::default());
        let away = DVector::from_vec(vec![std::f64::consts::FRAC_PI_2, 0.0]);
        let result = collider.evaluate(&away, 0).unwrap();
        // Tip swings to (0, 2, 0), clear of both the obstacle and the base sphere.
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn test_nan_configuration_rejected() {
        let mut collider = collider(CollisionConfig::default());
        let q = DVector::from_vec(vec![0.0, f64::NAN]);
        let err = collider.evaluate(&q, 0).unwrap_err();
        assert_eq!(err, PlanningError::NonFiniteConfiguration { index: 1 });
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_infinite_configuration_rejected() {
        let mut collider = collider(CollisionConfig::default());
        let q = DVector::from_vec(vec![f64::INFINITY, 0.0]);
        let err = collider.evaluate(&q, 0).unwrap_err();
        assert_eq!(err, PlanningError::NonFiniteConfiguration { index: 0 });

        let q = DVector::from_vec(vec![0.0, f64::NEG_INFINITY]);
        let err = collider.evaluate_waypoint(&q).unwrap_err();
        assert_eq!(err, PlanningError::NonFiniteConfiguration { index: 1 });
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut collider = collider(CollisionConfig::default());
        let err = collider.set_configuration(&DVector::zeros(3)).unwrap_err();
        assert_eq!(err, PlanningError::DimensionMismatch { expected: 2, actual: 3 });
    }

    #[test]
    fn test_inactive_sphere_index_out_of_range() {
        let collider = collider(CollisionConfig::default());
        assert_eq!(collider.num_bodies(), 1);
        let err = collider.evaluate_sphere(1).unwrap_err();
        assert_eq!(err, PlanningError::SphereIndexOutOfRange { index: 1, count: 1 });
    }

    #[test]
    fn test_invalid_config_rejected() {
        let arm = SerialChain::builder()
            .revolute("link", None, Isometry3::identity(), Vector3::z_axis())
            .build()
            .unwrap();
        let config = CollisionConfig::default()
            .with_weights(CostWeights::default().with_epsilon(0.0));
        let result = SphereCollider::new(arm, SphereSet::default(), AdjacencySet::new(), config);
        assert!(result.is_err());
    }

    #[test]
    fn test_evaluate_waypoint() {
        let mut collider = collider(CollisionConfig::default());
        let results = collider.evaluate_waypoint(&DVector::zeros(2)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].dx_dq.shape(), (3, 2));
        let total = collider.waypoint_cost(&DVector::zeros(2)).unwrap();
        assert_relative_eq!(total, results[0].cost);
    }
}
