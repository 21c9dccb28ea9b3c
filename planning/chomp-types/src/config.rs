//! Configuration types for collision cost evaluation and planning runs.
//!
//! # Example
//!
//! ```
//! use chomp_types::{CollisionConfig, CostWeights, RunConfig};
//!
//! let config = RunConfig::default()
//!     .with_waypoints(49)
//!     .with_joint_padding(0.01)
//!     .with_collision(
//!         CollisionConfig::default()
//!             .with_weights(CostWeights::default().with_epsilon(0.2))
//!             .with_self_collision(false),
//!     );
//!
//! assert!(config.validate().is_empty());
//! ```

use crate::error::{PlanningError, PlanningResult};

/// Default self-cost threshold below which the self-collision branch of the
/// gradient combination is skipped.
pub const DEFAULT_SELF_COST_THRESHOLD: f64 = 1e-7;

/// Weights and smoothing radii of the obstacle cost.
///
/// `epsilon` and `epsilon_self` are the distances at which the environment and
/// self-collision costs start to rise. `obs_factor` and `obs_factor_self`
/// balance the two channels in the aggregate cost and gradient.
///
/// # Example
///
/// ```
/// use chomp_types::CostWeights;
///
/// let weights = CostWeights::default()
///     .with_epsilon(0.05)
///     .with_obs_factor(1.0)
///     .with_obs_factor_self(0.0);
///
/// assert!((weights.epsilon() - 0.05).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostWeights {
    /// Smoothing radius of the environment cost.
    epsilon: f64,
    /// Smoothing radius of the self-collision cost.
    epsilon_self: f64,
    /// Weight of the environment cost.
    obs_factor: f64,
    /// Weight of the self-collision cost.
    obs_factor_self: f64,
}

impl CostWeights {
    /// Creates cost weights with default settings.
    ///
    /// Defaults:
    /// - `epsilon`: 0.1
    /// - `epsilon_self`: 0.04
    /// - `obs_factor`: 0.7
    /// - `obs_factor_self`: 0.3
    #[must_use]
    pub const fn new() -> Self {
        Self {
            epsilon: 0.1,
            epsilon_self: 0.04,
            obs_factor: 0.7,
            obs_factor_self: 0.3,
        }
    }

    /// Sets the environment smoothing radius.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the self-collision smoothing radius.
    #[must_use]
    pub const fn with_epsilon_self(mut self, epsilon_self: f64) -> Self {
        self.epsilon_self = epsilon_self;
        self
    }

    /// Sets the environment cost weight.
    #[must_use]
    pub const fn with_obs_factor(mut self, factor: f64) -> Self {
        self.obs_factor = factor;
        self
    }

    /// Sets the self-collision cost weight.
    #[must_use]
    pub const fn with_obs_factor_self(mut self, factor: f64) -> Self {
        self.obs_factor_self = factor;
        self
    }

    /// Returns the environment smoothing radius.
    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the self-collision smoothing radius.
    #[must_use]
    pub const fn epsilon_self(&self) -> f64 {
        self.epsilon_self
    }

    /// Returns the environment cost weight.
    #[must_use]
    pub const fn obs_factor(&self) -> f64 {
        self.obs_factor
    }

    /// Returns the self-collision cost weight.
    #[must_use]
    pub const fn obs_factor_self(&self) -> f64 {
        self.obs_factor_self
    }

    /// Validates the weights.
    ///
    /// Returns a list of validation issues. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            issues.push(format!("epsilon must be positive, got {}", self.epsilon));
        }
        if !(self.epsilon_self.is_finite() && self.epsilon_self > 0.0) {
            issues.push(format!(
                "epsilon_self must be positive, got {}",
                self.epsilon_self
            ));
        }
        if !(self.obs_factor.is_finite() && self.obs_factor >= 0.0) {
            issues.push(format!(
                "obs_factor must be non-negative, got {}",
                self.obs_factor
            ));
        }
        if !(self.obs_factor_self.is_finite() && self.obs_factor_self >= 0.0) {
            issues.push(format!(
                "obs_factor_self must be non-negative, got {}",
                self.obs_factor_self
            ));
        }

        issues
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of the sphere collision cost engine.
///
/// Either collision channel can be switched off; a disabled channel
/// contributes zero cost and zero gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionConfig {
    /// Cost weights and smoothing radii.
    weights: CostWeights,
    /// Whether to evaluate distance-field (environment) collisions.
    environment_collision: bool,
    /// Whether to evaluate sphere-sphere self-collisions.
    self_collision: bool,
    /// Self-collision cost below which the self branch of the gradient is skipped.
    self_cost_threshold: f64,
}

impl CollisionConfig {
    /// Creates a collision configuration with both channels enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            weights: CostWeights::new(),
            environment_collision: true,
            self_collision: true,
            self_cost_threshold: DEFAULT_SELF_COST_THRESHOLD,
        }
    }

    /// Sets the cost weights.
    #[must_use]
    pub const fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Enables or disables environment collision checking.
    #[must_use]
    pub const fn with_environment_collision(mut self, enable: bool) -> Self {
        self.environment_collision = enable;
        self
    }

    /// Enables or disables self-collision checking.
    #[must_use]
    pub const fn with_self_collision(mut self, enable: bool) -> Self {
        self.self_collision = enable;
        self
    }

    /// Sets the self-cost threshold guarding the division by the self cost.
    #[must_use]
    pub const fn with_self_cost_threshold(mut self, threshold: f64) -> Self {
        self.self_cost_threshold = threshold;
        self
    }

    /// Returns the cost weights.
    #[must_use]
    pub const fn weights(&self) -> &CostWeights {
        &self.weights
    }

    /// Returns whether environment collision checking is enabled.
    #[must_use]
    pub const fn environment_collision(&self) -> bool {
        self.environment_collision
    }

    /// Returns whether self-collision checking is enabled.
    #[must_use]
    pub const fn self_collision(&self) -> bool {
        self.self_collision
    }

    /// Returns the self-cost threshold.
    #[must_use]
    pub const fn self_cost_threshold(&self) -> f64 {
        self.self_cost_threshold
    }

    /// Validates the configuration.
    ///
    /// Returns a list of validation issues. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.weights.validate();

        if !(self.self_cost_threshold.is_finite() && self.self_cost_threshold >= 0.0) {
            issues.push(format!(
                "self_cost_threshold must be non-negative, got {}",
                self.self_cost_threshold
            ));
        }

        issues
    }

    /// Validates the configuration, converting the first issue into an error.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::InvalidConfig`] if validation finds any issue.
    pub fn validated(self) -> PlanningResult<Self> {
        into_result(self, self.validate())
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of one planning run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Number of interior waypoints of the seed trajectory.
    waypoints: usize,
    /// Fraction of each joint range trimmed from both ends.
    joint_padding: f64,
    /// Collision engine configuration.
    collision: CollisionConfig,
}

impl RunConfig {
    /// Creates a run configuration with default settings.
    ///
    /// Defaults:
    /// - Waypoints: 99
    /// - Joint padding: 0.001
    /// - Collision: [`CollisionConfig::default`]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            waypoints: 99,
            joint_padding: 0.001,
            collision: CollisionConfig::new(),
        }
    }

    /// Sets the number of interior waypoints.
    #[must_use]
    pub const fn with_waypoints(mut self, waypoints: usize) -> Self {
        self.waypoints = waypoints;
        self
    }

    /// Sets the joint padding fraction.
    #[must_use]
    pub const fn with_joint_padding(mut self, padding: f64) -> Self {
        self.joint_padding = padding;
        self
    }

    /// Sets the collision engine configuration.
    #[must_use]
    pub const fn with_collision(mut self, collision: CollisionConfig) -> Self {
        self.collision = collision;
        self
    }

    /// Returns the number of interior waypoints.
    #[must_use]
    pub const fn waypoints(&self) -> usize {
        self.waypoints
    }

    /// Returns the joint padding fraction.
    #[must_use]
    pub const fn joint_padding(&self) -> f64 {
        self.joint_padding
    }

    /// Returns the collision engine configuration.
    #[must_use]
    pub const fn collision(&self) -> &CollisionConfig {
        &self.collision
    }

    /// Validates the configuration.
    ///
    /// Returns a list of validation issues. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.waypoints == 0 {
            issues.push("waypoints must be positive".to_string());
        }
        if !(0.0..0.5).contains(&self.joint_padding) {
            issues.push(format!(
                "joint_padding must be in [0, 0.5), got {}",
                self.joint_padding
            ));
        }
        issues.extend(self.collision.validate());

        issues
    }

    /// Validates the configuration, converting the first issue into an error.
    ///
    /// Padding and waypoint problems map to their dedicated error variants.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::ZeroWaypoints`], [`PlanningError::InvalidPadding`]
    /// or [`PlanningError::InvalidConfig`].
    pub fn validated(self) -> PlanningResult<Self> {
        if self.waypoints == 0 {
            return Err(PlanningError::ZeroWaypoints);
        }
        if !(0.0..0.5).contains(&self.joint_padding) {
            return Err(PlanningError::InvalidPadding(self.joint_padding));
        }
        self.collision.validated()?;
        Ok(self)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn into_result<T>(value: T, issues: Vec<String>) -> PlanningResult<T> {
    match issues.into_iter().next() {
        Some(issue) => Err(PlanningError::InvalidConfig(issue)),
        None => Ok(value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_weights_defaults() {
        let weights = CostWeights::default();
        assert!((weights.epsilon() - 0.1).abs() < 1e-12);
        assert!((weights.epsilon_self() - 0.04).abs() < 1e-12);
        assert!((weights.obs_factor() - 0.7).abs() < 1e-12);
        assert!((weights.obs_factor_self() - 0.3).abs() < 1e-12);
        assert!(weights.validate().is_empty());
    }

    #[test]
    fn test_zero_epsilon_rejected() {
        let weights = CostWeights::default().with_epsilon(0.0);
        let issues = weights.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("epsilon"));
    }

    #[test]
    fn test_negative_factor_rejected() {
        let weights = CostWeights::default()
            .with_obs_factor(-1.0)
            .with_obs_factor_self(f64::NAN);
        assert_eq!(weights.validate().len(), 2);
    }

    #[test]
    fn test_collision_config_toggles() {
        let config = CollisionConfig::default()
            .with_environment_collision(false)
            .with_self_collision(false);
        assert!(!config.environment_collision());
        assert!(!config.self_collision());
        assert!((config.self_cost_threshold() - DEFAULT_SELF_COST_THRESHOLD).abs() < 1e-20);
    }

    #[test]
    fn test_collision_config_validated() {
        let bad = CollisionConfig::default()
            .with_weights(CostWeights::default().with_epsilon_self(-0.1));
        let err = bad.validated().unwrap_err();
        assert!(matches!(err, PlanningError::InvalidConfig(msg) if msg.contains("epsilon_self")));

        assert!(CollisionConfig::default().validated().is_ok());
    }

    #[test]
    fn test_run_config_padding_bounds() {
        assert!(RunConfig::default().with_joint_padding(0.0).validate().is_empty());
        assert!(RunConfig::default().with_joint_padding(0.49).validate().is_empty());
        assert_eq!(RunConfig::default().with_joint_padding(0.5).validate().len(), 1);

        let err = RunConfig::default()
            .with_joint_padding(0.5)
            .validated()
            .unwrap_err();
        assert_eq!(err, PlanningError::InvalidPadding(0.5));
    }

    #[test]
    fn test_run_config_zero_waypoints() {
        let err = RunConfig::default().with_waypoints(0).validated().unwrap_err();
        assert_eq!(err, PlanningError::ZeroWaypoints);
    }

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::new()
            .with_waypoints(10)
            .with_joint_padding(0.1)
            .with_collision(CollisionConfig::default().with_self_cost_threshold(1e-6));
        assert_eq!(config.waypoints(), 10);
        assert!((config.joint_padding() - 0.1).abs() < 1e-12);
        assert!((config.collision().self_cost_threshold() - 1e-6).abs() < 1e-18);
        assert!(config.validated().is_ok());
    }
}
