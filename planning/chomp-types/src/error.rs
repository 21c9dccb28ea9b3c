//! Error types for trajectory planning setup and collision evaluation.
//!
//! This module defines the [`PlanningError`] enum. Every variant is a setup or
//! contract failure that must be surfaced to the caller before (or instead of)
//! running the optimizer. Numeric degeneracies inside the cost engine are not
//! errors; they are handled locally with a fallback value.

/// Result type for planning operations.
pub type PlanningResult<T> = Result<T, PlanningError>;

/// Errors that can occur while setting up or evaluating a planning problem.
///
/// # Example
///
/// ```
/// use chomp_types::PlanningError;
///
/// let error = PlanningError::DimensionMismatch { expected: 7, actual: 6 };
/// assert!(error.to_string().contains("dimension mismatch"));
/// assert!(error.is_configuration_error());
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PlanningError {
    /// The joint padding fraction is outside `[0, 0.5)`.
    ///
    /// Padding of one half or more would make the padded lower limit exceed
    /// the padded upper limit.
    #[error("joint padding must be in [0, 0.5), got {0}")]
    InvalidPadding(f64),

    /// A seed trajectory was requested with zero interior waypoints.
    #[error("waypoint count must be positive")]
    ZeroWaypoints,

    /// Two vectors that must share a dimension do not.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The expected dimension.
        expected: usize,
        /// The dimension that was provided.
        actual: usize,
    },

    /// Raw joint limits are inverted or not finite.
    #[error("invalid limits for joint {index}: [{lower}, {upper}]")]
    InvalidLimits {
        /// Index of the offending joint.
        index: usize,
        /// Lower limit.
        lower: f64,
        /// Upper limit.
        upper: f64,
    },

    /// An invalid configuration parameter was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sphere metadata references a link the kinematic model does not have.
    #[error("link {name} does not exist")]
    UnknownLink {
        /// Name of the missing link.
        name: String,
    },

    /// A configuration vector handed to the engine contains `NaN` or an
    /// infinity.
    #[error("configuration value {index} is not finite")]
    NonFiniteConfiguration {
        /// Index of the first offending component.
        index: usize,
    },

    /// A sphere index outside the active sphere range was requested.
    #[error("sphere index {index} out of range for {count} active spheres")]
    SphereIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of active spheres.
        count: usize,
    },
}

impl PlanningError {
    /// Creates an invalid configuration error with the given message.
    ///
    /// # Example
    ///
    /// ```
    /// use chomp_types::PlanningError;
    ///
    /// let error = PlanningError::invalid_config("epsilon must be positive");
    /// assert!(error.to_string().contains("epsilon"));
    /// ```
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Creates an unknown link error.
    #[must_use]
    pub fn unknown_link(name: impl Into<String>) -> Self {
        Self::UnknownLink { name: name.into() }
    }

    /// Returns `true` if this error is a configuration error that must be
    /// fixed before optimization starts.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPadding(_)
                | Self::ZeroWaypoints
                | Self::DimensionMismatch { .. }
                | Self::InvalidLimits { .. }
                | Self::InvalidConfig(_)
                | Self::UnknownLink { .. }
        )
    }

    /// Returns `true` if this error reports a caller contract violation
    /// during evaluation.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::NonFiniteConfiguration { .. } | Self::SphereIndexOutOfRange { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_padding_display() {
        let error = PlanningError::InvalidPadding(0.6);
        let msg = error.to_string();
        assert!(msg.contains("padding"));
        assert!(msg.contains("0.6"));
    }

    #[test]
    fn test_zero_waypoints_display() {
        assert!(
            PlanningError::ZeroWaypoints
                .to_string()
                .contains("waypoint count")
        );
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let error = PlanningError::DimensionMismatch {
            expected: 7,
            actual: 3,
        };
        let msg = error.to_string();
        assert!(msg.contains("expected 7"));
        assert!(msg.contains("got 3"));
    }

    #[test]
    fn test_unknown_link_helper() {
        let error = PlanningError::unknown_link("/right/wam7");
        assert!(matches!(&error, PlanningError::UnknownLink { name } if name == "/right/wam7"));
        assert!(error.to_string().contains("/right/wam7"));
    }

    #[test]
    fn test_invalid_config_helper() {
        let error = PlanningError::invalid_config("bad epsilon");
        assert!(matches!(error, PlanningError::InvalidConfig(msg) if msg == "bad epsilon"));
    }

    #[test]
    fn test_error_classification() {
        assert!(PlanningError::ZeroWaypoints.is_configuration_error());
        assert!(PlanningError::InvalidPadding(0.5).is_configuration_error());
        assert!(!PlanningError::ZeroWaypoints.is_contract_violation());

        let nan = PlanningError::NonFiniteConfiguration { index: 2 };
        assert!(nan.is_contract_violation());
        assert!(nan.to_string().contains("not finite"));
        assert!(!nan.is_configuration_error());

        let range = PlanningError::SphereIndexOutOfRange { index: 9, count: 4 };
        assert!(range.is_contract_violation());
    }
}
