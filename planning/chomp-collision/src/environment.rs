//! Environment collision channel.
//!
//! Scores a sphere against the static obstacles described by one or more
//! distance fields. Only the closest field counts: the sphere's clearance is
//! the minimum field distance at its center minus its radius, fed through
//! [`smoothed_cost`] with the environment smoothing radius.

use std::sync::Arc;

use chomp_types::Sphere;
use nalgebra::{Point3, Vector3};

use crate::field::{DistanceField, nearest};
use crate::potential::{PotentialSample, smoothed_cost};

/// Evaluates environment cost for individual spheres.
#[derive(Clone)]
pub struct EnvironmentEvaluator {
    fields: Vec<Arc<dyn DistanceField>>,
    epsilon: f64,
}

impl std::fmt::Debug for EnvironmentEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentEvaluator")
            .field("fields", &self.fields.len())
            .field("epsilon", &self.epsilon)
            .finish()
    }
}

impl EnvironmentEvaluator {
    /// Creates an evaluator with smoothing radius `epsilon` and no fields.
    #[must_use]
    pub const fn new(epsilon: f64) -> Self {
        Self {
            fields: Vec::new(),
            epsilon,
        }
    }

    /// Adds a distance field.
    #[must_use]
    pub fn with_field(mut self, field: Arc<dyn DistanceField>) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds several distance fields.
    #[must_use]
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Arc<dyn DistanceField>>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Number of registered fields.
    #[must_use]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Smoothing radius.
    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Cost and workspace gradient of `sphere` centered at `center`.
    ///
    /// With no fields, or when the sphere clears every obstacle by more than
    /// the smoothing radius, the cost and gradient are both zero.
    #[must_use]
    pub fn evaluate(&self, sphere: &Sphere, center: &Point3<f64>) -> PotentialSample {
        let Some(sample) = nearest(&self.fields, center) else {
            return PotentialSample {
                cost: 0.0,
                gradient: Vector3::zeros(),
            };
        };

        let clearance = sample.distance - sphere.radius();
        let potential = smoothed_cost(clearance, self.epsilon, sample.gradient);
        PotentialSample {
            cost: potential.cost,
            gradient: potential.effective_gradient(),
        }
    }
}
