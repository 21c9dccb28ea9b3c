//! Self collision channel.
//!
//! Scores one active sphere against every other sphere of the robot and its
//! grabbed bodies. A pair is skipped when:
//!
//! - it is the sphere itself,
//! - both spheres hang off the same link, or
//! - both spheres belong to the same body and their links are adjacent.
//!
//! Pair clearance is the center distance minus both radii, smoothed with the
//! self-collision radius. Every costly pair also contributes the Jacobian of
//! the *other* sphere's center, weighted by the pair cost, to an accumulator
//! the caller uses to correct the joint-space gradient for the fact that
//! both spheres move.

use std::sync::Arc;

use chomp_types::{AdjacencySet, SphereSet};
use nalgebra::{DMatrix, Point3, Vector3};
use tracing::warn;

use crate::kinematics::KinematicModel;
use crate::potential::{PotentialSample, smoothed_cost};

/// Center distance below which two spheres are treated as coincident.
const COINCIDENT_DISTANCE: f64 = 1e-12;

/// Evaluates self-collision cost for individual spheres.
#[derive(Debug, Clone)]
pub struct SelfCollisionEvaluator {
    adjacency: Arc<AdjacencySet>,
    epsilon_self: f64,
}

impl SelfCollisionEvaluator {
    /// Creates an evaluator with the given adjacency and smoothing radius.
    #[must_use]
    pub const fn new(adjacency: Arc<AdjacencySet>, epsilon_self: f64) -> Self {
        Self {
            adjacency,
            epsilon_self,
        }
    }

    /// The link pairs exempt from same-body collision.
    #[must_use]
    pub fn adjacency(&self) -> &AdjacencySet {
        &self.adjacency
    }

    /// Smoothing radius.
    #[must_use]
    pub const fn epsilon_self(&self) -> f64 {
        self.epsilon_self
    }

    /// Cost and workspace gradient of sphere `body_index` centered at `center`.
    ///
    /// `model` must already hold the configuration being evaluated. The
    /// weighted Jacobians of the other spheres in every costly pair are added
    /// to `jacobian_acc`, which must be `3 × dof`.
    ///
    /// Returns a zero sample if `body_index` is not in `spheres`.
    pub fn evaluate<K: KinematicModel + ?Sized>(
        &self,
        model: &K,
        spheres: &SphereSet,
        body_index: usize,
        center: &Point3<f64>,
        jacobian_acc: &mut DMatrix<f64>,
    ) -> PotentialSample {
        let mut total = PotentialSample {
            cost: 0.0,
            gradient: Vector3::zeros(),
        };
        let Some(sphere) = spheres.get(body_index) else {
            return total;
        };

        for (index, other) in spheres.iter() {
            if index == body_index || sphere.shares_link(other) {
                continue;
            }
            if sphere.body() == other.body()
                && self.adjacency.are_adjacent(sphere.link(), other.link())
            {
                continue;
            }

            let other_center = model.world_point(other.link(), other.pose());
            let diff = center - other_center;
            let dist = diff.norm();
            let direction = if dist < COINCIDENT_DISTANCE {
                warn!(
                    "Spheres {} and {} have coincident centers, using +Z as separation direction",
                    body_index, index
                );
                Vector3::z()
            } else {
                diff / dist
            };

            let clearance = dist - sphere.radius() - other.radius();
            let pair = smoothed_cost(clearance, self.epsilon_self, direction);
            if pair.is_free() {
                continue;
            }

            *jacobian_acc += model.jacobian(other.link(), &other_center) * pair.cost;
            total.cost += pair.cost;
            total.gradient += pair.gradient * pair.cost;
        }

        total
    }
}
