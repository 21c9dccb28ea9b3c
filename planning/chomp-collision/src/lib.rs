//! Sphere-based collision cost and gradient engine.
//!
//! The robot (and anything it holds) is approximated by spheres rigidly
//! attached to kinematic links. For each waypoint of a trajectory and each
//! active sphere, the engine returns a smoothed obstacle cost, its workspace
//! gradient and the configuration-space gradient matrix an optimizer needs.
//!
//! # Pipeline
//!
//! 1. [`SphereModelBuilder`] resolves sphere metadata against a
//!    [`KinematicModel`] into an immutable [`chomp_types::SphereSet`].
//! 2. [`SphereCollider`] applies a configuration once per waypoint.
//! 3. For each active sphere it combines:
//!    - [`EnvironmentEvaluator`]: clearance against [`DistanceField`]s
//!    - [`SelfCollisionEvaluator`]: clearance against the other spheres
//! 4. Both channels pass clearances through [`smoothed_cost`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use chomp_collision::{
//!     GridDistanceField, SerialChain, SphereCollider, SphereModelBuilder,
//! };
//! use chomp_types::{CollisionConfig, SphereSpec};
//! use nalgebra::{DVector, Isometry3, Point3, Vector3};
//!
//! // A planar arm above a floor at z = 0.
//! let arm = SerialChain::builder()
//!     .fixed("base", None, Isometry3::translation(0.0, 0.0, 0.5))
//!     .revolute("shoulder", Some(0), Isometry3::identity(), Vector3::y_axis())
//!     .build()
//!     .unwrap();
//! let spheres = SphereModelBuilder::new(&arm)
//!     .with_robot_sphere(SphereSpec::new("shoulder", Point3::new(0.4, 0.0, 0.0), 0.1))
//!     .build()
//!     .unwrap();
//! let floor = GridDistanceField::from_fn(
//!     [11, 11, 11],
//!     0.1,
//!     Point3::new(-0.5, -0.5, 0.0),
//!     |p| p.z,
//! )
//! .unwrap();
//!
//! let adjacency = arm.adjacency();
//! let mut collider = SphereCollider::new(arm, spheres, adjacency, CollisionConfig::default())
//!     .unwrap()
//!     .with_field(Arc::new(floor));
//!
//! // Level: far above the floor.
//! assert_eq!(collider.waypoint_cost(&DVector::zeros(1)).unwrap(), 0.0);
//!
//! // Pitched down a little over a right angle: the sphere dips into the floor.
//! let down = DVector::from_vec(vec![1.6]);
//! assert!(collider.waypoint_cost(&down).unwrap() > 0.0);
//! ```
//!
//! # Concurrency
//!
//! Applying a configuration mutates the kinematic model, so one
//! [`SphereCollider`] evaluates one waypoint at a time. Distance fields are
//! shared through `Arc` and can back several colliders at once.

#![doc(html_root_url = "https://docs.rs/chomp-collision/0.7.0")]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

pub mod collider;
pub mod environment;
pub mod field;
pub mod kinematics;
pub mod model;
pub mod potential;
pub mod self_collision;

// Re-export main types at crate root for convenience
pub use collider::{CostOracle, SphereCollider, SphereGradient, WORKSPACE_DIM};
pub use environment::EnvironmentEvaluator;
pub use field::{DistanceField, DistanceSample, GridDistanceField, SphereObstacle, nearest};
pub use kinematics::{ChainLink, Joint, KinematicModel, SerialChain, SerialChainBuilder};
pub use model::{GrabbedBody, SphereModelBuilder};
pub use potential::{PotentialSample, smoothed_cost};
pub use self_collision::SelfCollisionEvaluator;
