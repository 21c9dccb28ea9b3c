//! Core types for sphere-based trajectory optimization.
//!
//! This crate provides the data model shared by the collision cost engine and
//! the optimizer that consumes it:
//!
//! - **Spheres**: collision primitives attached to kinematic links and the
//!   ordered active/inactive set ([`Sphere`], [`SphereSpec`], [`SphereSet`])
//! - **Adjacency**: link pairs exempt from self-collision ([`AdjacencySet`])
//! - **Configuration**: cost weights and run settings ([`CostWeights`],
//!   [`CollisionConfig`], [`RunConfig`])
//! - **Limits**: padding and clamping of joint limits ([`JointLimits`])
//! - **Trajectories**: seed construction and limit audits ([`Trajectory`])
//! - **Setup**: validated problems ready for optimization ([`PlanningProblem`])
//!
//! # Example
//!
//! ```
//! use chomp_types::{JointLimits, PlanningProblem, RunConfig, Trajectory};
//! use nalgebra::DVector;
//!
//! let limits = JointLimits::from_pairs(&[(-1.0, 1.0), (-1.0, 1.0)]).unwrap();
//! let problem = PlanningProblem::new(
//!     RunConfig::default().with_waypoints(10),
//!     limits,
//!     DVector::from_vec(vec![-0.5, 0.0]),
//!     DVector::from_vec(vec![0.5, 0.5]),
//! )
//! .unwrap();
//!
//! assert_eq!(problem.seed().len(), 10);
//! assert!(problem.seed().is_within(problem.padded_limits()));
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization for configuration and data types

#![doc(html_root_url = "https://docs.rs/chomp-types/0.7.0")]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

pub mod adjacency;
pub mod config;
pub mod error;
pub mod limits;
pub mod problem;
pub mod sphere;
pub mod trajectory;

// Re-export main types at crate root for convenience
pub use adjacency::AdjacencySet;
pub use config::{CollisionConfig, CostWeights, DEFAULT_SELF_COST_THRESHOLD, RunConfig};
pub use error::{PlanningError, PlanningResult};
pub use limits::JointLimits;
pub use problem::PlanningProblem;
pub use sphere::{BodyId, Sphere, SphereSet, SphereSpec};
pub use trajectory::Trajectory;
