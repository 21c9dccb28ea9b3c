//! Sphere model build pass.
//!
//! Resolves per-body sphere metadata against the kinematic model once, before
//! optimization starts, and produces the immutable [`SphereSet`] the cost
//! engine indexes into:
//!
//! 1. Robot spheres are attached to the robot link they name.
//! 2. Spheres of grabbed bodies are attached to the robot link holding the
//!    body, with their center re-expressed in that link's frame. The
//!    resolved sphere carries the grabbing link's name and index.
//! 3. A sphere is active iff at least one active degree of freedom moves its
//!    link; active spheres come first in the resulting set.

use chomp_types::{BodyId, PlanningError, PlanningResult, Sphere, SphereSet, SphereSpec};
use hashbrown::HashMap;
use nalgebra::Isometry3;
use tracing::{debug, info, warn};

use crate::kinematics::KinematicModel;

/// A body held by the robot, with its sphere metadata.
#[derive(Debug, Clone)]
pub struct GrabbedBody {
    /// Identifier of the grabbed body (must not be [`BodyId::ROBOT`]).
    pub id: BodyId,
    /// Name of the robot link holding the body.
    pub grabbing_link: String,
    /// World transforms of the body's links at the current configuration.
    pub link_transforms: HashMap<String, Isometry3<f64>>,
    /// Sphere metadata, expressed in the body's own link frames.
    pub spheres: Vec<SphereSpec>,
}

impl GrabbedBody {
    /// Creates a grabbed body held by `grabbing_link`.
    #[must_use]
    pub fn new(id: BodyId, grabbing_link: impl Into<String>) -> Self {
        Self {
            id,
            grabbing_link: grabbing_link.into(),
            link_transforms: HashMap::new(),
            spheres: Vec::new(),
        }
    }

    /// Records the world transform of one of the body's links.
    #[must_use]
    pub fn with_link(mut self, name: impl Into<String>, transform: Isometry3<f64>) -> Self {
        self.link_transforms.insert(name.into(), transform);
        self
    }

    /// Adds sphere metadata.
    #[must_use]
    pub fn with_sphere(mut self, sphere: SphereSpec) -> Self {
        self.spheres.push(sphere);
        self
    }
}

/// Builds the [`SphereSet`] for one optimization run.
///
/// # Example
///
/// ```
/// use chomp_collision::{KinematicModel, SerialChain, SphereModelBuilder};
/// use chomp_types::SphereSpec;
/// use nalgebra::{Isometry3, Point3, Vector3};
///
/// let arm = SerialChain::builder()
///     .fixed("base", None, Isometry3::identity())
///     .revolute("link1", Some(0), Isometry3::identity(), Vector3::z_axis())
///     .build()
///     .unwrap();
///
/// let spheres = SphereModelBuilder::new(&arm)
///     .with_robot_sphere(SphereSpec::new("base", Point3::origin(), 0.2))
///     .with_robot_sphere(SphereSpec::new("link1", Point3::new(0.5, 0.0, 0.0), 0.1))
///     .build()
///     .unwrap();
///
/// assert_eq!(spheres.num_active(), 1);
/// assert_eq!(spheres.num_inactive(), 1);
/// ```
#[derive(Debug)]
pub struct SphereModelBuilder<'a, K> {
    model: &'a K,
    robot: Vec<SphereSpec>,
    grabbed: Vec<GrabbedBody>,
}

impl<'a, K: KinematicModel> SphereModelBuilder<'a, K> {
    /// Creates a builder resolving against `model` at its current configuration.
    #[must_use]
    pub const fn new(model: &'a K) -> Self {
        Self {
            model,
            robot: Vec::new(),
            grabbed: Vec::new(),
        }
    }

    /// Adds one robot sphere.
    #[must_use]
    pub fn with_robot_sphere(mut self, sphere: SphereSpec) -> Self {
        self.robot.push(sphere);
        self
    }

    /// Adds robot spheres.
    #[must_use]
    pub fn with_robot_spheres(mut self, spheres: impl IntoIterator<Item = SphereSpec>) -> Self {
        self.robot.extend(spheres);
        self
    }

    /// Adds a grabbed body.
    #[must_use]
    pub fn with_grabbed(mut self, body: GrabbedBody) -> Self {
        self.grabbed.push(body);
        self
    }

    fn resolve_link(&self, name: &str) -> PlanningResult<usize> {
        self.model
            .link_index(name)
            .ok_or_else(|| PlanningError::unknown_link(name))
    }

    /// Resolves all metadata and classifies the spheres.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::UnknownLink`] if a robot sphere or grabbing
    /// link names a link the model does not have, or if a grabbed-body sphere
    /// names a link of the body whose transform was not recorded. Returns
    /// [`PlanningError::InvalidConfig`] if a grabbed body uses the robot's id
    /// or a sphere has a negative or non-finite radius.
    pub fn build(self) -> PlanningResult<SphereSet> {
        let mut resolved = Vec::with_capacity(self.robot.len());

        for spec in &self.robot {
            check_radius(spec)?;
            let link = self.resolve_link(&spec.link_name)?;
            resolved.push(Sphere::new(
                BodyId::ROBOT,
                spec.link_name.clone(),
                link,
                spec.position,
                spec.radius,
            ));
        }

        for body in &self.grabbed {
            if body.id.is_robot() {
                return Err(PlanningError::invalid_config(
                    "grabbed body cannot use the robot's body id",
                ));
            }
            if body.spheres.is_empty() {
                warn!("Grabbed body {:?} has no sphere metadata, skipping", body.id);
                continue;
            }

            let link = self.resolve_link(&body.grabbing_link)?;
            let to_grabber = self.model.link_transform(link).inverse();

            for spec in &body.spheres {
                check_radius(spec)?;
                let body_link = body
                    .link_transforms
                    .get(&spec.link_name)
                    .ok_or_else(|| PlanningError::unknown_link(spec.link_name.clone()))?;
                let pose = to_grabber * body_link * spec.position;
                debug!(
                    "Grabbed body {:?}: sphere on {} attached to {}",
                    body.id, spec.link_name, body.grabbing_link
                );
                resolved.push(Sphere::new(
                    body.id,
                    body.grabbing_link.clone(),
                    link,
                    pose,
                    spec.radius,
                ));
            }
        }

        let (active, inactive): (Vec<_>, Vec<_>) = resolved
            .into_iter()
            .partition(|sphere| self.model.is_link_active(sphere.link()));

        for (index, sphere) in active.iter().chain(inactive.iter()).enumerate() {
            debug!(
                "Sphere {}: body {:?}, link {} ({}), radius {:.3}, {}",
                index,
                sphere.body(),
                sphere.link_name(),
                sphere.link(),
                sphere.radius(),
                if index < active.len() { "active" } else { "inactive" }
            );
        }
        info!(
            "Sphere model: {} active, {} inactive",
            active.len(),
            inactive.len()
        );

        Ok(SphereSet::new(active, inactive))
    }
}

fn check_radius(spec: &SphereSpec) -> PlanningResult<()> {
    if spec.radius.is_finite() && spec.radius >= 0.0 {
        Ok(())
    } else {
        Err(PlanningError::invalid_config(format!(
            "sphere on link {} has invalid radius {}",
            spec.link_name, spec.radius
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kinematics::SerialChain;
    use approx::assert_relative_eq;
    use nalgebra::{DVector, Point3, Vector3};
    use std::f64::consts::FRAC_PI_2;

    fn arm() -> SerialChain {
        SerialChain::builder()
            .fixed("base", None, Isometry3::identity())
            .revolute("upper", Some(0), Isometry3::identity(), Vector3::z_axis())
            .revolute("fore", Some(1), Isometry3::translation(1.0, 0.0, 0.0), Vector3::z_axis())
            .build()
            .unwrap()
    }

    #[test]
    fn test_classification_puts_active_first() {
        let arm = arm();
        let set = SphereModelBuilder::new(&arm)
            .with_robot_spheres([
                SphereSpec::new("base", Point3::origin(), 0.2),
                SphereSpec::new("fore", Point3::new(0.5, 0.0, 0.0), 0.1),
                SphereSpec::new("upper", Point3::new(0.5, 0.0, 0.0), 0.1),
            ])
            .build()
            .unwrap();

        assert_eq!(set.num_active(), 2);
        assert_eq!(set.get(0).unwrap().link_name(), "fore");
        assert_eq!(set.get(1).unwrap().link_name(), "upper");
        assert_eq!(set.get(2).unwrap().link_name(), "base");
        assert!(set.iter().all(|(_, s)| s.body() == BodyId::ROBOT));
    }

    #[test]
    fn test_unknown_link() {
        let arm = arm();
        let err = SphereModelBuilder::new(&arm)
            .with_robot_sphere(SphereSpec::new("wrist", Point3::origin(), 0.1))
            .build()
            .unwrap_err();
        assert_eq!(err, PlanningError::unknown_link("wrist"));
    }

    #[test]
    fn test_invalid_radius() {
        let arm = arm();
        let err = SphereModelBuilder::new(&arm)
            .with_robot_sphere(SphereSpec::new("base", Point3::origin(), -0.1))
            .build()
            .unwrap_err();
        assert!(matches!(err, PlanningError::InvalidConfig(_)));
    }

    #[test]
    fn test_grabbed_body_pose_normalized_into_grabber_frame() {
        let mut arm = arm();
        arm.apply_configuration(&DVector::from_vec(vec![FRAC_PI_2, 0.0])).unwrap();
        // The fore link sits at (0, 1, 0), rotated a quarter turn.

        let cup = GrabbedBody::new(BodyId(1), "fore")
            .with_link("cup", Isometry3::translation(0.0, 1.5, 0.0))
            .with_sphere(SphereSpec::new("cup", Point3::new(0.0, 0.0, 0.1), 0.05));

        let set = SphereModelBuilder::new(&arm).with_grabbed(cup).build().unwrap();
        assert_eq!(set.num_active(), 1);

        let sphere = set.get(0).unwrap();
        assert_eq!(sphere.body(), BodyId(1));
        assert_eq!(sphere.link(), 2);
        assert_eq!(sphere.link_name(), "fore");
        assert_eq!(arm.link_index(sphere.link_name()), Some(sphere.link()));
        assert_relative_eq!(sphere.pose().x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(sphere.pose().y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(sphere.pose().z, 0.1, epsilon = 1e-12);

        // Re-expressed pose maps back to the recorded world position.
        let world = arm.world_point(sphere.link(), sphere.pose());
        assert_relative_eq!(world, Point3::new(0.0, 1.5, 0.1), epsilon = 1e-12);
    }

    #[test]
    fn test_grabbed_body_without_spheres_skipped() {
        let arm = arm();
        let set = SphereModelBuilder::new(&arm)
            .with_grabbed(GrabbedBody::new(BodyId(4), "no-such-link"))
            .build()
            .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_grabbed_body_missing_link_transform() {
        let arm = arm();
        let body = GrabbedBody::new(BodyId(2), "fore")
            .with_sphere(SphereSpec::new("handle", Point3::origin(), 0.05));
        let err = SphereModelBuilder::new(&arm).with_grabbed(body).build().unwrap_err();
        assert_eq!(err, PlanningError::unknown_link("handle"));
    }

    #[test]
    fn test_grabbed_body_with_robot_id_rejected() {
        let arm = arm();
        let body = GrabbedBody::new(BodyId::ROBOT, "fore")
            .with_sphere(SphereSpec::new("x", Point3::origin(), 0.05));
        assert!(SphereModelBuilder::new(&arm).with_grabbed(body).build().is_err());
    }
}
