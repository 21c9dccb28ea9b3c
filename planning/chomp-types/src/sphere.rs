//! Collision spheres and the active/inactive sphere set.
//!
//! A robot's solid geometry is approximated by spheres rigidly attached to
//! kinematic links. Spheres whose link moves with at least one optimized
//! degree of freedom are *active*; the rest are *inactive* but still take part
//! in self-collision checks.
//!
//! The concatenation `active ++ inactive` defines the stable sphere index used
//! by the cost engine for the lifetime of one optimization run.
//!
//! # Example
//!
//! ```
//! use chomp_types::{BodyId, Sphere, SphereSet};
//! use nalgebra::Point3;
//!
//! let upper_arm = Sphere::new(BodyId::ROBOT, "upper_arm", 1, Point3::new(0.0, 0.0, 0.2), 0.08);
//! let base = Sphere::new(BodyId::ROBOT, "base", 0, Point3::origin(), 0.15);
//!
//! let set = SphereSet::new(vec![upper_arm], vec![base]);
//! assert_eq!(set.num_active(), 1);
//! assert_eq!(set.len(), 2);
//! assert_eq!(set.get(1).map(Sphere::link_name), Some("base"));
//! ```

use nalgebra::Point3;

/// Identifies the body a sphere belongs to.
///
/// The robot itself is [`BodyId::ROBOT`]; grabbed bodies get their own ids.
/// Two spheres on the same body may be exempt from self-collision when their
/// links are adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyId(pub u32);

impl BodyId {
    /// The robot whose configuration is being optimized.
    pub const ROBOT: Self = Self(0);

    /// Returns `true` if this id refers to the robot.
    #[must_use]
    pub const fn is_robot(self) -> bool {
        self.0 == 0
    }
}

/// Per-body sphere metadata, as declared alongside a body's geometry.
///
/// The position is expressed in the frame of the named link of the body that
/// declares it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphereSpec {
    /// Name of the link the sphere is attached to.
    pub link_name: String,
    /// Sphere center in the link frame.
    pub position: Point3<f64>,
    /// Sphere radius (non-negative).
    pub radius: f64,
}

impl SphereSpec {
    /// Creates sphere metadata for the named link.
    #[must_use]
    pub fn new(link_name: impl Into<String>, position: Point3<f64>, radius: f64) -> Self {
        Self {
            link_name: link_name.into(),
            position,
            radius,
        }
    }
}

/// A collision sphere resolved against the kinematic model.
///
/// Built once per body before optimization starts and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    body: BodyId,
    link_name: String,
    link: usize,
    pose: Point3<f64>,
    radius: f64,
}

impl Sphere {
    /// Creates a resolved sphere.
    ///
    /// `link_name` and `link` name the same attachment link: for spheres of
    /// grabbed bodies this is the robot link holding the body. `pose` is the
    /// sphere center in that link's frame. Negative radii are clamped to zero.
    #[must_use]
    pub fn new(
        body: BodyId,
        link_name: impl Into<String>,
        link: usize,
        pose: Point3<f64>,
        radius: f64,
    ) -> Self {
        Self {
            body,
            link_name: link_name.into(),
            link,
            pose,
            radius: radius.max(0.0),
        }
    }

    /// Returns the owning body.
    #[must_use]
    pub const fn body(&self) -> BodyId {
        self.body
    }

    /// Returns the name of the attachment link.
    #[must_use]
    pub fn link_name(&self) -> &str {
        &self.link_name
    }

    /// Returns the attachment link index.
    #[must_use]
    pub const fn link(&self) -> usize {
        self.link
    }

    /// Returns the sphere center in the attachment link frame.
    #[must_use]
    pub const fn pose(&self) -> &Point3<f64> {
        &self.pose
    }

    /// Returns the sphere radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns `true` if both spheres hang off the same link.
    #[must_use]
    pub const fn shares_link(&self, other: &Self) -> bool {
        self.link == other.link
    }
}

/// Ordered active and inactive spheres for one optimization run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphereSet {
    active: Vec<Sphere>,
    inactive: Vec<Sphere>,
}

impl SphereSet {
    /// Creates a sphere set from already classified spheres.
    #[must_use]
    pub const fn new(active: Vec<Sphere>, inactive: Vec<Sphere>) -> Self {
        Self { active, inactive }
    }

    /// Number of active spheres.
    #[must_use]
    pub fn num_active(&self) -> usize {
        self.active.len()
    }

    /// Number of inactive spheres.
    #[must_use]
    pub fn num_inactive(&self) -> usize {
        self.inactive.len()
    }

    /// Total number of spheres.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    /// Returns `true` if the set holds no spheres.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty()
    }

    /// Active spheres, in index order.
    #[must_use]
    pub fn active(&self) -> &[Sphere] {
        &self.active
    }

    /// Inactive spheres, in index order after the active ones.
    #[must_use]
    pub fn inactive(&self) -> &[Sphere] {
        &self.inactive
    }

    /// Returns the sphere at a combined index (active first, then inactive).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Sphere> {
        let n_active = self.active.len();
        if index < n_active {
            self.active.get(index)
        } else {
            self.inactive.get(index - n_active)
        }
    }

    /// Returns `true` if the combined index refers to an active sphere.
    #[must_use]
    pub fn is_active(&self, index: usize) -> bool {
        index < self.active.len()
    }

    /// Iterates over all spheres with their combined index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Sphere)> {
        self.active.iter().chain(self.inactive.iter()).enumerate()
    }
}
