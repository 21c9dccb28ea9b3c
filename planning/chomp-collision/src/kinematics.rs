//! Kinematic model interface and a serial-chain reference model.
//!
//! The cost engine needs four things from the articulated body it evaluates:
//! apply a configuration, read a link's world transform, compute the
//! translational Jacobian of a world point rigidly attached to a link, and
//! know which degrees of freedom move which links. [`KinematicModel`]
//! captures exactly that.
//!
//! Applying a configuration mutates the model, so a model instance must not be
//! shared between concurrently evaluated waypoints.
//!
//! [`SerialChain`] is a tree of links connected by fixed, revolute or
//! prismatic joints. Jacobian columns follow the usual conventions:
//!
//! | Joint | Column |
//! |-------|--------|
//! | Revolute | `axis × (point − anchor)` |
//! | Prismatic | `axis` |
//! | Fixed | none |
//!
//! with `axis` and `anchor` expressed in the world frame.

use chomp_types::{AdjacencySet, PlanningError, PlanningResult};
use nalgebra::{DMatrix, DVector, Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};

/// An articulated body whose active degrees of freedom are being optimized.
pub trait KinematicModel {
    /// Number of active degrees of freedom.
    fn dof(&self) -> usize;

    /// Updates all link world transforms for configuration `q`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::DimensionMismatch`] if `q` has the wrong length.
    fn apply_configuration(&mut self, q: &DVector<f64>) -> PlanningResult<()>;

    /// World transform of a link at the current configuration.
    fn link_transform(&self, link: usize) -> Isometry3<f64>;

    /// Translational Jacobian (3 × dof) of a world point attached to `link`.
    fn jacobian(&self, link: usize, point: &Point3<f64>) -> DMatrix<f64>;

    /// Looks up a link index by name.
    fn link_index(&self, name: &str) -> Option<usize>;

    /// Returns `true` if active degree of freedom `dof` moves `link`.
    fn affects(&self, dof: usize, link: usize) -> bool;

    /// Returns `true` if any active degree of freedom moves `link`.
    fn is_link_active(&self, link: usize) -> bool {
        (0..self.dof()).any(|dof| self.affects(dof, link))
    }

    /// World position of a point given in a link's frame.
    fn world_point(&self, link: usize, local: &Point3<f64>) -> Point3<f64> {
        self.link_transform(link) * local
    }
}

/// Joint connecting a link to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Joint {
    /// Rigid attachment.
    Fixed,
    /// Rotation about `axis` (in the joint frame) driven by `dof`.
    Revolute {
        /// Rotation axis in the joint frame.
        axis: Unit<Vector3<f64>>,
        /// Index of the driving degree of freedom.
        dof: usize,
    },
    /// Translation along `axis` (in the joint frame) driven by `dof`.
    Prismatic {
        /// Translation axis in the joint frame.
        axis: Unit<Vector3<f64>>,
        /// Index of the driving degree of freedom.
        dof: usize,
    },
}

impl Joint {
    /// Index of the driving degree of freedom, if any.
    #[must_use]
    pub const fn dof(&self) -> Option<usize> {
        match self {
            Self::Fixed => None,
            Self::Revolute { dof, .. } | Self::Prismatic { dof, .. } => Some(*dof),
        }
    }

    fn motion(&self, q: &DVector<f64>) -> Isometry3<f64> {
        match *self {
            Self::Fixed => Isometry3::identity(),
            Self::Revolute { axis, dof } => Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&axis, q[dof]),
            ),
            Self::Prismatic { axis, dof } => Isometry3::from_parts(
                Translation3::from(axis.into_inner() * q[dof]),
                UnitQuaternion::identity(),
            ),
        }
    }
}

/// A link of a [`SerialChain`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLink {
    /// Link name.
    pub name: String,
    /// Parent link index, `None` for the root.
    pub parent: Option<usize>,
    /// Joint frame relative to the parent link frame.
    pub origin: Isometry3<f64>,
    /// Joint between the parent and this link.
    pub joint: Joint,
}

/// A tree of links with single-axis joints.
///
/// Links are stored parents-first; each link's parent index must be smaller
/// than its own.
///
/// # Example
///
/// ```
/// use chomp_collision::{KinematicModel, SerialChain};
/// use nalgebra::{DVector, Isometry3, Point3, Vector3};
///
/// let mut arm = SerialChain::builder()
///     .revolute("shoulder", None, Isometry3::identity(), Vector3::z_axis())
///     .revolute("elbow", Some(0), Isometry3::translation(1.0, 0.0, 0.0), Vector3::z_axis())
///     .build()
///     .unwrap();
///
/// arm.apply_configuration(&DVector::from_vec(vec![std::f64::consts::FRAC_PI_2, 0.0])).unwrap();
/// let elbow = arm.world_point(1, &Point3::origin());
/// assert!((elbow.y - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SerialChain {
    links: Vec<ChainLink>,
    dof: usize,
    transforms: Vec<Isometry3<f64>>,
}

impl SerialChain {
    /// Starts building a chain.
    #[must_use]
    pub fn builder() -> SerialChainBuilder {
        SerialChainBuilder::default()
    }

    /// Creates a chain from links, stored parents-first.
    ///
    /// The number of degrees of freedom is one more than the largest joint
    /// dof index.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::InvalidConfig`] if a parent index does not
    /// precede its child, or if two joints drive the same degree of freedom.
    pub fn new(links: Vec<ChainLink>) -> PlanningResult<Self> {
        let mut seen = Vec::new();
        for (index, link) in links.iter().enumerate() {
            if let Some(parent) = link.parent {
                if parent >= index {
                    return Err(PlanningError::invalid_config(format!(
                        "link {} has parent {parent} which does not precede it",
                        link.name
                    )));
                }
            }
            if let Some(dof) = link.joint.dof() {
                if seen.contains(&dof) {
                    return Err(PlanningError::invalid_config(format!(
                        "dof {dof} is driven by more than one joint"
                    )));
                }
                seen.push(dof);
            }
        }

        let dof = seen.iter().max().map_or(0, |max| max + 1);
        let mut chain = Self {
            transforms: vec![Isometry3::identity(); links.len()],
            links,
            dof,
        };
        chain.update_transforms(&DVector::zeros(dof));
        Ok(chain)
    }

    /// The links, parents-first.
    #[must_use]
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    /// Adjacency of every parent/child link pair.
    #[must_use]
    pub fn adjacency(&self) -> AdjacencySet {
        self.links
            .iter()
            .enumerate()
            .filter_map(|(index, link)| link.parent.map(|parent| (parent, index)))
            .collect()
    }

    /// World frame of a link's joint (parent transform composed with the
    /// joint origin).
    fn joint_frame(&self, link: usize) -> Isometry3<f64> {
        let entry = &self.links[link];
        match entry.parent {
            Some(parent) => self.transforms[parent] * entry.origin,
            None => entry.origin,
        }
    }

    fn update_transforms(&mut self, q: &DVector<f64>) {
        for index in 0..self.links.len() {
            let frame = self.joint_frame(index);
            self.transforms[index] = frame * self.links[index].joint.motion(q);
        }
    }

    fn ancestry(&self, link: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(link), move |&current| self.links[current].parent)
    }
}

impl KinematicModel for SerialChain {
    fn dof(&self) -> usize {
        self.dof
    }

    fn apply_configuration(&mut self, q: &DVector<f64>) -> PlanningResult<()> {
        if q.len() != self.dof {
            return Err(PlanningError::DimensionMismatch {
                expected: self.dof,
                actual: q.len(),
            });
        }
        self.update_transforms(q);
        Ok(())
    }

    fn link_transform(&self, link: usize) -> Isometry3<f64> {
        self.transforms[link]
    }

    fn jacobian(&self, link: usize, point: &Point3<f64>) -> DMatrix<f64> {
        let mut jac = DMatrix::zeros(3, self.dof);

        for current in self.ancestry(link) {
            let frame = self.joint_frame(current);
            match self.links[current].joint {
                Joint::Fixed => {}
                Joint::Revolute { axis, dof } => {
                    let axis = frame.rotation * axis.into_inner();
                    let anchor = Point3::from(frame.translation.vector);
                    let column = axis.cross(&(point - anchor));
                    for k in 0..3 {
                        jac[(k, dof)] += column[k];
                    }
                }
                Joint::Prismatic { axis, dof } => {
                    let axis = frame.rotation * axis.into_inner();
                    for k in 0..3 {
                        jac[(k, dof)] += axis[k];
                    }
                }
            }
        }

        jac
    }

    fn link_index(&self, name: &str) -> Option<usize> {
        self.links.iter().position(|link| link.name == name)
    }

    fn affects(&self, dof: usize, link: usize) -> bool {
        self.ancestry(link)
            .any(|current| self.links[current].joint.dof() == Some(dof))
    }
}

/// Builder for [`SerialChain`].
///
/// Degrees of freedom are numbered in the order movable joints are added.
#[derive(Debug, Clone, Default)]
pub struct SerialChainBuilder {
    links: Vec<ChainLink>,
    next_dof: usize,
}

impl SerialChainBuilder {
    fn push(
        mut self,
        name: &str,
        parent: Option<usize>,
        origin: Isometry3<f64>,
        joint: Joint,
    ) -> Self {
        self.links.push(ChainLink {
            name: name.to_string(),
            parent,
            origin,
            joint,
        });
        self
    }

    /// Adds a rigidly attached link.
    #[must_use]
    pub fn fixed(self, name: &str, parent: Option<usize>, origin: Isometry3<f64>) -> Self {
        self.push(name, parent, origin, Joint::Fixed)
    }

    /// Adds a link rotating about `axis`.
    #[must_use]
    pub fn revolute(
        mut self,
        name: &str,
        parent: Option<usize>,
        origin: Isometry3<f64>,
        axis: Unit<Vector3<f64>>,
    ) -> Self {
        let dof = self.next_dof;
        self.next_dof += 1;
        self.push(name, parent, origin, Joint::Revolute { axis, dof })
    }

    /// Adds a link sliding along `axis`.
    #[must_use]
    pub fn prismatic(
        mut self,
        name: &str,
        parent: Option<usize>,
        origin: Isometry3<f64>,
        axis: Unit<Vector3<f64>>,
    ) -> Self {
        let dof = self.next_dof;
        self.next_dof += 1;
        self.push(name, parent, origin, Joint::Prismatic { axis, dof })
    }

    /// Builds the chain.
    ///
    /// # Errors
    ///
    /// See [`SerialChain::new`].
    pub fn build(self) -> PlanningResult<SerialChain> {
        SerialChain::new(self.links)
    }
}
