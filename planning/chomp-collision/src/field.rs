//! Signed distance fields queried by the environment evaluator.
//!
//! A distance field returns, for a world point, the signed distance to the
//! nearest obstacle surface (negative inside an obstacle) together with the
//! gradient of that distance. Fields are read-only during optimization and
//! may be shared between evaluators.
//!
//! Two implementations are provided:
//!
//! - [`GridDistanceField`]: samples on a regular lattice with trilinear
//!   interpolation and a finite-difference gradient
//! - [`SphereObstacle`]: an exact analytic field for a single ball
//!
//! # Robustness
//!
//! Grid queries never panic. Points outside the grid are clamped onto its
//! boundary, and a degenerate gradient falls back to `+Z`.

use nalgebra::{Point3, Vector3};
use tracing::warn;

/// Signed distance and gradient at a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSample {
    /// Signed distance to the nearest surface (negative = penetrating).
    pub distance: f64,
    /// Gradient of the distance (direction of increasing distance).
    pub gradient: Vector3<f64>,
}

/// A read-only signed distance field in world coordinates.
pub trait DistanceField: Send + Sync {
    /// Returns the signed distance and its gradient at `point`.
    fn query(&self, point: &Point3<f64>) -> DistanceSample;
}

/// Returns the nearest sample over all fields.
///
/// Fields are not summed; the field reporting the smallest distance wins.
/// Returns `None` when `fields` is empty.
#[must_use]
pub fn nearest<F>(fields: &[F], point: &Point3<f64>) -> Option<DistanceSample>
where
    F: AsRef<dyn DistanceField>,
{
    fields
        .iter()
        .map(|field| field.as_ref().query(point))
        .fold(None, |best: Option<DistanceSample>, sample| match best {
            Some(b) if b.distance <= sample.distance => Some(b),
            _ => Some(sample),
        })
}

/// A signed distance field sampled on a regular grid.
///
/// Values are stored in ZYX order (`values[z * nx * ny + y * nx + x]`), with
/// sample `(0, 0, 0)` at `origin`.
///
/// # Example
///
/// ```
/// use chomp_collision::{DistanceField, GridDistanceField};
/// use nalgebra::Point3;
///
/// // A floor at z = 0 over a 2m cube.
/// let origin = Point3::new(-1.0, -1.0, -1.0);
/// let field = GridDistanceField::from_fn([21, 21, 21], 0.1, origin, |p| p.z).unwrap();
///
/// let sample = field.query(&Point3::new(0.0, 0.0, 0.35));
/// assert!((sample.distance - 0.35).abs() < 1e-9);
/// assert!((sample.gradient.z - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct GridDistanceField {
    values: Vec<f64>,
    dims: [usize; 3],
    cell_size: f64,
    origin: Point3<f64>,
}

impl GridDistanceField {
    /// Creates a grid field from sampled values.
    ///
    /// Returns `None` if any dimension is below 2, the value count does not
    /// match the dimensions, or `cell_size` is not positive.
    #[must_use]
    pub fn new(
        values: Vec<f64>,
        dims: [usize; 3],
        cell_size: f64,
        origin: Point3<f64>,
    ) -> Option<Self> {
        let [nx, ny, nz] = dims;
        if nx < 2 || ny < 2 || nz < 2 {
            return None;
        }
        if values.len() != nx * ny * nz || cell_size.is_nan() || cell_size <= 0.0 {
            return None;
        }

        Some(Self {
            values,
            dims,
            cell_size,
            origin,
        })
    }

    /// Samples a signed distance function on a grid.
    ///
    /// Returns `None` under the same conditions as [`GridDistanceField::new`].
    #[must_use]
    pub fn from_fn<F>(dims: [usize; 3], cell_size: f64, origin: Point3<f64>, f: F) -> Option<Self>
    where
        F: Fn(Point3<f64>) -> f64,
    {
        let [nx, ny, nz] = dims;
        let mut values = Vec::with_capacity(nx * ny * nz);

        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    values.push(f(Point3::new(
                        origin.x + x as f64 * cell_size,
                        origin.y + y as f64 * cell_size,
                        origin.z + z as f64 * cell_size,
                    )));
                }
            }
        }

        Self::new(values, dims, cell_size, origin)
    }

    /// Grid dimensions (samples along X, Y, Z).
    #[must_use]
    pub const fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Distance between neighbouring samples.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// World position of sample `(0, 0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// World position of the last sample.
    #[must_use]
    pub fn max_corner(&self) -> Point3<f64> {
        let [nx, ny, nz] = self.dims;
        Point3::new(
            self.origin.x + (nx - 1) as f64 * self.cell_size,
            self.origin.y + (ny - 1) as f64 * self.cell_size,
            self.origin.z + (nz - 1) as f64 * self.cell_size,
        )
    }

    fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        let [nx, ny, _] = self.dims;
        self.values[z * nx * ny + y * nx + x]
    }

    fn clamp_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let max = self.max_corner();
        Point3::new(
            point.x.clamp(self.origin.x, max.x),
            point.y.clamp(self.origin.y, max.y),
            point.z.clamp(self.origin.z, max.z),
        )
    }

    /// Trilinearly interpolated distance, clamping the point into the grid.
    #[must_use]
    #[allow(clippy::similar_names)]
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        let p = self.clamp_point(point);
        let [nx, ny, nz] = self.dims;

        let gx = (p.x - self.origin.x) / self.cell_size;
        let gy = (p.y - self.origin.y) / self.cell_size;
        let gz = (p.z - self.origin.z) / self.cell_size;

        // The upper corner cell reuses its last interior cell.
        let x0 = (gx.floor() as usize).min(nx - 2);
        let y0 = (gy.floor() as usize).min(ny - 2);
        let z0 = (gz.floor() as usize).min(nz - 2);

        let fx = gx - x0 as f64;
        let fy = gy - y0 as f64;
        let fz = gz - z0 as f64;

        let v000 = self.value(x0, y0, z0);
        let v100 = self.value(x0 + 1, y0, z0);
        let v010 = self.value(x0, y0 + 1, z0);
        let v110 = self.value(x0 + 1, y0 + 1, z0);
        let v001 = self.value(x0, y0, z0 + 1);
        let v101 = self.value(x0 + 1, y0, z0 + 1);
        let v011 = self.value(x0, y0 + 1, z0 + 1);
        let v111 = self.value(x0 + 1, y0 + 1, z0 + 1);

        let v00 = v000 + fx * (v100 - v000);
        let v10 = v010 + fx * (v110 - v010);
        let v01 = v001 + fx * (v101 - v001);
        let v11 = v011 + fx * (v111 - v011);

        let v0 = v00 + fy * (v10 - v00);
        let v1 = v01 + fy * (v11 - v01);

        v0 + fz * (v1 - v0)
    }

    /// Normalized central-difference gradient of the interpolated distance.
    #[must_use]
    pub fn gradient(&self, point: &Point3<f64>) -> Vector3<f64> {
        let h = self.cell_size * 0.5;
        let axis = |offset: Vector3<f64>| {
            (self.distance(&(point + offset)) - self.distance(&(point - offset))) / (2.0 * h)
        };

        let grad = Vector3::new(
            axis(Vector3::x() * h),
            axis(Vector3::y() * h),
            axis(Vector3::z() * h),
        );

        grad.try_normalize(1e-10).unwrap_or_else(|| {
            warn!(
                "Degenerate field gradient at ({:.4}, {:.4}, {:.4}), using +Z",
                point.x, point.y, point.z
            );
            Vector3::z()
        })
    }
}

impl DistanceField for GridDistanceField {
    fn query(&self, point: &Point3<f64>) -> DistanceSample {
        DistanceSample {
            distance: self.distance(point),
            gradient: self.gradient(point),
        }
    }
}

/// Exact signed distance field of a solid ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereObstacle {
    /// Center of the ball.
    pub center: Point3<f64>,
    /// Radius of the ball.
    pub radius: f64,
}

impl SphereObstacle {
    /// Creates a ball obstacle.
    #[must_use]
    pub const fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl DistanceField for SphereObstacle {
    fn query(&self, point: &Point3<f64>) -> DistanceSample {
        let offset = point - self.center;
        let norm = offset.norm();
        DistanceSample {
            distance: norm - self.radius,
            gradient: if norm > 1e-12 {
                offset / norm
            } else {
                warn!("Query at obstacle center, using +Z as gradient");
                Vector3::z()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn ball_grid() -> GridDistanceField {
        GridDistanceField::from_fn([41, 41, 41], 0.05, Point3::new(-1.0, -1.0, -1.0), |p| {
            p.coords.norm() - 0.5
        })
        .unwrap()
    }

    #[test]
    fn test_grid_rejects_bad_dimensions() {
        assert!(GridDistanceField::new(vec![0.0; 8], [2, 2, 2], 0.1, Point3::origin()).is_some());
        assert!(GridDistanceField::new(vec![0.0; 4], [1, 2, 2], 0.1, Point3::origin()).is_none());
        assert!(GridDistanceField::new(vec![0.0; 7], [2, 2, 2], 0.1, Point3::origin()).is_none());
        assert!(GridDistanceField::new(vec![0.0; 8], [2, 2, 2], 0.0, Point3::origin()).is_none());
    }

    #[test]
    fn test_grid_matches_samples_at_nodes() {
        let grid = ball_grid();
        assert_relative_eq!(grid.distance(&Point3::origin()), -0.5, epsilon = 1e-12);
        assert_relative_eq!(grid.distance(&Point3::new(1.0, 0.0, 0.0)), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_gradient_points_outward() {
        let grid = ball_grid();
        let g = grid.gradient(&Point3::new(0.7, 0.0, 0.0));
        assert_relative_eq!(g.x, 1.0, epsilon = 1e-3);
        assert!(g.y.abs() < 1e-6);
    }

    #[test]
    fn test_grid_upper_corner() {
        let grid = ball_grid();
        let corner = grid.max_corner();
        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-12);
        let expected = 3.0_f64.sqrt() - 0.5;
        assert_relative_eq!(grid.distance(&corner), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_out_of_bounds_is_clamped() {
        let grid = ball_grid();
        let inside = grid.distance(&Point3::new(1.0, 0.0, 0.0));
        let outside = grid.distance(&Point3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(inside, outside, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_flat_field_gradient_falls_back() {
        let grid = GridDistanceField::new(vec![1.0; 8], [2, 2, 2], 1.0, Point3::origin()).unwrap();
        assert_eq!(grid.gradient(&Point3::new(0.5, 0.5, 0.5)), Vector3::z());
    }

    #[test]
    fn test_grid_query_on_flat_field_keeps_distance() {
        let grid = GridDistanceField::new(vec![0.25; 8], [2, 2, 2], 1.0, Point3::origin()).unwrap();
        let sample = grid.query(&Point3::new(0.25, 0.75, 0.5));
        assert_relative_eq!(sample.distance, 0.25);
        assert_eq!(sample.gradient, Vector3::z());
    }

    #[test]
    fn test_sphere_obstacle() {
        let ball = SphereObstacle::new(Point3::new(1.0, 0.0, 0.0), 0.25);
        let sample = ball.query(&Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(sample.distance, 0.75);
        assert_relative_eq!(sample.gradient, Vector3::y());

        let center = ball.query(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(center.distance, -0.25);
        assert_eq!(center.gradient, Vector3::z());
    }

    #[test]
    fn test_nearest_takes_minimum() {
        let fields: Vec<Arc<dyn DistanceField>> = vec![
            Arc::new(SphereObstacle::new(Point3::new(3.0, 0.0, 0.0), 0.5)),
            Arc::new(SphereObstacle::new(Point3::new(0.0, 2.0, 0.0), 0.5)),
        ];

        let sample = nearest(&fields, &Point3::origin()).unwrap();
        assert_relative_eq!(sample.distance, 1.5);
        assert_relative_eq!(sample.gradient, -Vector3::y());
    }

    #[test]
    fn test_nearest_empty() {
        let fields: Vec<Arc<dyn DistanceField>> = Vec::new();
        assert!(nearest(&fields, &Point3::origin()).is_none());
    }
}
