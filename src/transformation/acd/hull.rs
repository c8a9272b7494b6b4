use super::CutPlane;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::shape::Tetrahedron;
use crate::transformation::{try_convex_hull, ConvexHullError};

/// A convex hull expressed in voxel-grid space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hull {
    /// The vertices of the hull.
    pub points: Vec<Point<Real>>,
    /// The triangles of the hull, oriented counter-clockwise when seen from the outside.
    pub indices: Vec<[u32; 3]>,
    volume: Real,
}

impl Hull {
    /// Computes the convex hull of `points`.
    pub fn try_new(points: &[Point<Real>]) -> Result<Self, ConvexHullError> {
        let (points, indices) = try_convex_hull(points)?;
        let volume = convex_volume(&points, &indices);

        Ok(Self {
            points,
            indices,
            volume,
        })
    }

    /// Computes the convex hull of `points`, or their bounding box if the hull cannot be
    /// computed (for example because all the points are coplanar).
    pub fn new(points: &[Point<Real>]) -> Self {
        match Self::try_new(points) {
            Ok(hull) => hull,
            Err(err) => {
                log::debug!(
                    "Convex hull of {} points failed ({}), falling back to their bounding box.",
                    points.len(),
                    err
                );
                Self::from_aabb(points)
            }
        }
    }

    /// The bounding box of `points`, as a hull.
    ///
    /// Returns an empty hull if `points` is empty.
    pub fn from_aabb(points: &[Point<Real>]) -> Self {
        if points.is_empty() {
            return Self::default();
        }

        let aabb = Aabb::from_points(points);
        Self {
            points: aabb.vertices().to_vec(),
            indices: Aabb::triangles().to_vec(),
            volume: aabb.volume(),
        }
    }

    /// Does this hull have no vertex?
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The volume enclosed by this hull.
    pub fn volume(&self) -> Real {
        self.volume
    }

    /// Splits the vertices of this hull into two parts, depending on what side of the given
    /// plane they lie.
    ///
    /// Points located exactly on the plane are pushed to both parts.
    pub fn clip(
        &self,
        plane: &CutPlane,
        positive_part: &mut Vec<Point<Real>>,
        negative_part: &mut Vec<Point<Real>>,
    ) {
        for pt in &self.points {
            let d = plane.distance(pt);

            if d > 0.0 {
                positive_part.push(*pt);
            } else if d < 0.0 {
                negative_part.push(*pt);
            } else {
                positive_part.push(*pt);
                negative_part.push(*pt);
            }
        }
    }

    /// How far this hull is from having the same extent along all its principal axes.
    ///
    /// See [`aspect_degeneracy`](super::aspect_degeneracy).
    pub fn aspect_degeneracy(&self) -> Real {
        super::aspect_degeneracy(&self.points)
    }
}

/// The volume of a convex polyhedron, computed by fanning tetrahedra from its barycenter.
pub(crate) fn convex_volume(points: &[Point<Real>], indices: &[[u32; 3]]) -> Real {
    if points.is_empty() || indices.is_empty() {
        return 0.0;
    }

    let barycenter = crate::utils::center(points);
    let mut total_volume = 0.0;

    for tri in indices {
        let a = points[tri[0] as usize];
        let b = points[tri[1] as usize];
        let c = points[tri[2] as usize];
        total_volume += Tetrahedron::new(a, b, c, barycenter).volume();
    }

    total_volume
}
