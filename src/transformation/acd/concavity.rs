use super::Hull;
use crate::math::{Point, Real};
use crate::transformation::voxelization::VoxelSet;
use crate::transformation::ConvexHullError;
use std::ops::Range;

/// The largest concavity value: a concavity always lies in `[0, MAX_CONCAVITY]`.
pub const MAX_CONCAVITY: Real = 1.0 - Real::EPSILON;

/// The concavity of a volume given its own volume and the volume of its convex hull.
///
/// This is the fraction of the hull that is not filled by the volume. It does not depend on
/// the scale of the shape.
pub fn compute_concavity(volume: Real, hull_volume: Real) -> Real {
    if hull_volume <= 0.0 {
        return 0.0;
    }

    ((hull_volume - volume) / hull_volume).clamp(0.0, MAX_CONCAVITY)
}

/// `1 - sqrt(λmin / λmax)`, where `λmin` and `λmax` are the smallest and largest eigenvalues
/// of the covariance matrix of `points`.
///
/// This is zero for point clouds spreading equally in all directions, and approaches one for
/// flat or needle-like point clouds.
pub fn aspect_degeneracy(points: &[Point<Real>]) -> Real {
    if points.len() < 2 {
        return 1.0;
    }

    let eigenvalues = crate::utils::cov(points).symmetric_eigenvalues();
    let max = eigenvalues.max();
    let min = eigenvalues.min().max(0.0);

    if max <= 0.0 {
        return 1.0;
    }

    (1.0 - (min / max).sqrt()).clamp(0.0, 1.0)
}

/// The concavity of a volume of voxels relative to its convex hull.
///
/// All the quantities are expressed in voxel-grid units: a voxel has a unit volume.
#[derive(Clone, Debug, PartialEq)]
pub struct Concavity {
    /// The convex hull of the volume.
    pub hull: Hull,
    /// The number of voxels of the volume.
    pub volume: Real,
    /// The normalized concavity, see [`compute_concavity`].
    pub concavity: Real,
    /// The aspect degeneracy of the hull, see [`aspect_degeneracy`].
    ///
    /// It only penalizes sliver hulls when selecting a cut, and never affects whether a
    /// volume is accepted.
    pub aspect: Real,
}

impl Concavity {
    /// Evaluates the concavity of the voxels of `vset` in `range`.
    ///
    /// The hull is computed from the corners of the surface voxels of the range.
    pub fn try_evaluate(vset: &VoxelSet, range: Range<usize>) -> Result<Self, ConvexHullError> {
        let hull = Hull::try_new(&vset.surface_corners(range.clone()))?;
        Ok(Self::with_hull(hull, range.len()))
    }

    /// Evaluates the concavity of the voxels of `vset` in `range`, using the bounding box of
    /// the surface voxels as the hull if their convex hull cannot be computed.
    pub fn evaluate(vset: &VoxelSet, range: Range<usize>) -> Self {
        let hull = Hull::new(&vset.surface_corners(range.clone()));
        Self::with_hull(hull, range.len())
    }

    /// Evaluates the concavity of a volume of `num_voxels` voxels with the given hull.
    pub fn with_hull(hull: Hull, num_voxels: usize) -> Self {
        let volume = num_voxels as Real;
        let concavity = compute_concavity(volume, hull.volume());
        let aspect = hull.aspect_degeneracy();

        Self {
            hull,
            volume,
            concavity,
            aspect,
        }
    }
}
