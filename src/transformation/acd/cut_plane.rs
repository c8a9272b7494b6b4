// Plane search derived from the clipping plane selection of V-HACD, by Khaled Mamou
// (BSD-3-Clause, https://github.com/kmammou/v-hacd).

use super::{AcdParameters, Concavity, Hull};
use crate::math::{Matrix, Point, Real, Vector};
use crate::transformation::voxelization::VoxelSet;
use std::ops::Range;

/// The number of best approximate planes whose neighborhoods are compared with exact hulls.
const NUM_EXACT_CANDIDATES: usize = 4;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The family a cutting plane belongs to.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CutAxis {
    /// A plane orthogonal to the `x` axis of the voxel grid.
    X,
    /// A plane orthogonal to the `y` axis of the voxel grid.
    Y,
    /// A plane orthogonal to the `z` axis of the voxel grid.
    Z,
    /// A plane orthogonal to the i-th principal axis of the volume being cut.
    Oriented(u8),
}

impl CutAxis {
    /// The axis-aligned family orthogonal to the `dim`-th grid axis.
    pub fn from_dim(dim: usize) -> Self {
        match dim {
            0 => CutAxis::X,
            1 => CutAxis::Y,
            _ => CutAxis::Z,
        }
    }

    /// The index of the grid axis this family is orthogonal to, if it is axis-aligned.
    pub fn dim(self) -> Option<usize> {
        match self {
            CutAxis::X => Some(0),
            CutAxis::Y => Some(1),
            CutAxis::Z => Some(2),
            CutAxis::Oriented(_) => None,
        }
    }
}

/// A candidate plane splitting a volume in two, in voxel-grid space.
///
/// A point `p` is on the positive side of the plane if `normal · p + offset >= 0`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CutPlane {
    /// The unit normal of the plane.
    pub normal: Vector<Real>,
    /// The signed offset of the plane along its normal.
    pub offset: Real,
    /// The family of this plane.
    pub axis: CutAxis,
    /// The position of this plane within its family.
    pub index: u32,
}

impl CutPlane {
    /// The plane orthogonal to the `dim`-th grid axis, separating the voxels with a
    /// coordinate smaller or equal to `index` from the others.
    pub fn axis_aligned(dim: usize, index: u32) -> Self {
        CutPlane {
            normal: Vector::ith(dim, 1.0),
            offset: -(index as Real + 1.0),
            axis: CutAxis::from_dim(dim),
            index,
        }
    }

    /// The signed distance between `pt` and this plane.
    #[inline]
    pub fn distance(&self, pt: &Point<Real>) -> Real {
        self.normal.dot(&pt.coords) + self.offset
    }

    /// The rank of this plane among candidates: axis-aligned families first, in the `x`, `y`,
    /// `z` order, then by increasing index.
    fn order_key(&self) -> (u8, u32) {
        let family = match self.axis {
            CutAxis::X => 0,
            CutAxis::Y => 1,
            CutAxis::Z => 2,
            CutAxis::Oriented(i) => i.saturating_add(3),
        };
        (family, self.index)
    }
}

/// Sorts `points` lexicographically and removes the duplicates.
fn dedup_points(points: &mut Vec<Point<Real>>) {
    points.sort_unstable_by(|a, b| {
        a.x.total_cmp(&b.x)
            .then_with(|| a.y.total_cmp(&b.y))
            .then_with(|| a.z.total_cmp(&b.z))
    });
    points.dedup();
}

/// The direction cuts should preferably not be orthogonal to, and the weight of this
/// preference, computed from the principal axes of a volume.
///
/// The direction is the principal axis whose eigenvalue differs the most from the two others
/// (the axis of revolution for shapes with a rotational symmetry). The weight is close to 1
/// when the two other eigenvalues are equal.
pub(crate) fn preferred_cutting_direction(
    eigenvalues: &Vector<Real>,
    eigenvectors: &Matrix<Real>,
) -> (Vector<Real>, Real) {
    let ev = eigenvalues;
    let vx = (ev.y - ev.z) * (ev.y - ev.z);
    let vy = (ev.x - ev.z) * (ev.x - ev.z);
    let vz = (ev.x - ev.y) * (ev.x - ev.y);

    let (axis, v, e) = if vx < vy && vx < vz {
        (0, vx, ev.y * ev.y + ev.z * ev.z)
    } else if vy < vx && vy < vz {
        (1, vy, ev.x * ev.x + ev.z * ev.z)
    } else {
        (2, vz, ev.x * ev.x + ev.y * ev.y)
    };

    let dir = eigenvectors.column(axis).into_owned();

    if e == 0.0 {
        (dir, 0.0)
    } else {
        (dir, 1.0 - v / e)
    }
}

/// The search of the best plane splitting a volume.
pub(crate) struct PlaneSearch<'a> {
    vset: &'a VoxelSet,
    range: Range<usize>,
    eval: &'a Concavity,
    params: &'a AcdParameters,
    mins: Point<u32>,
    maxs: Point<u32>,
    principal_axes: Matrix<Real>,
    preferred_dir: Vector<Real>,
    w: Real,
    volume0: Real,
}

impl<'a> PlaneSearch<'a> {
    pub fn new(
        vset: &'a VoxelSet,
        range: Range<usize>,
        eval: &'a Concavity,
        params: &'a AcdParameters,
    ) -> Self {
        let (mins, maxs) = vset.bounds(range.clone());
        let (eigenvalues, mut principal_axes) = vset.principal_axes(range.clone());

        // Make the orientation of the axes independent from the eigen solver.
        for mut axis in principal_axes.column_iter_mut() {
            let imax = axis.iamax();
            if axis[imax] < 0.0 {
                axis.neg_mut();
            }
        }

        let (preferred_dir, w) = preferred_cutting_direction(&eigenvalues, &principal_axes);

        Self {
            vset,
            range,
            eval,
            params,
            mins,
            maxs,
            principal_axes,
            preferred_dir,
            w,
            volume0: eval.hull.volume().max(eval.volume),
        }
    }

    /// The axis-aligned planes passing between voxels, every `step` voxels.
    fn axis_aligned_planes(&self, step: u32) -> Vec<CutPlane> {
        let mut planes = Vec::new();

        for dim in 0..3 {
            for i in (self.mins[dim]..self.maxs[dim]).step_by(step as usize) {
                planes.push(CutPlane::axis_aligned(dim, i));
            }
        }

        planes
    }

    /// All the planes orthogonal to the `axis`-th principal axis, one voxel apart.
    fn oriented_family(&self, axis: usize) -> Vec<CutPlane> {
        let normal = self.principal_axes.column(axis).into_owned();
        let mut pmin = Real::MAX;
        let mut pmax = -Real::MAX;

        for voxel in &self.vset.voxels()[self.range.clone()] {
            let p = normal.dot(&voxel.center().coords);
            pmin = pmin.min(p);
            pmax = pmax.max(p);
        }

        if pmin > pmax {
            return Vec::new();
        }

        let num_planes = (pmax - pmin).floor() as u32;
        (0..num_planes)
            .map(|t| CutPlane {
                normal,
                offset: -(pmin + t as Real + 0.5),
                axis: CutAxis::Oriented(axis as u8),
                index: t,
            })
            .collect()
    }

    fn oriented_planes(&self, step: u32) -> Vec<CutPlane> {
        (0..3)
            .flat_map(|axis| self.oriented_family(axis))
            .filter(|plane| plane.index % step == 0)
            .collect()
    }

    /// The planes of the family of `best` closer than `plane_downsampling` to it.
    fn refined_planes(&self, best: &CutPlane) -> Vec<CutPlane> {
        let step = self.params.plane_downsampling;
        let first = best.index.saturating_sub(step);
        let last = best.index.saturating_add(step);

        match best.axis.dim() {
            Some(dim) => {
                let i0 = self.mins[dim].max(first);
                let i1 = self.maxs[dim].min(last.saturating_add(1));
                (i0..i1).map(|i| CutPlane::axis_aligned(dim, i)).collect()
            }
            None => {
                let CutAxis::Oriented(axis) = best.axis else {
                    return Vec::new();
                };
                self.oriented_family(axis as usize)
                    .into_iter()
                    .filter(|plane| plane.index >= first && plane.index <= last)
                    .collect()
            }
        }
    }

    /// The cost of cutting the volume with `plane`, or `None` if one side would be empty.
    ///
    /// With a `sampling` of 1, the hulls of both sides are computed from all their surface
    /// voxels. Otherwise, they are approximated from the vertices of the hull of the whole
    /// volume, the voxels close to the plane, and one out of `sampling` other surface voxels.
    fn cost(&self, plane: &CutPlane, sampling: u32) -> Option<Real> {
        let clipped = self.vset.compute_clipped_volumes(self.range.clone(), plane);

        if clipped.negative == 0 || clipped.positive == 0 {
            return None;
        }

        let mut positive_pts = Vec::new();
        let mut negative_pts = Vec::new();

        if sampling > 1 {
            self.eval.hull.clip(plane, &mut positive_pts, &mut negative_pts);
        }

        self.vset.intersect(
            self.range.clone(),
            plane,
            &mut positive_pts,
            &mut negative_pts,
            sampling,
        );
        dedup_points(&mut positive_pts);
        dedup_points(&mut negative_pts);

        let left = Concavity::with_hull(Hull::new(&negative_pts), clipped.negative);
        let right = Concavity::with_hull(Hull::new(&positive_pts), clipped.positive);

        let params = self.params;
        let c = self.eval.concavity;
        let concavity = ((left.hull.volume() - left.volume).abs()
            + (right.hull.volume() - right.volume).abs())
            / self.volume0;
        let balance = params.alpha * c * (left.volume - right.volume).abs() / self.volume0;
        let symmetry = params.beta * c * self.w * plane.normal.dot(&self.preferred_dir).abs();
        let cut_area = params.gamma * clipped.cut as Real / self.eval.volume.powf(2.0 / 3.0);
        let aspect = params.delta * (left.aspect + right.aspect);

        Some(concavity + balance + symmetry + cut_area + aspect)
    }

    /// The finite costs of cutting the volume with each plane of `planes`.
    fn costs(&self, planes: &[CutPlane], sampling: u32) -> Vec<Option<Real>> {
        #[cfg(feature = "parallel")]
        let costs = planes.par_iter().map(|plane| self.cost(plane, sampling));
        #[cfg(not(feature = "parallel"))]
        let costs = planes.iter().map(|plane| self.cost(plane, sampling));

        costs
            .map(|cost| cost.filter(|cost| cost.is_finite()))
            .collect()
    }

    /// The plane of `planes` with the smallest cost. Ties are resolved in favor of the
    /// first plane of the list.
    fn best_plane(&self, planes: &[CutPlane], sampling: u32) -> Option<(CutPlane, Real)> {
        let mut best: Option<(CutPlane, Real)> = None;

        for (plane, cost) in planes.iter().zip(self.costs(planes, sampling)) {
            let Some(cost) = cost else {
                continue;
            };

            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((*plane, cost));
            }
        }

        best
    }

    /// Finds the best plane splitting the volume, if any plane leaves voxels on both sides.
    ///
    /// The planes are first compared with approximate hulls. The planes close to the best
    /// ones are then compared with exact hulls.
    pub fn run(&self) -> Option<CutPlane> {
        let params = self.params;
        let mut planes = self.axis_aligned_planes(params.plane_downsampling);

        if params.oriented_planes {
            planes.extend(self.oriented_planes(params.plane_downsampling));
        }

        if !params.convex_hull_approximation || params.convex_hull_downsampling == 1 {
            let (mut best, _) = self.best_plane(&planes, 1)?;

            if params.plane_downsampling > 1 {
                if let Some((plane, _)) = self.best_plane(&self.refined_planes(&best), 1) {
                    best = plane;
                }
            }

            return Some(best);
        }

        let sampling = params.convex_hull_downsampling.saturating_mul(32);
        let mut ranked: Vec<(CutPlane, Real)> = planes
            .iter()
            .zip(self.costs(&planes, sampling))
            .filter_map(|(plane, cost)| Some((*plane, cost?)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut candidates: Vec<CutPlane> = ranked
            .iter()
            .take(NUM_EXACT_CANDIDATES)
            .flat_map(|(plane, _)| self.refined_planes(plane))
            .collect();
        candidates.sort_by_key(CutPlane::order_key);
        candidates.dedup_by_key(|plane| plane.order_key());

        self.best_plane(&candidates, 1)
            .map(|(plane, _)| plane)
            .or_else(|| ranked.first().map(|(plane, _)| *plane))
    }
}
