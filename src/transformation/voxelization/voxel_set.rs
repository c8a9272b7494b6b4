// Voxel arena derived from the primitive sets of V-HACD, by Khaled Mamou
// (BSD-3-Clause, https://github.com/kmammou/v-hacd).

use super::GridFrame;
use crate::math::{Matrix, Point, Real, Vector};
use crate::transformation::acd::CutPlane;
use std::ops::Range;

/// A voxel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Voxel {
    /// The integer coordinates of the voxel as part of the voxel grid.
    pub coords: Point<u32>,
    /// Is this voxel on the boundary of its volume (i.e. not strictly inside of it)?
    pub is_on_surface: bool,
}

impl Voxel {
    /// The grid-space center of this voxel.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        self.coords.map(|e| e as Real + 0.5)
    }

    /// Calls `f` on the integer coordinates of the eight corners of this voxel.
    #[inline]
    pub fn map_corners(&self, mut f: impl FnMut([u32; 3])) {
        let [i, j, k] = [self.coords.x, self.coords.y, self.coords.z];

        for dk in 0..2 {
            for dj in 0..2 {
                for di in 0..2 {
                    f([i + di, j + dj, k + dk])
                }
            }
        }
    }
}

/// The number of voxels of a volume lying on each side of a cutting plane.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClippedVolumes {
    /// Voxels with their center strictly on the negative side of the plane.
    pub negative: usize,
    /// Voxels with their center on the positive side of the plane, or on the plane.
    pub positive: usize,
    /// Positive voxels with their center closer than one voxel to the plane: an estimate of
    /// the area of the cut, in voxel faces.
    pub cut: usize,
}

/// A sparse set of voxels shared by all the volumes of a decomposition.
///
/// Every volume owns a contiguous range of the voxel buffer. Splitting a volume reorders its
/// range in place so that each child owns a sub-range: the voxels are never duplicated.
pub struct VoxelSet {
    frame: GridFrame,
    dims: [u32; 3],
    pub(crate) voxels: Vec<Voxel>,
}

impl VoxelSet {
    /// Creates a voxel set from its grid frame, the dimensions of its grid, and its voxels.
    pub fn new(frame: GridFrame, dims: [u32; 3], voxels: Vec<Voxel>) -> Self {
        Self {
            frame,
            dims,
            voxels,
        }
    }

    /// The mapping between grid space and mesh space.
    #[inline]
    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    /// The dimensions of the voxel grid this set was extracted from.
    #[inline]
    pub fn dims(&self) -> [u32; 3] {
        self.dims
    }

    /// The number of voxels in this set.
    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Is this set empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// The set of voxels.
    #[inline]
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// The volume of a single voxel, in mesh units.
    #[inline]
    pub fn voxel_volume(&self) -> Real {
        self.frame.voxel_volume()
    }

    /// The index of the given voxel coordinates in the memory order of the grid.
    #[inline]
    pub fn linear_index(&self, coords: &Point<u32>) -> u64 {
        coords.x as u64 + self.dims[0] as u64 * (coords.y as u64 + self.dims[1] as u64 * coords.z as u64)
    }

    /// The smallest and largest coordinates of the voxels in `range`.
    pub fn bounds(&self, range: Range<usize>) -> (Point<u32>, Point<u32>) {
        let voxels = &self.voxels[range];
        let Some(first) = voxels.first() else {
            return (Point::origin(), Point::origin());
        };

        let mut mins = first.coords;
        let mut maxs = first.coords;

        for voxel in voxels {
            mins = mins.inf(&voxel.coords);
            maxs = maxs.sup(&voxel.coords);
        }

        (mins, maxs)
    }

    /// The grid-space corners of the surface voxels in `range`, sorted and without duplicates.
    ///
    /// The convex hull of these points contains every voxel of the range.
    pub fn surface_corners(&self, range: Range<usize>) -> Vec<Point<Real>> {
        let mut keys = Vec::new();

        for voxel in self.voxels[range].iter().filter(|v| v.is_on_surface) {
            voxel.map_corners(|c| keys.push(c));
        }

        keys.sort_unstable();
        keys.dedup();
        keys.into_iter()
            .map(|[i, j, k]| Point::new(i as Real, j as Real, k as Real))
            .collect()
    }

    /// The eigenvalues and eigenvectors of the covariance matrix of the voxel centers of
    /// `range`.
    ///
    /// The eigenvalues are sorted in decreasing order, the `i`-th column of the matrix being
    /// the eigenvector of the `i`-th eigenvalue.
    pub fn principal_axes(&self, range: Range<usize>) -> (Vector<Real>, Matrix<Real>) {
        let voxels = &self.voxels[range];

        if voxels.is_empty() {
            return (Vector::zeros(), Matrix::identity());
        }

        let denom = 1.0 / (voxels.len() as Real);
        let mut center = Point::origin();

        for voxel in voxels {
            center += voxel.center().coords * denom;
        }

        let mut cov_mat = Matrix::zeros();
        for voxel in voxels {
            let xyz = voxel.center() - center;
            cov_mat.syger(denom, &xyz, &xyz, 1.0);
        }

        let eigen = cov_mat.symmetric_eigen();
        let mut order = [0, 1, 2];
        order.sort_by(|a, b| eigen.eigenvalues[*b].total_cmp(&eigen.eigenvalues[*a]));

        let eigenvalues = Vector::new(
            eigen.eigenvalues[order[0]],
            eigen.eigenvalues[order[1]],
            eigen.eigenvalues[order[2]],
        );
        let eigenvectors = Matrix::from_columns(&[
            eigen.eigenvectors.column(order[0]).into_owned(),
            eigen.eigenvectors.column(order[1]).into_owned(),
            eigen.eigenvectors.column(order[2]).into_owned(),
        ]);

        (eigenvalues, eigenvectors)
    }

    /// Collects the points used to approximate the convex hulls of both sides of `plane`.
    ///
    /// The corners of the surface voxels closer than one voxel to the plane are always
    /// collected. Only one out of `sampling` other surface voxels is collected.
    pub(crate) fn intersect(
        &self,
        range: Range<usize>,
        plane: &CutPlane,
        positive_pts: &mut Vec<Point<Real>>,
        negative_pts: &mut Vec<Point<Real>>,
        sampling: u32,
    ) {
        let sampling = sampling.max(1);
        let mut sp = 0;
        let mut sn = 0;

        let push_corners = |voxel: &Voxel, out: &mut Vec<Point<Real>>| {
            voxel.map_corners(|[i, j, k]| out.push(Point::new(i as Real, j as Real, k as Real)))
        };

        for voxel in self.voxels[range].iter().filter(|v| v.is_on_surface) {
            let d = plane.distance(&voxel.center());

            if d >= 0.0 {
                if d <= 1.0 {
                    push_corners(voxel, positive_pts);
                } else {
                    sp += 1;

                    if sp == sampling {
                        push_corners(voxel, positive_pts);
                        sp = 0;
                    }
                }
            } else if -d <= 1.0 {
                push_corners(voxel, negative_pts);
            } else {
                sn += 1;

                if sn == sampling {
                    push_corners(voxel, negative_pts);
                    sn = 0;
                }
            }
        }
    }

    /// Counts the voxels of `range` on each side of `plane`.
    pub(crate) fn compute_clipped_volumes(
        &self,
        range: Range<usize>,
        plane: &CutPlane,
    ) -> ClippedVolumes {
        let mut result = ClippedVolumes::default();

        for voxel in &self.voxels[range] {
            let d = plane.distance(&voxel.center());

            if d >= 0.0 {
                result.positive += 1;
                result.cut += (d < 1.0) as usize;
            } else {
                result.negative += 1;
            }
        }

        result
    }

    /// Splits `self.voxels` into disjoint mutable slices, one per range.
    ///
    /// The ranges must be sorted and must not overlap.
    pub(crate) fn split_ranges_mut(&mut self, ranges: &[Range<usize>]) -> Vec<&mut [Voxel]> {
        let mut result = Vec::with_capacity(ranges.len());
        let mut rest = self.voxels.as_mut_slice();
        let mut offset = 0;

        for range in ranges {
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(range.start - offset);
            let (slice, tail) = tail.split_at_mut(range.end - range.start);
            result.push(slice);
            rest = tail;
            offset = range.end;
        }

        result
    }
}

/// Reorders `voxels` so that the voxels on the negative side of `plane` come first.
///
/// The relative order of the voxels on each side is preserved, and the voxels closer than one
/// voxel to the plane are marked as being on the surface. Returns the number of voxels on the
/// negative side.
pub(crate) fn partition(voxels: &mut [Voxel], plane: &CutPlane) -> usize {
    let mut negative = Vec::with_capacity(voxels.len());
    let mut positive = Vec::with_capacity(voxels.len());

    for voxel in voxels.iter() {
        let mut voxel = *voxel;
        let d = plane.distance(&voxel.center());

        if d.abs() <= 1.0 {
            voxel.is_on_surface = true;
        }

        if d >= 0.0 {
            positive.push(voxel);
        } else {
            negative.push(voxel);
        }
    }

    let num_negative = negative.len();
    voxels[..num_negative].copy_from_slice(&negative);
    voxels[num_negative..].copy_from_slice(&positive);
    num_negative
}
