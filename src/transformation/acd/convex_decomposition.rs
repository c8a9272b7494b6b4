use super::budget::BudgetTracker;
use super::decomposer::Decomposer;
use super::merge::merge_volumes;
use super::reconstruct::reconstruct;
use super::report::{DecompositionReport, PieceStats, StageTimings};
use super::{AcdError, AcdParameters, ConvexPiece, InvalidInputKind};
use crate::math::{Isometry, Matrix, Point, Real, Translation};
use crate::shape::TriMeshView;
use crate::transformation::voxelization::{connected_components, VoxelGrid, VoxelSet};
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The rigid transformation mapping `points` to the frame of their principal axes.
///
/// The centroid of the points is mapped to the origin, and the principal axes, sorted by
/// decreasing variance, to the `x`, `y` and `z` axes.
pub fn principal_alignment(points: &[Point<Real>]) -> Isometry<Real> {
    if points.is_empty() {
        return Isometry::identity();
    }

    let (center, cov) = crate::utils::center_cov(points);
    let eigen = cov.symmetric_eigen();
    let mut order = [0, 1, 2];
    order.sort_by(|a, b| eigen.eigenvalues[*b].total_cmp(&eigen.eigenvalues[*a]));

    let mut axes = Matrix::from_columns(&[
        eigen.eigenvectors.column(order[0]).into_owned(),
        eigen.eigenvectors.column(order[1]).into_owned(),
        eigen.eigenvectors.column(order[2]).into_owned(),
    ]);

    if axes.determinant() < 0.0 {
        let mut last = axes.column_mut(2);
        last.neg_mut();
    }

    let rotation = na::Rotation3::from_matrix_unchecked(axes.transpose());
    Isometry::from_parts(
        Translation::from(rotation * -center.coords),
        na::UnitQuaternion::from_rotation_matrix(&rotation),
    )
}

/// The result of an approximate convex decomposition.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Decomposition {
    pieces: Vec<ConvexPiece>,
    terminated_early: bool,
    report: DecompositionReport,
}

impl Decomposition {
    /// The convex pieces, sorted by the index of their first voxel in the voxel grid.
    pub fn pieces(&self) -> &[ConvexPiece] {
        &self.pieces
    }

    /// The convex pieces, sorted by the index of their first voxel in the voxel grid.
    pub fn into_pieces(self) -> Vec<ConvexPiece> {
        self.pieces
    }

    /// Did the budget expire before the decomposition completed?
    ///
    /// If so, some pieces may be more concave than the requested threshold.
    pub fn terminated_early(&self) -> bool {
        self.terminated_early
    }

    /// Statistics and timings of this decomposition.
    pub fn report(&self) -> &DecompositionReport {
        &self.report
    }

    /// The process status code of a successful decomposition: always zero.
    ///
    /// See [`AcdError::status_code`] for the status codes of failures.
    pub fn status_code(&self) -> i32 {
        0
    }

    /// The largest concavity among the pieces.
    pub fn max_concavity(&self) -> Real {
        self.pieces
            .iter()
            .map(|p| p.concavity())
            .fold(0.0, Real::max)
    }

    /// The sum of the volumes of the pieces.
    pub fn total_volume(&self) -> Real {
        self.pieces.iter().map(|p| p.volume()).sum()
    }
}

/// Approximate convex decomposition of triangle meshes.
///
/// The mesh is voxelized, its voxels are grouped into connected volumes, and the volumes are
/// recursively split by planes until they are close enough to their convex hulls. Adjacent
/// pieces are then optionally merged back when their union is convex enough.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexDecomposition {
    params: AcdParameters,
}

impl ConvexDecomposition {
    /// Validates the parameters of a decomposition.
    pub fn new(params: &AcdParameters) -> Result<Self, AcdError> {
        Ok(Self {
            params: params.validate()?,
        })
    }

    /// The validated parameters of this decomposition.
    pub fn params(&self) -> &AcdParameters {
        &self.params
    }

    /// Computes the approximate convex decomposition of the given triangle mesh.
    ///
    /// # Parameters
    /// * `points` - The vertex buffer of the mesh.
    /// * `indices` - The index buffer of the mesh, one entry per triangle.
    /// * `params` - The parameters of the decomposition.
    pub fn compute(
        points: &[Point<Real>],
        indices: &[[u32; 3]],
        params: &AcdParameters,
    ) -> Result<Decomposition, AcdError> {
        Self::new(params)?.decompose(points, indices)
    }

    /// Computes the approximate convex decomposition of the given triangle mesh.
    pub fn decompose(
        &self,
        points: &[Point<Real>],
        indices: &[[u32; 3]],
    ) -> Result<Decomposition, AcdError> {
        let params = &self.params;
        let mesh = TriMeshView::new(points, indices)?;
        let mut budget = BudgetTracker::new(params.budget);
        let mut timings = StageTimings::default();

        let t0 = Instant::now();
        let transform = if params.pca {
            principal_alignment(mesh.points())
        } else {
            Isometry::identity()
        };
        timings.alignment = t0.elapsed();

        let t0 = Instant::now();
        let grid =
            VoxelGrid::voxelize_mesh(&mesh, &transform, params.resolution, params.fill_mode)?;
        timings.voxelization = t0.elapsed();

        let mut report = DecompositionReport {
            grid_dims: grid.dims(),
            voxel_size: grid.scale(),
            num_surface_voxels: grid.num_voxels_on_surface(),
            num_inside_voxels: grid.num_voxels_inside_surface(),
            ..Default::default()
        };

        let t0 = Instant::now();
        let mut vset = VoxelSet::from(grid);

        if vset.is_empty() {
            return Err(InvalidInputKind::EmptyVoxelization.into());
        }

        let components = connected_components(&mut vset);
        report.num_volumes = components.len();
        timings.volume_building = t0.elapsed();

        let t0 = Instant::now();
        let outcome = Decomposer::new(params).run(&mut vset, components, &mut budget);
        timings.splitting = t0.elapsed();

        report.num_evaluations = outcome.num_evaluations;
        report.num_splits = outcome.num_splits;
        report.max_depth = outcome.max_depth;
        report.num_pieces_before_merge = outcome.volumes.len();
        let mut terminated_early = outcome.terminated_early;
        let mut volumes = outcome.volumes;

        let t0 = Instant::now();
        let max_pieces = params.max_convex_hulls as usize;
        if volumes.len() > 1 && (params.merge_hulls || volumes.len() > max_pieces) {
            let threshold = params.merge_hulls.then_some(params.concavity);
            let merged = merge_volumes(&vset, volumes, threshold, max_pieces, &mut budget);
            log::debug!(
                "Merged {} pairs of pieces, {} pieces left.",
                merged.num_merges,
                merged.volumes.len()
            );
            terminated_early |= merged.terminated_early;
            volumes = merged.volumes;
        }
        timings.merging = t0.elapsed();

        let t0 = Instant::now();
        #[cfg(feature = "parallel")]
        let pieces = volumes.par_iter().map(|v| reconstruct(&vset, v, params));
        #[cfg(not(feature = "parallel"))]
        let pieces = volumes.iter().map(|v| reconstruct(&vset, v, params));
        let mut pieces: Vec<ConvexPiece> = pieces.flatten().collect();
        pieces.sort_by_key(|p| p.first_voxel());
        timings.reconstruction = t0.elapsed();

        report.num_pieces = pieces.len();
        report.terminated_early = terminated_early;
        report.timings = timings;
        report.pieces = pieces.iter().map(PieceStats::from).collect();
        report.log(params.verbose);

        Ok(Decomposition {
            pieces,
            terminated_early,
            report,
        })
    }
}

/// Computes the approximate convex decomposition of the given triangle mesh.
///
/// This is a shortcut for [`ConvexDecomposition::compute`].
pub fn decompose(
    points: &[Point<Real>],
    indices: &[[u32; 3]],
    params: &AcdParameters,
) -> Result<Decomposition, AcdError> {
    ConvexDecomposition::compute(points, indices, params)
}

#[cfg(test)]
mod test {
    use super::principal_alignment;
    use crate::math::{Point, Real, Vector};

    #[test]
    fn alignment_maps_principal_axes_to_coordinate_axes() {
        let dir = Vector::new(1.0, 1.0, 0.0).normalize();
        let points: Vec<_> = (0..=10)
            .flat_map(|i| {
                [
                    Point::new(3.0, -2.0, 1.0) + dir * (i as Real),
                    Point::new(3.0, -2.0, 1.2) + dir * (i as Real),
                    Point::new(3.1, -2.1, 1.0) + dir * (i as Real),
                ]
            })
            .collect();

        let transform = principal_alignment(&points);
        assert!(transform.rotation.to_rotation_matrix().matrix().determinant() > 0.0);

        let aligned: Vec<_> = points.iter().map(|p| transform * p).collect();
        let center = crate::utils::center(&aligned);
        assert_relative_eq!(center, Point::origin(), epsilon = 1.0e-4);

        // The spread along x dominates.
        let extent = |dim: usize| {
            let values = aligned.iter().map(|p| p[dim]);
            values.clone().fold(Real::MIN, Real::max) - values.fold(Real::MAX, Real::min)
        };
        assert!(extent(0) > 9.0);
        assert!(extent(1) < 0.5);
        assert!(extent(2) < 0.5);
    }
}
