use super::meshes::unit_cube;
use acd3d::transformation::acd::{AcdError, AcdParameters, ConvexDecomposition, InvalidInputKind};
use acd3d::transformation::voxelization::{FillMode, VoxelGrid, MAX_RESOLUTION, MIN_RESOLUTION};

#[test]
fn zero_resolution_is_rejected() {
    let mesh = unit_cube();
    let params = AcdParameters {
        resolution: 0,
        ..AcdParameters::DEFAULT
    };
    let err = ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params).unwrap_err();

    assert_eq!(
        err,
        AcdError::InvalidInput(InvalidInputKind::ZeroResolution)
    );
    assert_eq!(err.status_code(), 1);
}

#[test]
fn minimal_resolution_succeeds() {
    let mesh = unit_cube();
    let params = AcdParameters {
        resolution: MIN_RESOLUTION,
        concavity: 0.05,
        ..AcdParameters::DEFAULT
    };
    let decomposition =
        ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params).unwrap();
    assert_eq!(decomposition.pieces().len(), 1);
}

#[test]
fn too_small_resolution_is_clamped() {
    let mesh = unit_cube();
    let params = AcdParameters {
        resolution: 10,
        concavity: 0.05,
        ..AcdParameters::DEFAULT
    };
    let decomposition =
        ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params).unwrap();

    let [ni, nj, nk] = decomposition.report().grid_dims;
    assert!(ni as u64 * nj as u64 * nk as u64 >= MIN_RESOLUTION as u64);
}

#[test]
fn maximal_resolution_succeeds() {
    let mesh = unit_cube();
    let grid = VoxelGrid::voxelize(
        &mesh.vertices,
        &mesh.indices,
        MAX_RESOLUTION,
        FillMode::SurfaceOnly,
    )
    .unwrap();

    let [ni, nj, nk] = grid.dims();
    assert!(ni as u64 * nj as u64 * nk as u64 >= MAX_RESOLUTION as u64);
    assert!(grid.num_voxels_on_surface() > 0);
    assert_eq!(grid.num_voxels_inside_surface(), 0);
}

#[test]
fn maximal_resolution_decomposition_succeeds() {
    let mesh = unit_cube();
    let params = AcdParameters {
        resolution: MAX_RESOLUTION,
        concavity: 0.05,
        ..AcdParameters::DEFAULT
    };
    let decomposition =
        ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params).unwrap();

    let [ni, nj, nk] = decomposition.report().grid_dims;
    assert!(ni as u64 * nj as u64 * nk as u64 >= MAX_RESOLUTION as u64);
    assert_eq!(decomposition.status_code(), 0);
    assert_eq!(decomposition.pieces().len(), 1);
    assert!(decomposition.pieces()[0].concavity() < 0.05);
}
