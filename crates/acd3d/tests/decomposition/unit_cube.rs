use super::meshes::unit_cube;
use acd3d::math::Point;
use acd3d::transformation::acd::{AcdParameters, ConvexDecomposition};

fn params() -> AcdParameters {
    AcdParameters {
        resolution: 10_000,
        concavity: 0.05,
        ..AcdParameters::DEFAULT
    }
}

#[test]
fn unit_cube_is_a_single_piece() {
    let mesh = unit_cube();
    let decomposition =
        ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params()).unwrap();

    assert_eq!(decomposition.status_code(), 0);
    assert!(!decomposition.terminated_early());
    assert_eq!(decomposition.pieces().len(), 1);

    let piece = &decomposition.pieces()[0];
    assert!(piece.concavity() < 1.0e-3);
    assert!(piece.volume() >= mesh.volume());
    assert!(piece.volume() < 1.5);

    for pt in &mesh.vertices {
        assert!(piece.contains_point(pt, 1.0e-3));
    }
    assert!(!piece.contains_point(&Point::new(1.5, 0.5, 0.5), 1.0e-3));
}

#[test]
fn report_matches_the_result() {
    let mesh = unit_cube();
    let decomposition =
        ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params()).unwrap();
    let report = decomposition.report();

    let [ni, nj, nk] = report.grid_dims;
    let num_cells = ni as u64 * nj as u64 * nk as u64;
    assert!(num_cells >= 10_000);
    assert!(num_cells < 40_000);
    assert_eq!(report.num_volumes, 1);
    assert_eq!(report.num_pieces, 1);
    assert_eq!(report.pieces.len(), 1);
    assert_eq!(report.num_evaluations, 1);
    assert!(report.num_surface_voxels > 0);
    assert!(report.num_inside_voxels > 0);
    assert!(report.to_string().contains("# pieces = 1"));
}

#[test]
fn vertex_count_is_limited() {
    let mesh = unit_cube();
    let params = AcdParameters {
        max_vertices_per_hull: Some(6),
        ..params()
    };
    let decomposition =
        ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params).unwrap();

    let piece = &decomposition.pieces()[0];
    assert!(piece.vertices().len() <= 6);
    assert!(piece.vertices().len() >= 4);
    assert!(piece.volume() > 0.0);
}
