use super::meshes::Mesh;
use acd3d::math::{Isometry, Vector};
use acd3d::transformation::acd::{AcdParameters, ConvexDecomposition};

fn rotated_box() -> Mesh {
    let mut mesh = Mesh::new();
    let _ = mesh.push_box([-1.0, -0.5, -0.25], [1.0, 0.5, 0.25]);
    mesh.transformed(&Isometry::new(
        Vector::new(1.0, 2.0, 3.0),
        Vector::new(0.3, 0.7, -0.4),
    ))
}

#[test]
fn aligned_box_is_a_single_piece_in_mesh_space() {
    let mesh = rotated_box();
    let params = AcdParameters {
        resolution: 10_000,
        concavity: 0.1,
        pca: true,
        ..AcdParameters::DEFAULT
    };
    let decomposition =
        ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params).unwrap();

    assert_eq!(decomposition.pieces().len(), 1);

    let piece = &decomposition.pieces()[0];
    assert!(piece.volume() >= mesh.volume());
    assert!(piece.volume() < 1.5);

    for pt in &mesh.vertices {
        assert!(piece.contains_point(pt, 1.0e-3));
    }

    // The piece is expressed in the original frame, around the center of the box.
    let center = piece.local_aabb().center();
    assert_relative_eq!(center.coords, Vector::new(1.0, 2.0, 3.0), epsilon = 0.1);
}

#[test]
fn alignment_does_not_change_the_covered_volume() {
    let mesh = rotated_box();
    let params = AcdParameters {
        resolution: 10_000,
        concavity: 0.1,
        ..AcdParameters::DEFAULT
    };

    for pca in [false, true] {
        let decomposition = ConvexDecomposition::compute(
            &mesh.vertices,
            &mesh.indices,
            &AcdParameters { pca, ..params },
        )
        .unwrap();
        assert!(decomposition.total_volume() >= mesh.volume());
    }
}
