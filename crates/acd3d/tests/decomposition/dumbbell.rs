use super::meshes::{dumbbell, Mesh};
use acd3d::math::{Isometry, Point, Real, Vector};
use acd3d::transformation::acd::{AcdParameters, ConvexDecomposition, ConvexPiece, Decomposition};

fn params() -> AcdParameters {
    AcdParameters {
        concavity: 0.01,
        ..AcdParameters::DEFAULT
    }
}

fn decompose(mesh: &Mesh, params: &AcdParameters) -> Decomposition {
    ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, params).unwrap()
}

fn assert_convex(piece: &ConvexPiece) {
    let vertices = piece.vertices();
    let tolerance = 1.0e-4 * piece.local_aabb().extents().norm();

    for (i, a) in vertices.iter().enumerate() {
        for b in &vertices[i + 1..] {
            for t in [0.25, 0.5, 0.75] {
                let pt = a + (b - a) * (t as Real);
                assert!(piece.contains_point(&pt, tolerance));
            }
        }
    }

    // The faces are oriented outward.
    let signed_volume: Real = piece
        .indices()
        .iter()
        .map(|idx| {
            let [a, b, c] = idx.map(|i| vertices[i as usize].coords);
            a.dot(&b.cross(&c)) / 6.0
        })
        .sum();
    assert_relative_eq!(signed_volume, piece.volume(), epsilon = 1.0e-3);
}

#[test]
fn dumbbell_is_split_at_the_bar() {
    let mesh = dumbbell();
    let decomposition = decompose(&mesh, &params());

    assert!(decomposition.pieces().len() >= 3);
    assert!(!decomposition.terminated_early());

    for piece in decomposition.pieces() {
        assert!(piece.concavity() <= 0.01);
        assert_convex(piece);
    }

    // Both ends of the dumbbell are covered.
    for pt in [Point::new(0.5, 0.5, 0.5), Point::new(3.5, 0.5, 0.5), Point::new(2.0, 0.5, 0.5)] {
        assert!(decomposition
            .pieces()
            .iter()
            .any(|piece| piece.contains_point(&pt, 1.0e-4)));
    }
}

#[test]
fn pieces_cover_the_mesh() {
    let mesh = dumbbell();
    let decomposition = decompose(&mesh, &params());
    assert!(decomposition.total_volume() >= mesh.volume());
}

#[test]
fn decomposition_is_deterministic() {
    let mesh = dumbbell();
    let first = decompose(&mesh, &params());
    let second = decompose(&mesh, &params());
    assert_eq!(first.pieces(), second.pieces());
}

#[test]
fn pieces_are_sorted_by_first_voxel() {
    let mesh = dumbbell();
    let decomposition = decompose(&mesh, &params());
    let keys: Vec<_> = decomposition
        .pieces()
        .iter()
        .map(|piece| piece.first_voxel())
        .collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn merging_reduces_the_piece_count() {
    let mesh = dumbbell();
    let merged = decompose(&mesh, &params());
    let unmerged = decompose(
        &mesh,
        &AcdParameters {
            merge_hulls: false,
            ..params()
        },
    );

    assert!(merged.pieces().len() <= unmerged.pieces().len());
    assert_eq!(unmerged.report().num_pieces, unmerged.pieces().len());
    assert_eq!(
        merged.report().num_pieces_before_merge,
        unmerged.pieces().len()
    );
}

#[test]
fn disjoint_components_are_decomposed_independently() {
    let mut mesh = Mesh::new();
    let _ = mesh
        .push_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
        .push_box([2.0, 0.0, 0.0], [3.0, 1.0, 1.0]);
    let decomposition = decompose(&mesh, &params());

    assert_eq!(decomposition.report().num_volumes, 2);
    assert_eq!(decomposition.pieces().len(), 2);
    assert!(decomposition.pieces()[0].center().x < 1.0);
    assert!(decomposition.pieces()[1].center().x > 2.0);
}

#[test]
fn piece_count_is_capped_for_disjoint_components() {
    let mut mesh = Mesh::new();
    let _ = mesh
        .push_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
        .push_box([1.5, 0.0, 0.0], [2.5, 1.0, 1.0])
        .push_box([5.0, 0.0, 0.0], [6.0, 1.0, 1.0]);

    for merge_hulls in [true, false] {
        let decomposition = decompose(
            &mesh,
            &AcdParameters {
                max_convex_hulls: 2,
                merge_hulls,
                ..params()
            },
        );

        assert_eq!(decomposition.report().num_volumes, 3);
        assert_eq!(decomposition.pieces().len(), 2);
        assert!(!decomposition.terminated_early());
        assert!(decomposition.total_volume() >= mesh.volume());

        // The two closest cubes share a piece.
        let first = &decomposition.pieces()[0];
        assert!(first.contains_point(&Point::new(0.5, 0.5, 0.5), 1.0e-4));
        assert!(first.contains_point(&Point::new(2.0, 0.5, 0.5), 1.0e-4));
        for piece in decomposition.pieces() {
            assert_convex(piece);
        }
    }
}

#[test]
fn higher_resolutions_do_not_increase_concavity() {
    // Boxes aligned with the grid are voxelized into exact blocks.
    let mut mesh = Mesh::new();
    let _ = mesh
        .push_box([0.0, 0.0, 0.0], [2.0, 1.0, 1.0])
        .push_box([3.0, 0.0, 0.0], [4.0, 0.5, 0.5]);

    let mut previous = Real::MAX;
    for resolution in [10_000, 40_000, 160_000] {
        let decomposition = decompose(
            &mesh,
            &AcdParameters {
                resolution,
                ..params()
            },
        );
        let max_concavity = decomposition.max_concavity();
        assert!(max_concavity <= previous + 1.0e-3);
        previous = max_concavity;
    }
}

#[test]
fn higher_resolutions_do_not_increase_concavity_of_rotated_shapes() {
    // The voxelization of a rotated cube has staircase boundaries, which get finer as the
    // resolution increases.
    let mut mesh = Mesh::new();
    let _ = mesh.push_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let mesh = mesh.transformed(&Isometry::new(Vector::zeros(), Vector::new(0.3, 0.7, -0.4)));

    let mut concavities = Vec::new();
    for resolution in [10_000, 80_000, 640_000] {
        let decomposition = decompose(
            &mesh,
            &AcdParameters {
                resolution,
                concavity: 0.5,
                ..params()
            },
        );
        assert_eq!(decomposition.pieces().len(), 1);
        concavities.push(decomposition.max_concavity());
    }

    assert!(concavities[0] > 0.0);
    assert!(
        concavities.windows(2).all(|w| w[1] <= w[0] + 1.0e-3),
        "concavities: {:?}",
        concavities
    );
    assert!(concavities[2] < concavities[0]);
}
