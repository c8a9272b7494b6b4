use super::meshes::unit_cube;
use acd3d::math::{Point, Real};
use acd3d::shape::TriMeshViewError;
use acd3d::transformation::acd::{AcdError, AcdParameters, ConvexDecomposition, InvalidInputKind};

#[test]
fn empty_mesh_is_rejected() {
    let result = ConvexDecomposition::compute(&[], &[], &AcdParameters::DEFAULT);
    let err = result.unwrap_err();

    assert!(matches!(err, AcdError::InvalidInput(_)));
    assert_ne!(err.status_code(), 0);
    assert_eq!(err.status_code(), 1);
}

#[test]
fn out_of_bounds_index_is_rejected() {
    let mut mesh = unit_cube();
    mesh.indices[3][1] = 42;

    let err = ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &AcdParameters::DEFAULT)
        .unwrap_err();
    assert!(matches!(
        err,
        AcdError::InvalidInput(InvalidInputKind::Mesh(
            TriMeshViewError::IndexOutOfBounds { .. }
        ))
    ));
}

#[test]
fn non_finite_vertex_is_rejected() {
    let mut mesh = unit_cube();
    mesh.vertices[5] = Point::new(0.0, Real::NAN, 1.0);

    let err = ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &AcdParameters::DEFAULT)
        .unwrap_err();
    assert!(matches!(
        err,
        AcdError::InvalidInput(InvalidInputKind::Mesh(_))
    ));
}

#[test]
fn invalid_parameters_are_rejected() {
    let mesh = unit_cube();

    for params in [
        AcdParameters {
            concavity: 0.0,
            ..AcdParameters::DEFAULT
        },
        AcdParameters {
            concavity: Real::NAN,
            ..AcdParameters::DEFAULT
        },
        AcdParameters {
            max_convex_hulls: 0,
            ..AcdParameters::DEFAULT
        },
        AcdParameters {
            convex_hull_downsampling: 0,
            ..AcdParameters::DEFAULT
        },
    ] {
        let err = ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params)
            .unwrap_err();
        assert_eq!(err.status_code(), 1);
    }
}
