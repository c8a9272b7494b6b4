use super::meshes::dumbbell;
use acd3d::transformation::acd::{AcdParameters, Budget, ConvexDecomposition};
use std::time::Duration;

#[test]
fn exhausted_iterations_terminate_early() {
    let mesh = dumbbell();
    let params = AcdParameters {
        concavity: 0.01,
        budget: Budget::with_iterations(1),
        ..AcdParameters::DEFAULT
    };
    let decomposition =
        ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params).unwrap();

    assert_eq!(decomposition.status_code(), 0);
    assert!(decomposition.terminated_early());
    assert!(decomposition.report().terminated_early);
    assert_eq!(decomposition.pieces().len(), 1);
    assert!(decomposition.total_volume() >= mesh.volume());
}

#[test]
fn expired_deadline_terminates_early() {
    let mesh = dumbbell();
    let params = AcdParameters {
        concavity: 0.01,
        budget: Budget::with_duration(Duration::ZERO),
        ..AcdParameters::DEFAULT
    };
    let decomposition =
        ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params).unwrap();

    assert!(decomposition.terminated_early());
    assert!(!decomposition.pieces().is_empty());
}

#[test]
fn generous_budget_does_not_terminate_early() {
    let mesh = dumbbell();
    let params = AcdParameters {
        concavity: 0.01,
        budget: Budget::with_duration(Duration::from_secs(3600)),
        ..AcdParameters::DEFAULT
    };
    let decomposition =
        ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params).unwrap();

    assert!(!decomposition.terminated_early());
    assert!(decomposition.pieces().len() >= 3);
}
