use super::facet::Facet;
use super::ConvexHullError;
use crate::math::{Point, Real};
use crate::utils::SortedPair;
use hashbrown::HashMap;

/// Checks that the neighbors of the facet `ifacet` are valid and link back to it.
pub(super) fn check_facet_links(ifacet: usize, facets: &[Facet]) -> Result<(), ConvexHullError> {
    let facet = &facets[ifacet];

    if facet.neighbors.iter().any(|n| !facets[*n].valid) {
        return Err(ConvexHullError::InternalError(
            "facet adjacent to an invalid facet",
        ));
    }

    for edge in 0..3 {
        let neighbor = &facets[facet.neighbors[edge]];
        let shared = facet.neighbor_edges[edge];

        if neighbor.neighbors[shared] != ifacet
            || neighbor.neighbor_edges[shared] != edge
            || neighbor.edge_start(shared) != facet.edge_end(edge)
            || neighbor.edge_end(shared) != facet.edge_start(edge)
        {
            return Err(ConvexHullError::InternalError("inconsistent facet links"));
        }
    }

    Ok(())
}

/// Checks if a convex-hull is properly formed.
///
/// The hull must have no duplicate vertices, no degenerate triangle, exactly two triangles
/// per edge, and the Euler characteristic of a sphere.
pub fn check_convex_hull(
    points: &[Point<Real>],
    triangles: &[[u32; 3]],
) -> Result<(), ConvexHullError> {
    for i in 0..points.len() {
        if let Some(j) = points[i + 1..].iter().position(|pt| *pt == points[i]) {
            return Err(ConvexHullError::DuplicatePoints(i, i + 1 + j));
        }
    }

    // Number of triangles sharing each edge.
    let mut edges: HashMap<SortedPair<u32>, u32> = HashMap::new();

    for (itri, tri) in triangles.iter().enumerate() {
        if tri[0] == tri[1] || tri[0] == tri[2] || tri[2] == tri[1] {
            return Err(ConvexHullError::InternalError("degenerate hull triangle"));
        }

        for i in 0..3 {
            let (a, b) = (tri[i], tri[(i + 1) % 3]);
            let count = edges.entry(SortedPair::new(a, b)).or_insert(0);
            *count += 1;

            if *count > 2 {
                return Err(ConvexHullError::TJunction(itri, a, b));
            }
        }
    }

    if edges.values().any(|count| *count != 2) {
        return Err(ConvexHullError::UnfinishedTriangle);
    }

    if points.len() + triangles.len() != edges.len() + 2 {
        return Err(ConvexHullError::InternalError(
            "invalid Euler characteristic",
        ));
    }

    Ok(())
}
