use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::shape::Triangle;

/// A triangle of a hull under construction.
///
/// The `i`-th edge goes from `vertices[i]` to `vertices[(i + 1) % 3]`. It is shared with the
/// facet `neighbors[i]`, where it is that facet's edge number `neighbor_edges[i]`.
#[derive(Debug)]
pub(super) struct Facet {
    pub valid: bool,
    pub degenerate: bool,
    pub normal: Vector<Real>,
    pub vertices: [usize; 3],
    pub neighbors: [usize; 3],
    pub neighbor_edges: [usize; 3],
    /// Points above this facet that are not on the hull yet.
    pub outside_points: Vec<usize>,
}

impl Facet {
    pub fn new(vertices: [usize; 3], points: &[Point<Real>]) -> Self {
        let [a, b, c] = vertices.map(|i| points[i]);
        let triangle = Triangle::new(a, b, c);

        Facet {
            valid: true,
            degenerate: triangle.is_affinely_dependent(),
            normal: triangle
                .scaled_normal()
                .try_normalize(0.0)
                .unwrap_or_else(Vector::zeros),
            vertices,
            neighbors: [0; 3],
            neighbor_edges: [0; 3],
            outside_points: Vec::new(),
        }
    }

    pub fn link(&mut self, neighbors: [usize; 3], neighbor_edges: [usize; 3]) {
        self.neighbors = neighbors;
        self.neighbor_edges = neighbor_edges;
    }

    pub fn edge_start(&self, edge: usize) -> usize {
        self.vertices[edge]
    }

    pub fn edge_end(&self, edge: usize) -> usize {
        self.vertices[(edge + 1) % 3]
    }

    pub fn distance_to(&self, point: usize, points: &[Point<Real>]) -> Real {
        self.normal.dot(&(points[point] - points[self.vertices[0]]))
    }

    /// Is `point` strictly above this facet?
    ///
    /// Degenerate facets see no point.
    pub fn sees(&self, point: usize, points: &[Point<Real>]) -> bool {
        !self.degenerate && self.distance_to(point, points) >= DEFAULT_EPSILON * 100.0
    }

    /// Is `point` above the plane of this facet when measured from any of its vertices?
    ///
    /// The result does not depend on the order of the vertices. Degenerate facets are visible
    /// from everywhere.
    pub fn visible_from(&self, point: usize, points: &[Point<Real>]) -> bool {
        self.degenerate
            || self
                .vertices
                .iter()
                .any(|v| (points[point] - points[*v]).dot(&self.normal) >= 0.0)
    }
}

/// Among `facets`, the one the furthest below `point` that sees it.
pub(super) fn furthest_seeing_facet(
    facets: &[Facet],
    point: usize,
    points: &[Point<Real>],
) -> Option<usize> {
    let mut furthest = None;
    let mut furthest_distance = 0.0;

    for (i, facet) in facets.iter().enumerate() {
        if facet.sees(point, points) {
            let distance = facet.distance_to(point, points);

            if distance > furthest_distance {
                furthest = Some(i);
                furthest_distance = distance;
            }
        }
    }

    furthest
}
