use super::decomposer::AcceptedVolume;
use super::hull::convex_volume;
use super::{AcdParameters, Hull};
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::query::contains_point_convex_polyhedron;
use crate::shape::Triangle;
use crate::transformation::voxelization::VoxelSet;
use crate::utils;

/// A convex piece of a decomposition, expressed in the coordinate space of the input mesh.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexPiece {
    vertices: Vec<Point<Real>>,
    indices: Vec<[u32; 3]>,
    volume: Real,
    concavity: Real,
    num_voxels: usize,
    first_voxel: u64,
}

impl ConvexPiece {
    /// The vertices of this convex hull.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The triangles of this convex hull, oriented counter-clockwise when seen from the
    /// outside.
    #[inline]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// The volume enclosed by this hull.
    #[inline]
    pub fn volume(&self) -> Real {
        self.volume
    }

    /// The concavity of the voxels this piece was built from, relative to their hull.
    #[inline]
    pub fn concavity(&self) -> Real {
        self.concavity
    }

    /// The number of voxels this piece was built from.
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.num_voxels
    }

    /// The smallest linear grid index of the voxels of this piece.
    ///
    /// Pieces are sorted by this index.
    #[inline]
    pub fn first_voxel(&self) -> u64 {
        self.first_voxel
    }

    /// The barycenter of the vertices of this piece.
    pub fn center(&self) -> Point<Real> {
        utils::center(&self.vertices)
    }

    /// The axis-aligned bounding box of this piece.
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    /// Tests if `point` is inside of this piece, up to the given tolerance.
    pub fn contains_point(&self, point: &Point<Real>, tolerance: Real) -> bool {
        contains_point_convex_polyhedron(&self.vertices, &self.indices, point, tolerance)
    }

    /// The vertex and index buffers of this piece.
    pub fn into_parts(self) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        (self.vertices, self.indices)
    }
}

/// Index of the point of `points` maximizing `f`, the first one on ties.
fn argmax(points: &[Point<Real>], f: impl Fn(&Point<Real>) -> Real) -> Option<usize> {
    let mut best: Option<(usize, Real)> = None;

    for (i, pt) in points.iter().enumerate() {
        let value = f(pt);
        if best.map_or(true, |(_, best_value)| value > best_value) {
            best = Some((i, value));
        }
    }

    best.map(|(i, _)| i)
}

/// The largest distance between `pt` and the planes of the faces of `hull` it lies in front
/// of, or a non-positive number if it is inside of the hull.
fn distance_to_hull(hull: &Hull, pt: &Point<Real>) -> Real {
    let mut result = -Real::MAX;

    for idx in &hull.indices {
        let tri = Triangle::new(
            hull.points[idx[0] as usize],
            hull.points[idx[1] as usize],
            hull.points[idx[2] as usize],
        );

        if let Some(normal) = tri.normal() {
            result = result.max(normal.dot(&(*pt - tri.a)));
        }
    }

    result
}

/// Selects at most `max_vertices` vertices of `hull` by greedy farthest-point insertion.
///
/// The four first vertices span a tetrahedron as large as possible. Vertices are then added
/// one at a time, the one farthest outside of the current hull first, until the volume gained
/// by a vertex is smaller than `min_volume_ratio` times the volume of `hull`.
pub(crate) fn reduce_vertices(hull: &Hull, max_vertices: u32, min_volume_ratio: Real) -> Hull {
    let max_vertices = max_vertices.max(4) as usize;
    let points = &hull.points;

    if points.len() <= max_vertices {
        return hull.clone();
    }

    let center = utils::center(points);
    let seeds = (|| {
        let a = points[argmax(points, |p| na::distance_squared(p, &center))?];
        let b = points[argmax(points, |p| na::distance_squared(p, &a))?];
        let ab = b - a;
        let c = points[argmax(points, |p| (*p - a).cross(&ab).norm_squared())?];
        let normal = ab.cross(&(c - a));
        let d = points[argmax(points, |p| normal.dot(&(*p - a)).abs())?];
        Some(vec![a, b, c, d])
    })();

    let Some(mut selected) = seeds else {
        return hull.clone();
    };

    let min_gain = min_volume_ratio * hull.volume();
    let mut current = Hull::new(&selected);

    while selected.len() < max_vertices {
        let Some(best) = argmax(points, |p| distance_to_hull(&current, p)) else {
            break;
        };

        if distance_to_hull(&current, &points[best]) <= 0.0 {
            break;
        }

        selected.push(points[best]);
        let next = Hull::new(&selected);
        let gain = next.volume() - current.volume();
        current = next;

        if gain < min_gain {
            break;
        }
    }

    current
}

/// Converts an accepted volume into a convex piece expressed in mesh space.
///
/// Returns `None` if the hull of the volume is empty.
pub(crate) fn reconstruct(
    vset: &VoxelSet,
    volume: &AcceptedVolume,
    params: &AcdParameters,
) -> Option<ConvexPiece> {
    let hull = match params.max_vertices_per_hull {
        Some(max_vertices) => {
            reduce_vertices(&volume.eval.hull, max_vertices, params.min_volume_per_hull)
        }
        None => volume.eval.hull.clone(),
    };

    if hull.is_empty() {
        log::debug!("Discarding a volume with an empty hull.");
        return None;
    }

    let frame = vset.frame();
    let mut vertices: Vec<_> = hull.points.iter().map(|pt| frame.to_mesh(pt)).collect();
    let mut indices = hull.indices;

    let _ = utils::weld_vertices(&mut vertices, &mut indices, frame.scale * 1.0e-3);
    utils::remove_unused_points(&mut vertices, &mut indices);

    // Orient every face outward.
    let centroid = utils::center(&vertices);
    for idx in &mut indices {
        let tri = Triangle::new(
            vertices[idx[0] as usize],
            vertices[idx[1] as usize],
            vertices[idx[2] as usize],
        );

        if let Some(normal) = tri.normal() {
            if normal.dot(&(tri.center() - centroid)) < 0.0 {
                idx.swap(1, 2);
            }
        }
    }

    let first_voxel = volume
        .voxels(vset)
        .map(|voxel| vset.linear_index(&voxel.coords))
        .min()
        .unwrap_or(u64::MAX);

    Some(ConvexPiece {
        volume: convex_volume(&vertices, &indices),
        vertices,
        indices,
        concavity: volume.eval.concavity,
        num_voxels: volume.num_voxels(),
        first_voxel,
    })
}
