use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::shape::{Tetrahedron, Triangle};

/// Indicates why a vertex buffer and index buffer do not describe a usable triangle mesh.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriMeshViewError {
    /// A triangle mesh must contain at least one triangle.
    #[error("A triangle mesh must contain at least one triangle.")]
    EmptyIndices,
    /// A triangle references a vertex that does not exist.
    #[error("Triangle {triangle} references vertex {index}, but only {num_vertices} vertices exist.")]
    IndexOutOfBounds {
        /// The faulty triangle.
        triangle: usize,
        /// The out-of-bounds vertex index.
        index: u32,
        /// The number of vertices of the mesh.
        num_vertices: usize,
    },
    /// A vertex has a NaN or infinite coordinate.
    #[error("Vertex {0} has a non-finite coordinate.")]
    NonFiniteVertex(u32),
    /// Every triangle of the mesh has a zero area.
    #[error("Every triangle of the mesh is degenerate.")]
    AllTrianglesDegenerate,
}

/// A validated, borrowed view of a triangle mesh.
///
/// Constructing a view checks that every index is in bounds, that every referenced vertex is
/// finite, and that at least one triangle has a non-zero area. The mesh does not need to be
/// manifold, but it should be closed for its inside to be well defined.
#[derive(Copy, Clone, Debug)]
pub struct TriMeshView<'a> {
    points: &'a [Point<Real>],
    indices: &'a [[u32; 3]],
    num_degenerate_triangles: usize,
}

impl<'a> TriMeshView<'a> {
    /// Validates the given vertex and index buffers.
    pub fn new(
        points: &'a [Point<Real>],
        indices: &'a [[u32; 3]],
    ) -> Result<Self, TriMeshViewError> {
        if indices.is_empty() {
            return Err(TriMeshViewError::EmptyIndices);
        }

        for (triangle, idx) in indices.iter().enumerate() {
            for &index in idx {
                match points.get(index as usize) {
                    None => {
                        return Err(TriMeshViewError::IndexOutOfBounds {
                            triangle,
                            index,
                            num_vertices: points.len(),
                        })
                    }
                    Some(pt) if !pt.coords.iter().all(|e| e.is_finite()) => {
                        return Err(TriMeshViewError::NonFiniteVertex(index))
                    }
                    Some(_) => {}
                }
            }
        }

        let mut result = TriMeshView {
            points,
            indices,
            num_degenerate_triangles: 0,
        };

        result.num_degenerate_triangles = result
            .triangles()
            .filter(|tri| tri.is_affinely_dependent())
            .count();

        if result.num_degenerate_triangles == indices.len() {
            return Err(TriMeshViewError::AllTrianglesDegenerate);
        }

        Ok(result)
    }

    /// The vertex buffer of this mesh.
    #[inline]
    pub fn points(&self) -> &'a [Point<Real>] {
        self.points
    }

    /// The index buffer of this mesh.
    #[inline]
    pub fn indices(&self) -> &'a [[u32; 3]] {
        self.indices
    }

    /// The `i`-th triangle of this mesh.
    #[inline]
    pub fn triangle(&self, i: usize) -> Triangle {
        let idx = self.indices[i];
        Triangle::new(
            self.points[idx[0] as usize],
            self.points[idx[1] as usize],
            self.points[idx[2] as usize],
        )
    }

    /// An iterator through all the triangles of this mesh.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Triangle> + '_ {
        (0..self.indices.len()).map(move |i| self.triangle(i))
    }

    /// The number of triangles with a zero area.
    #[inline]
    pub fn num_degenerate_triangles(&self) -> usize {
        self.num_degenerate_triangles
    }

    /// The AABB of the vertices referenced by at least one triangle.
    pub fn local_aabb(&self) -> Aabb {
        let mut aabb = Aabb::new_invalid();

        for idx in self.indices {
            for &i in idx {
                aabb.take_point(self.points[i as usize]);
            }
        }

        aabb
    }

    /// The signed volume enclosed by this mesh.
    ///
    /// Positive if the mesh is closed and its triangles are oriented counter-clockwise when
    /// seen from the outside.
    pub fn signed_volume(&self) -> Real {
        let reference = self.local_aabb().center();
        self.triangles()
            .map(|tri| Tetrahedron::new(reference, tri.a, tri.b, tri.c).signed_volume())
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::{TriMeshView, TriMeshViewError};
    use crate::bounding_volume::Aabb;
    use crate::math::{Point, Real};

    #[test]
    fn view_rejects_invalid_buffers() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(Real::NAN, 0.0, 0.0),
        ];

        assert_eq!(
            TriMeshView::new(&points, &[]).err(),
            Some(TriMeshViewError::EmptyIndices)
        );
        assert_eq!(
            TriMeshView::new(&points, &[[0, 1, 7]]).err(),
            Some(TriMeshViewError::IndexOutOfBounds {
                triangle: 0,
                index: 7,
                num_vertices: 4
            })
        );
        assert_eq!(
            TriMeshView::new(&points, &[[0, 1, 3]]).err(),
            Some(TriMeshViewError::NonFiniteVertex(3))
        );
        assert_eq!(
            TriMeshView::new(&points, &[[0, 0, 1]]).err(),
            Some(TriMeshViewError::AllTrianglesDegenerate)
        );
        assert!(TriMeshView::new(&points, &[[0, 0, 1], [0, 1, 2]]).is_ok());
    }

    #[test]
    fn box_mesh_volume() {
        let aabb = Aabb::new(Point::new(-1.0, 0.0, 2.0), Point::new(1.0, 3.0, 3.0));
        let vertices = aabb.vertices();
        let indices = Aabb::triangles();
        let view = TriMeshView::new(&vertices, &indices).unwrap();

        assert_eq!(view.num_degenerate_triangles(), 0);
        assert_relative_eq!(view.signed_volume(), 6.0, epsilon = 1.0e-4);
    }
}
