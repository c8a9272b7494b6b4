use crate::math::{Point, Real};
use crate::shape::Triangle;

/// Tests if `point` lies inside of the convex polyhedron described by `vertices` and `indices`.
///
/// The triangles must be oriented counter-clockwise when seen from the outside. A point at a
/// distance smaller than `tolerance` from the boundary is considered inside. Triangles with a
/// zero area are ignored. A polyhedron without any non-degenerate triangle contains no point.
pub fn contains_point_convex_polyhedron(
    vertices: &[Point<Real>],
    indices: &[[u32; 3]],
    point: &Point<Real>,
    tolerance: Real,
) -> bool {
    let mut num_planes = 0;

    for idx in indices {
        let tri = Triangle::new(
            vertices[idx[0] as usize],
            vertices[idx[1] as usize],
            vertices[idx[2] as usize],
        );

        if let Some(normal) = tri.normal() {
            num_planes += 1;

            if normal.dot(&(*point - tri.a)) > tolerance {
                return false;
            }
        }
    }

    num_planes > 0
}

#[cfg(test)]
mod test {
    use super::contains_point_convex_polyhedron;
    use crate::bounding_volume::Aabb;
    use crate::math::Point;

    #[test]
    fn point_in_box_polyhedron() {
        let aabb = Aabb::new(Point::origin(), Point::new(1.0, 2.0, 3.0));
        let vertices = aabb.vertices();
        let indices = Aabb::triangles();

        assert!(contains_point_convex_polyhedron(
            &vertices,
            &indices,
            &Point::new(0.5, 1.0, 1.5),
            0.0
        ));
        assert!(contains_point_convex_polyhedron(
            &vertices,
            &indices,
            &Point::new(1.0, 2.0, 3.0),
            1.0e-5
        ));
        assert!(!contains_point_convex_polyhedron(
            &vertices,
            &indices,
            &Point::new(1.1, 1.0, 1.5),
            1.0e-5
        ));
    }
}
