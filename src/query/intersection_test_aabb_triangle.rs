use crate::bounding_volume::Aabb;
use crate::math::{Real, Vector};
use crate::shape::Triangle;

/// Tests if a triangle intersects an AABB.
///
/// This is a separating-axis test over the 13 potential separating axes: the 3 AABB face
/// normals, the triangle normal, and the 9 cross products between the AABB edges and the
/// triangle edges. Touching shapes are reported as intersecting, so the test is conservative.
#[inline]
pub fn intersection_test_aabb_triangle(aabb1: &Aabb, triangle2: &Triangle) -> bool {
    let center = aabb1.center().coords;
    let half_extents = aabb1.half_extents();

    // Work in the local frame of the AABB.
    let a = triangle2.a.coords - center;
    let b = triangle2.b.coords - center;
    let c = triangle2.c.coords - center;

    /*
     *
     * Box face normals.
     *
     */
    for i in 0..3 {
        let min = a[i].min(b[i]).min(c[i]);
        let max = a[i].max(b[i]).max(c[i]);

        if min > half_extents[i] || max < -half_extents[i] {
            return false;
        }
    }

    /*
     *
     * Triangle normal.
     *
     */
    let edges = [b - a, c - b, a - c];
    let normal = edges[0].cross(&edges[1]);

    if !separated_on_axis(&normal, &half_extents, &a, &b, &c) {
        /*
         *
         * Edge-Edge cases.
         *
         */
        for edge in &edges {
            for i in 0..3 {
                let axis = Vector::ith(i, 1.0).cross(edge);

                if separated_on_axis(&axis, &half_extents, &a, &b, &c) {
                    return false;
                }
            }
        }

        true
    } else {
        false
    }
}

fn separated_on_axis(
    axis: &Vector<Real>,
    half_extents: &Vector<Real>,
    a: &Vector<Real>,
    b: &Vector<Real>,
    c: &Vector<Real>,
) -> bool {
    // Degenerate axes (parallel edges, flat triangle) cannot separate anything.
    if axis.norm_squared() == 0.0 {
        return false;
    }

    let pa = axis.dot(a);
    let pb = axis.dot(b);
    let pc = axis.dot(c);
    let radius = half_extents.dot(&axis.abs());

    pa.min(pb).min(pc) > radius || pa.max(pb).max(pc) < -radius
}
