//! Signed volumes of tetrahedra, used to integrate the volume of closed meshes and hulls.

use crate::math::{Matrix, Point, Real};

/// A tetrahedron with 4 vertices.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct Tetrahedron {
    /// The tetrahedron first point.
    pub a: Point<Real>,
    /// The tetrahedron second point.
    pub b: Point<Real>,
    /// The tetrahedron third point.
    pub c: Point<Real>,
    /// The tetrahedron fourth point.
    pub d: Point<Real>,
}

impl Tetrahedron {
    /// Creates a tetrahedron from four points.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>, d: Point<Real>) -> Tetrahedron {
        Tetrahedron { a, b, c, d }
    }

    /// The unsigned volume of this tetrahedron.
    #[inline]
    pub fn volume(&self) -> Real {
        self.signed_volume().abs()
    }

    /// The signed volume of this tetrahedron.
    ///
    /// Positive when `d` lies on the side of the triangle `abc` pointed by `(b - a) × (c - a)`.
    /// Summing the signed volumes of the tetrahedra joining a fixed point to every face of a
    /// closed, outward-oriented mesh gives the volume enclosed by the mesh.
    #[inline]
    pub fn signed_volume(&self) -> Real {
        let edges = Matrix::from_columns(&[self.b - self.a, self.c - self.a, self.d - self.a]);
        edges.determinant() / 6.0
    }
}

#[cfg(test)]
mod test {
    use super::Tetrahedron;
    use crate::math::Point;

    #[test]
    fn signed_volume_follows_orientation() {
        let a = Point::origin();
        let b = Point::new(1.0, 0.0, 0.0);
        let c = Point::new(0.0, 1.0, 0.0);
        let d = Point::new(0.0, 0.0, 1.0);

        assert_relative_eq!(Tetrahedron::new(a, b, c, d).signed_volume(), 1.0 / 6.0);
        assert_relative_eq!(Tetrahedron::new(a, c, b, d).signed_volume(), -1.0 / 6.0);
        assert_relative_eq!(Tetrahedron::new(a, c, b, d).volume(), 1.0 / 6.0);
    }
}
