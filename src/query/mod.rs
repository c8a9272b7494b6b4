//! Non-persistent geometric queries.
//!
//! # General cases
//! The [`intersection_test_aabb_triangle`] query is the conservative overlap test used to
//! rasterize triangles into the voxel grid. The [`contains_point_convex_polyhedron`] query
//! checks whether a point lies inside of a convex polyhedron described by its boundary.

pub use self::intersection_test_aabb_triangle::intersection_test_aabb_triangle;
pub use self::point_convex_polyhedron::contains_point_convex_polyhedron;

mod intersection_test_aabb_triangle;
mod point_convex_polyhedron;
