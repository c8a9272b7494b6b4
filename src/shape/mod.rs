//! Shapes used to describe the input of the decomposition.

pub use self::tetrahedron::Tetrahedron;
pub use self::triangle::Triangle;
pub use self::trimesh_view::{TriMeshView, TriMeshViewError};

mod tetrahedron;
mod triangle;
mod trimesh_view;
