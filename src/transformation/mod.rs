//! Convex hulls, voxelization, and approximate convex decomposition of meshes.

pub use self::convex_hull3::{check_convex_hull, try_convex_hull, ConvexHullError};

pub(crate) mod convex_hull_utils;
mod convex_hull3;

/// Approximate convex decomposition of triangle meshes.
pub mod acd;
pub mod export;
/// Voxelization of a 3D triangle mesh.
pub mod voxelization;

#[cfg(feature = "wavefront")]
pub mod wavefront;
