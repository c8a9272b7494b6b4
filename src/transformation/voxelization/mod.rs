//! Voxelization of a 3D triangle mesh, and extraction of its connected volumes.

pub use self::connected_components::connected_components;
pub use self::voxel_grid::{
    clamp_resolution, FillMode, GridFrame, VoxelGrid, VoxelValue, MAX_RESOLUTION,
    MIN_RESOLUTION,
};
pub(crate) use self::voxel_set::partition;
pub use self::voxel_set::{ClippedVolumes, Voxel, VoxelSet};

mod connected_components;
mod voxel_grid;
mod voxel_set;
