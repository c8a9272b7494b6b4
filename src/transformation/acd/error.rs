use crate::math::Real;
use crate::shape::TriMeshViewError;

/// The reason why the input of a decomposition was rejected.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq)]
pub enum InvalidInputKind {
    /// The vertex and index buffers do not describe a usable triangle mesh.
    #[error(transparent)]
    Mesh(#[from] TriMeshViewError),
    /// The voxel resolution is zero.
    #[error("The voxel resolution must not be zero.")]
    ZeroResolution,
    /// The concavity threshold is not a finite number in `(0, 1)`.
    #[error("The concavity threshold must be a finite number in (0, 1), got {0}.")]
    Concavity(Real),
    /// A parameter that must be at least 1 is zero.
    #[error("The parameter `{0}` must be at least 1.")]
    ZeroParameter(&'static str),
    /// A real parameter is negative, NaN, or infinite.
    #[error("The parameter `{0}` must be a finite non-negative number.")]
    InvalidWeight(&'static str),
    /// The mesh did not produce a single voxel.
    #[error("The mesh does not cover any voxel.")]
    EmptyVoxelization,
}

/// Errors of the approximate convex decomposition.
///
/// Both variants are fatal: no partial decomposition is returned. Failures local to a single
/// volume (for example a flat volume without a convex hull) are recovered internally and
/// never surface here.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum AcdError {
    /// The mesh or the parameters are unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInputKind),
    /// The voxel grid required by the requested resolution cannot be allocated.
    #[error("Cannot allocate a voxel grid of {requested_cells} cells: {hint}")]
    ResourceExhausted {
        /// The number of grid cells that would have been allocated.
        requested_cells: u64,
        /// A suggestion to recover from this error.
        hint: &'static str,
    },
}

impl AcdError {
    /// The process status code associated to this error.
    ///
    /// A successful decomposition has the status code `0`.
    pub fn status_code(&self) -> i32 {
        match self {
            AcdError::InvalidInput(_) => 1,
            AcdError::ResourceExhausted { .. } => 2,
        }
    }
}

impl From<TriMeshViewError> for AcdError {
    fn from(err: TriMeshViewError) -> Self {
        AcdError::InvalidInput(InvalidInputKind::Mesh(err))
    }
}
