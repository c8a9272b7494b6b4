//! Approximate convex decomposition of triangle meshes.

pub use self::budget::Budget;
pub use self::concavity::{aspect_degeneracy, compute_concavity, Concavity, MAX_CONCAVITY};
pub use self::convex_decomposition::{
    decompose, principal_alignment, ConvexDecomposition, Decomposition,
};
pub use self::cut_plane::{CutAxis, CutPlane};
pub use self::error::{AcdError, InvalidInputKind};
pub use self::hull::Hull;
pub use self::parameters::AcdParameters;
pub use self::reconstruct::ConvexPiece;
pub use self::report::{DecompositionReport, PieceStats, StageTimings};

mod budget;
mod concavity;
mod convex_decomposition;
mod cut_plane;
mod decomposer;
mod error;
mod hull;
mod merge;
mod parameters;
mod reconstruct;
mod report;
