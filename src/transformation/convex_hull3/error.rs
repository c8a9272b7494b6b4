/// Errors that can occur during convex hull computation.
///
/// The hull is built incrementally, adding one point at a time. The computation fails if
/// the input is degenerate (too few points, all points coplanar) or invalid (NaN values), or
/// if float rounding makes the incremental construction inconsistent.
///
/// Within a decomposition these errors are local to a single volume: the volume falls back to
/// its bounding box instead of failing the whole computation.
///
/// ```
/// # #[cfg(feature = "f32")] {
/// use acd3d::transformation::{try_convex_hull, ConvexHullError};
/// use acd3d::math::Point;
///
/// let coplanar = vec![
///     Point::origin(),
///     Point::new(1.0, 0.0, 0.0),
///     Point::new(0.0, 1.0, 0.0),
///     Point::new(1.0, 1.0, 0.0),
/// ];
///
/// assert_eq!(
///     try_convex_hull(&coplanar).err(),
///     Some(ConvexHullError::MissingSupportPoint)
/// );
/// # }
/// ```
#[derive(thiserror::Error, Debug, PartialEq, Eq, Copy, Clone)]
pub enum ConvexHullError {
    /// An internal error occurred during convex hull computation.
    ///
    /// This is caused by float rounding on nearly-degenerate inputs that left the incremental
    /// construction in an inconsistent state.
    #[error("Internal error: {0}")]
    InternalError(&'static str),
    /// The input points are either invalid (NaN) or all lie on a plane, a line, or a point.
    #[error("Input points are either invalid (NaN) or are almost coplanar.")]
    MissingSupportPoint,
    /// Less than 4 points were given to the convex-hull algorithm.
    #[error("Less than 4 points were given to the convex-hull algorithm.")]
    IncompleteInput,
    /// An edge of the resulting mesh has only one adjacent triangle.
    #[error("Detected unfinished triangle")]
    UnfinishedTriangle,
    /// An edge of the resulting mesh has more than two adjacent triangles.
    #[error("Detected t-junction for triangle {0}, edge: ({1}, {2})")]
    TJunction(usize, u32, u32),
    /// The resulting mesh contains two identical vertices.
    #[error("Detected duplicate points {0} and {1}")]
    DuplicatePoints(usize, usize),
}
