//! Various unsorted geometrical and logical operators.

pub use self::center::center;
pub use self::cleanup::remove_unused_points;
pub use self::cov::{center_cov, cov};
pub(crate) use self::sort::sort3;
pub use self::sorted_pair::SortedPair;
pub use self::weld::weld_vertices;

mod center;
mod cleanup;
mod cov;
mod sort;
mod sorted_pair;
mod weld;
