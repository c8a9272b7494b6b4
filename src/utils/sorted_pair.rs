use std::ops::Deref;

/// A pair of elements stored in increasing order, so that `(a, b)` and `(b, a)` are equal.
///
/// Used as the key of undirected edges, and of pairs of adjacent pieces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SortedPair<T: PartialOrd>([T; 2]);

impl<T: PartialOrd> SortedPair<T> {
    /// Creates the pair of `a` and `b`, whatever their order.
    pub fn new(a: T, b: T) -> Self {
        if a > b {
            SortedPair([b, a])
        } else {
            SortedPair([a, b])
        }
    }
}

impl<T: PartialOrd> Deref for SortedPair<T> {
    type Target = [T; 2];

    fn deref(&self) -> &[T; 2] {
        &self.0
    }
}
