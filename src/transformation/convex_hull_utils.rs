use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};

/// The support point, in the given direction, of the points indexed by `ids`.
///
/// Returns the position of the support point within `ids`, and its index in `points`. Ties
/// are broken in favor of the first point.
pub fn support_point<I>(
    direction: &Vector<Real>,
    points: &[Point<Real>],
    ids: I,
) -> Option<(usize, usize)>
where
    I: IntoIterator<Item = usize>,
{
    let mut best = None;
    let mut max = -Real::MAX;

    for (nth, id) in ids.into_iter().enumerate() {
        let dot = direction.dot(&points[id].coords);

        if dot > max {
            best = Some((nth, id));
            max = dot;
        }
    }

    best
}

/// The index of the support point of `points` in the given direction.
pub fn support_point_id(direction: &Vector<Real>, points: &[Point<Real>]) -> Option<usize> {
    support_point(direction, points, 0..points.len()).map(|(_, id)| id)
}

/// Centers the points on their bounding box, and scales them so its diagonal has unit length.
pub fn normalize(points: &mut [Point<Real>]) {
    let aabb = Aabb::from_points(points.iter());
    let diag = na::distance(&aabb.mins, &aabb.maxs);
    let center = aabb.center();

    if diag > 0.0 {
        for pt in points.iter_mut() {
            *pt = (*pt - center.coords) / diag;
        }
    }
}
