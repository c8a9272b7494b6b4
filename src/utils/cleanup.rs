use crate::math::{Point, Real};

/// Removes from `points` every point not referenced by `indices`, and remaps `indices`.
///
/// The remaining points keep their relative order.
pub fn remove_unused_points(points: &mut Vec<Point<Real>>, indices: &mut [[u32; 3]]) {
    let mut used = vec![false; points.len()];

    for i in indices.iter().flatten() {
        used[*i as usize] = true;
    }

    let mut remap = vec![0u32; points.len()];
    let mut num_kept = 0;

    for (i, is_used) in used.into_iter().enumerate() {
        if is_used {
            remap[i] = num_kept as u32;
            points[num_kept] = points[i];
            num_kept += 1;
        }
    }

    points.truncate(num_kept);

    for i in indices.iter_mut().flatten() {
        *i = remap[*i as usize];
    }
}
