use crate::math::{Point, Real};
use hashbrown::HashMap;

/// Merges the vertices of an indexed mesh that are closer than `tolerance` to each other.
///
/// Vertices are bucketed on a grid of cell size `tolerance`; a vertex is merged into the first
/// previously kept vertex found within `tolerance` in its own or in one of the 26 neighboring
/// cells. Triangles that collapse (two identical indices) after welding are removed. The
/// relative order of the kept vertices and triangles is preserved.
///
/// Returns the number of removed vertices.
pub fn weld_vertices(
    points: &mut Vec<Point<Real>>,
    indices: &mut Vec<[u32; 3]>,
    tolerance: Real,
) -> usize {
    if points.is_empty() || tolerance <= 0.0 {
        return 0;
    }

    let inv_cell = 1.0 / tolerance;
    let cell_of = |pt: &Point<Real>| -> [i64; 3] {
        [
            (pt.x * inv_cell).floor() as i64,
            (pt.y * inv_cell).floor() as i64,
            (pt.z * inv_cell).floor() as i64,
        ]
    };

    let mut grid: HashMap<[i64; 3], Vec<u32>> = HashMap::new();
    let mut kept: Vec<Point<Real>> = Vec::with_capacity(points.len());
    let mut remap = vec![0u32; points.len()];
    let sq_tolerance = tolerance * tolerance;

    for (i, pt) in points.iter().enumerate() {
        let cell = cell_of(pt);
        let mut found = None;

        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let key = [cell[0] + dx, cell[1] + dy, cell[2] + dz];
                    if let Some(bucket) = grid.get(&key) {
                        for &candidate in bucket {
                            if na::distance_squared(&kept[candidate as usize], pt)
                                <= sq_tolerance
                            {
                                found = Some(candidate);
                                break 'search;
                            }
                        }
                    }
                }
            }
        }

        remap[i] = match found {
            Some(id) => id,
            None => {
                let id = kept.len() as u32;
                kept.push(*pt);
                grid.entry(cell).or_default().push(id);
                id
            }
        };
    }

    let removed = points.len() - kept.len();
    *points = kept;

    indices.retain_mut(|tri| {
        for k in 0..3 {
            tri[k] = remap[tri[k] as usize];
        }
        tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0]
    });

    removed
}

#[cfg(test)]
mod test {
    use super::weld_vertices;
    use crate::math::Point;

    #[test]
    fn weld_merges_near_duplicates_and_drops_collapsed_faces() {
        let mut points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(1.0e-7, 0.0, 0.0),
        ];
        let mut indices = vec![[0, 1, 2], [3, 1, 2], [0, 3, 1]];

        let removed = weld_vertices(&mut points, &mut indices, 1.0e-5);

        assert_eq!(removed, 1);
        assert_eq!(points.len(), 3);
        assert_eq!(indices, vec![[0, 1, 2], [0, 1, 2]]);
    }
}
