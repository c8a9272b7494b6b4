use super::{Voxel, VoxelSet};
use crate::math::Point;
use ena::unify::{InPlaceUnificationTable, UnifyKey};
use std::ops::Range;

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
struct IntKey(u32);

impl UnifyKey for IntKey {
    type Value = ();
    fn index(&self) -> u32 {
        self.0
    }
    fn from_index(u: u32) -> IntKey {
        IntKey(u)
    }
    fn tag() -> &'static str {
        "IntKey"
    }
}

/// Reorders the voxels of `vset` so that each 6-connected component occupies a contiguous
/// range, and returns these ranges.
///
/// Two voxels belong to the same component if they are linked by a chain of voxels sharing a
/// face. Voxels touching only along an edge or at a corner are not connected. The components
/// are sorted by their voxel with the smallest index in the memory order of the grid, and the
/// relative order of the voxels of each component is preserved.
pub fn connected_components(vset: &mut VoxelSet) -> Vec<Range<usize>> {
    let num_voxels = vset.len();

    if num_voxels == 0 {
        return Vec::new();
    }

    let mut keys: Vec<(u64, u32)> = vset
        .voxels()
        .iter()
        .enumerate()
        .map(|(i, v)| (vset.linear_index(&v.coords), i as u32))
        .collect();
    keys.sort_unstable();

    let find = |coords: [u32; 3]| -> Option<u32> {
        let [ni, nj, nk] = vset.dims();
        if coords[0] >= ni || coords[1] >= nj || coords[2] >= nk {
            return None;
        }

        let key = vset.linear_index(&coords.into());
        keys.binary_search_by_key(&key, |e| e.0)
            .ok()
            .map(|i| keys[i].1)
    };

    let mut ufind: InPlaceUnificationTable<IntKey> = InPlaceUnificationTable::new();
    for _ in 0..num_voxels {
        let _ = ufind.new_key(());
    }

    for (i, voxel) in vset.voxels().iter().enumerate() {
        let [x, y, z] = [voxel.coords.x, voxel.coords.y, voxel.coords.z];

        for neighbor in [[x + 1, y, z], [x, y + 1, z], [x, y, z + 1]] {
            if let Some(j) = find(neighbor) {
                ufind.union(IntKey(i as u32), IntKey(j));
            }
        }
    }

    // Number the components by their first voxel in memory order.
    let mut component_of_root = vec![u32::MAX; num_voxels];
    let mut component_sizes = Vec::new();
    let mut voxel_component = vec![0u32; num_voxels];

    for &(_, i) in &keys {
        let root = ufind.find(IntKey(i)).0 as usize;

        if component_of_root[root] == u32::MAX {
            component_of_root[root] = component_sizes.len() as u32;
            component_sizes.push(0usize);
        }

        let component = component_of_root[root];
        voxel_component[i as usize] = component;
        component_sizes[component as usize] += 1;
    }

    let mut ranges = Vec::with_capacity(component_sizes.len());
    let mut insertion_points = Vec::with_capacity(component_sizes.len());
    let mut start = 0;

    for size in component_sizes {
        ranges.push(start..start + size);
        insertion_points.push(start);
        start += size;
    }

    let mut reordered = vec![
        Voxel {
            coords: Point::origin(),
            is_on_surface: false,
        };
        num_voxels
    ];

    for (voxel, component) in vset.voxels().iter().zip(voxel_component.iter()) {
        let target = &mut insertion_points[*component as usize];
        reordered[*target] = *voxel;
        *target += 1;
    }

    vset.voxels = reordered;
    ranges
}
