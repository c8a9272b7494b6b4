use super::budget::BudgetTracker;
use super::decomposer::AcceptedVolume;
use super::{compute_concavity, Concavity, Hull};
use crate::math::{Point, Real};
use crate::transformation::voxelization::VoxelSet;
use crate::utils::SortedPair;
use hashbrown::HashMap;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

/// The result of merging adjacent volumes.
#[derive(Clone, Debug, Default)]
pub(crate) struct MergeOutcome {
    pub volumes: Vec<AcceptedVolume>,
    pub num_merges: u32,
    pub terminated_early: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct MergeCandidate {
    cost: OrderedFloat<Real>,
    pair: SortedPair<u32>,
    generations: [u32; 2],
}

/// The concavity of the union of two volumes, and the hull of this union.
fn merged_concavity(a: &Concavity, b: &Concavity) -> (Real, Hull) {
    let points: Vec<Point<Real>> = a.hull.points.iter().chain(&b.hull.points).copied().collect();
    let hull = Hull::new(&points);
    (compute_concavity(a.volume + b.volume, hull.volume()), hull)
}

/// The pairs of volumes with at least two voxels sharing a face.
fn adjacent_pairs<'a>(
    vset: &VoxelSet,
    volumes: impl IntoIterator<Item = (u32, &'a AcceptedVolume)>,
) -> BTreeSet<SortedPair<u32>> {
    let volumes: Vec<_> = volumes.into_iter().collect();

    let mut owner = HashMap::with_capacity(volumes.iter().map(|(_, v)| v.num_voxels()).sum());
    for (id, volume) in &volumes {
        for voxel in volume.voxels(vset) {
            let _ = owner.insert(vset.linear_index(&voxel.coords), *id);
        }
    }

    let [ni, nj, nk] = vset.dims();
    let mut pairs = BTreeSet::new();

    for (id, volume) in &volumes {
        for voxel in volume.voxels(vset) {
            let c = voxel.coords;

            for neighbor in [
                Point::new(c.x + 1, c.y, c.z),
                Point::new(c.x, c.y + 1, c.z),
                Point::new(c.x, c.y, c.z + 1),
            ] {
                if neighbor.x >= ni || neighbor.y >= nj || neighbor.z >= nk {
                    continue;
                }

                if let Some(&other) = owner.get(&vset.linear_index(&neighbor)) {
                    if other != *id {
                        let _ = pairs.insert(SortedPair::new(*id, other));
                    }
                }
            }
        }
    }

    pairs
}

/// The volumes being merged, and the queue of the candidate pairs.
///
/// Candidate pairs are lazily invalidated: every merge bumps the generation of the merged
/// volumes, and queued pairs referring to an older generation are skipped when popped.
struct Merger {
    volumes: Vec<Option<AcceptedVolume>>,
    generations: Vec<u32>,
    queue: BinaryHeap<Reverse<MergeCandidate>>,
    num_live: usize,
    num_merges: u32,
}

impl Merger {
    fn new(volumes: Vec<AcceptedVolume>) -> Self {
        let num_live = volumes.len();

        Self {
            generations: vec![0; num_live],
            volumes: volumes.into_iter().map(Some).collect(),
            queue: BinaryHeap::new(),
            num_live,
            num_merges: 0,
        }
    }

    /// Queues the merge of `pair` if the concavity of the union does not exceed `max_cost`.
    fn push(&mut self, pair: SortedPair<u32>, max_cost: Real) {
        let (Some(a), Some(b)) = (
            &self.volumes[pair[0] as usize],
            &self.volumes[pair[1] as usize],
        ) else {
            return;
        };
        let (cost, _) = merged_concavity(&a.eval, &b.eval);

        if cost <= max_cost {
            self.queue.push(Reverse(MergeCandidate {
                cost: OrderedFloat(cost),
                pair,
                generations: [
                    self.generations[pair[0] as usize],
                    self.generations[pair[1] as usize],
                ],
            }));
        }
    }

    /// The cheapest queued pair whose volumes did not change since it was queued.
    fn pop(&mut self) -> Option<[u32; 2]> {
        while let Some(Reverse(candidate)) = self.queue.pop() {
            let [a, b] = *candidate.pair;
            let (ia, ib) = (a as usize, b as usize);

            if candidate.generations == [self.generations[ia], self.generations[ib]]
                && self.volumes[ia].is_some()
                && self.volumes[ib].is_some()
            {
                return Some([a, b]);
            }
        }

        None
    }

    /// Merges the volume `b` into the volume `a`.
    fn merge(&mut self, a: u32, b: u32) {
        let (ia, ib) = (a as usize, b as usize);
        let (Some(mut merged), Some(absorbed)) = (self.volumes[ia].take(), self.volumes[ib].take())
        else {
            return;
        };
        let (_, hull) = merged_concavity(&merged.eval, &absorbed.eval);
        let num_voxels = merged.num_voxels() + absorbed.num_voxels();

        merged.ranges.extend(absorbed.ranges);
        merged.eval = Concavity::with_hull(hull, num_voxels);
        merged.depth = merged.depth.max(absorbed.depth);
        self.volumes[ia] = Some(merged);
        self.generations[ia] += 1;
        self.generations[ib] += 1;
        self.num_live -= 1;
        self.num_merges += 1;
    }

    fn live_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.volumes
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_some())
            .map(|(id, _)| id as u32)
    }

    /// Greedily merges adjacent volumes while the concavity of their union stays under
    /// `threshold`. The pair with the lowest merged concavity is merged first.
    ///
    /// Returns `false` if the budget expired.
    fn merge_adjacent(
        &mut self,
        vset: &VoxelSet,
        threshold: Real,
        budget: &mut BudgetTracker,
    ) -> bool {
        let live = self
            .volumes
            .iter()
            .enumerate()
            .filter_map(|(id, v)| Some((id as u32, v.as_ref()?)));
        let pairs = adjacent_pairs(vset, live);
        let mut neighbors = vec![BTreeSet::new(); self.volumes.len()];

        for pair in &pairs {
            let _ = neighbors[pair[0] as usize].insert(pair[1]);
            let _ = neighbors[pair[1] as usize].insert(pair[0]);
        }

        self.queue.clear();
        for pair in pairs {
            self.push(pair, threshold);
        }

        while let Some([a, b]) = self.pop() {
            if budget.is_expired() {
                return false;
            }

            self.merge(a, b);

            // The merged volume keeps the id `a` and inherits the neighbors of `b`.
            let (ia, ib) = (a as usize, b as usize);
            for n in std::mem::take(&mut neighbors[ib]) {
                let _ = neighbors[n as usize].remove(&b);

                if n != a {
                    let _ = neighbors[n as usize].insert(a);
                    let _ = neighbors[ia].insert(n);
                }
            }
            let _ = neighbors[ia].remove(&b);

            let adjacent: Vec<u32> = neighbors[ia].iter().copied().collect();
            for n in adjacent {
                self.push(SortedPair::new(a, n), threshold);
            }
        }

        true
    }

    /// Merges the pairs of volumes with the lowest merged concavity, adjacent or not, until
    /// at most `max_volumes` volumes are left.
    ///
    /// Returns `false` if the budget expired.
    fn merge_down_to(&mut self, max_volumes: usize, budget: &mut BudgetTracker) -> bool {
        let max_volumes = max_volumes.max(1);

        if self.num_live <= max_volumes {
            return true;
        }

        let ids: Vec<u32> = self.live_ids().collect();
        self.queue.clear();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                self.push(SortedPair::new(*a, *b), Real::MAX);
            }
        }

        while self.num_live > max_volumes {
            if budget.is_expired() {
                return false;
            }

            let Some([a, b]) = self.pop() else {
                break;
            };
            self.merge(a, b);

            let others: Vec<u32> = self.live_ids().filter(|id| *id != a).collect();
            for n in others {
                self.push(SortedPair::new(a, n), Real::MAX);
            }
        }

        true
    }
}

/// Merges the accepted volumes of a decomposition.
///
/// If `threshold` is set, adjacent volumes are first merged while the concavity of their
/// union stays under it. Then, while more than `max_volumes` volumes remain, the pairs with
/// the lowest merged concavity are merged regardless of their adjacency and of the threshold.
pub(crate) fn merge_volumes(
    vset: &VoxelSet,
    volumes: Vec<AcceptedVolume>,
    threshold: Option<Real>,
    max_volumes: usize,
    budget: &mut BudgetTracker,
) -> MergeOutcome {
    let mut merger = Merger::new(volumes);
    let mut completed = true;

    if let Some(threshold) = threshold {
        completed = merger.merge_adjacent(vset, threshold, budget);
    }

    if completed {
        completed = merger.merge_down_to(max_volumes, budget);
    }

    MergeOutcome {
        volumes: merger.volumes.into_iter().flatten().collect(),
        num_merges: merger.num_merges,
        terminated_early: !completed,
    }
}

#[cfg(test)]
mod test {
    use super::{adjacent_pairs, merge_volumes};
    use crate::math::{Isometry, Point};
    use crate::transformation::acd::budget::BudgetTracker;
    use crate::transformation::acd::decomposer::AcceptedVolume;
    use crate::transformation::acd::{Budget, Concavity};
    use crate::transformation::voxelization::{GridFrame, Voxel, VoxelSet};
    use crate::utils::SortedPair;
    use smallvec::SmallVec;

    /// Boxes of voxels given by their min (inclusive) and max (exclusive) corners, each box
    /// being one volume.
    fn boxes(boxes: &[([u32; 3], [u32; 3])]) -> (VoxelSet, Vec<AcceptedVolume>) {
        let mut voxels = Vec::new();
        let mut ranges = Vec::new();

        for (mins, maxs) in boxes {
            let start = voxels.len();
            for k in mins[2]..maxs[2] {
                for j in mins[1]..maxs[1] {
                    for i in mins[0]..maxs[0] {
                        voxels.push(Voxel {
                            coords: Point::new(i, j, k),
                            is_on_surface: true,
                        });
                    }
                }
            }
            ranges.push(start..voxels.len());
        }

        let frame = GridFrame {
            origin: Point::origin(),
            scale: 1.0,
            transform: Isometry::identity(),
        };
        let vset = VoxelSet::new(frame, [32, 32, 32], voxels);
        let volumes = ranges
            .into_iter()
            .map(|range| AcceptedVolume {
                eval: Concavity::evaluate(&vset, range.clone()),
                ranges: SmallVec::from_iter([range]),
                depth: 1,
            })
            .collect();

        (vset, volumes)
    }

    #[test]
    fn adjacency_uses_shared_faces() {
        let (vset, volumes) = boxes(&[
            ([0, 0, 0], [4, 4, 4]),
            ([4, 0, 0], [8, 4, 4]),
            // Only touches the second box along an edge.
            ([8, 4, 0], [12, 8, 4]),
        ]);
        let ids = (0..).zip(&volumes);
        let pairs: Vec<_> = adjacent_pairs(&vset, ids).into_iter().collect();
        assert_eq!(pairs, vec![SortedPair::new(0, 1)]);
    }

    #[test]
    fn aligned_boxes_are_merged() {
        let (vset, volumes) = boxes(&[
            ([0, 0, 0], [4, 4, 4]),
            ([4, 0, 0], [8, 4, 4]),
            ([8, 0, 0], [12, 4, 4]),
        ]);
        let mut budget = BudgetTracker::new(Budget::UNLIMITED);
        let out = merge_volumes(&vset, volumes, Some(0.01), 64, &mut budget);

        assert_eq!(out.num_merges, 2);
        assert_eq!(out.volumes.len(), 1);
        assert_eq!(out.volumes[0].num_voxels(), 3 * 64);
        assert_eq!(out.volumes[0].ranges.len(), 3);
        assert!(out.volumes[0].eval.concavity < 0.01);
    }

    #[test]
    fn concave_unions_are_not_merged() {
        // An L-shape made of two boxes.
        let (vset, volumes) = boxes(&[([0, 0, 0], [12, 3, 3]), ([0, 3, 0], [3, 12, 3])]);
        let mut budget = BudgetTracker::new(Budget::UNLIMITED);
        let out = merge_volumes(&vset, volumes, Some(0.01), 64, &mut budget);

        assert_eq!(out.num_merges, 0);
        assert_eq!(out.volumes.len(), 2);
    }

    #[test]
    fn expired_budget_stops_merging() {
        let (vset, volumes) = boxes(&[([0, 0, 0], [4, 4, 4]), ([4, 0, 0], [8, 4, 4])]);
        let mut budget = BudgetTracker::new(Budget::with_iterations(0));
        let out = merge_volumes(&vset, volumes, Some(0.01), 64, &mut budget);

        assert!(out.terminated_early);
        assert_eq!(out.volumes.len(), 2);
    }

    #[test]
    fn piece_count_is_capped() {
        // Three disjoint boxes: the first two are one voxel apart, the last one is far away.
        let (vset, volumes) = boxes(&[
            ([0, 0, 0], [4, 4, 4]),
            ([5, 0, 0], [9, 4, 4]),
            ([20, 0, 0], [24, 4, 4]),
        ]);
        let mut budget = BudgetTracker::new(Budget::UNLIMITED);
        let out = merge_volumes(&vset, volumes.clone(), Some(0.01), 2, &mut budget);

        assert!(!out.terminated_early);
        assert_eq!(out.num_merges, 1);
        assert_eq!(out.volumes.len(), 2);
        assert_eq!(out.volumes[0].ranges.len(), 2);
        assert_eq!(out.volumes[0].num_voxels(), 2 * 64);
        assert_relative_eq!(out.volumes[0].eval.hull.volume(), 9.0 * 16.0, epsilon = 1.0e-3);

        let out = merge_volumes(&vset, volumes, None, 1, &mut budget);
        assert_eq!(out.num_merges, 2);
        assert_eq!(out.volumes.len(), 1);
        assert_eq!(out.volumes[0].num_voxels(), 3 * 64);
    }
}
