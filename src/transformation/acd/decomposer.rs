// Recursive volume splitting derived from the decomposition loop of V-HACD, by Khaled Mamou
// (BSD-3-Clause, https://github.com/kmammou/v-hacd).

use super::budget::BudgetTracker;
use super::cut_plane::PlaneSearch;
use super::{AcdParameters, Concavity, CutPlane};
use crate::transformation::voxelization::{partition, Voxel, VoxelSet};
use smallvec::SmallVec;
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The index of a volume record in the arena of a [`Decomposer`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct VolumeId(u32);

#[derive(Clone, Debug)]
enum VolumeState {
    /// Waiting for its hull and concavity.
    Candidate,
    /// Its concavity is known, but it is not decided yet whether it is split.
    Evaluated(Concavity),
    /// Kept as a convex piece.
    Accepted(Concavity),
    /// Replaced by its two children.
    Split,
}

#[derive(Clone, Debug)]
struct VolumeRecord {
    range: Range<usize>,
    depth: u32,
    state: VolumeState,
}

/// A volume kept as a convex piece.
#[derive(Clone, Debug)]
pub(crate) struct AcceptedVolume {
    /// The ranges of the voxel arena owned by this volume. A volume has more than one range
    /// after hull merging.
    pub ranges: SmallVec<[Range<usize>; 2]>,
    pub eval: Concavity,
    pub depth: u32,
}

impl AcceptedVolume {
    pub fn num_voxels(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    /// The voxels of this volume, taken from the arena `vset`.
    pub fn voxels<'a>(&'a self, vset: &'a VoxelSet) -> impl Iterator<Item = &'a Voxel> + 'a {
        self.ranges
            .iter()
            .flat_map(move |range| &vset.voxels()[range.clone()])
    }
}

/// The result of the recursive splitting of all the volumes.
#[derive(Clone, Debug, Default)]
pub(crate) struct SplitOutcome {
    pub volumes: Vec<AcceptedVolume>,
    pub num_evaluations: u32,
    pub num_splits: u32,
    pub max_depth: u32,
    pub terminated_early: bool,
}

/// Splits volumes until they are convex enough or a limit is reached.
///
/// The volumes are processed level by level. The volumes of a level are evaluated in
/// parallel, the decision of splitting them is taken sequentially in the order of their ids,
/// and the split volumes are then partitioned in parallel since they own disjoint slices of
/// the voxel arena.
pub(crate) struct Decomposer<'a> {
    params: &'a AcdParameters,
    max_depth: u32,
    records: Vec<VolumeRecord>,
    accepted: Vec<VolumeId>,
    num_splits: u32,
    terminated_early: bool,
}

impl<'a> Decomposer<'a> {
    pub fn new(params: &'a AcdParameters) -> Self {
        Self {
            params,
            max_depth: params.recursion_depth(),
            records: Vec::new(),
            accepted: Vec::new(),
            num_splits: 0,
            terminated_early: false,
        }
    }

    fn push_candidate(&mut self, range: Range<usize>, depth: u32) -> VolumeId {
        let id = VolumeId(self.records.len() as u32);
        self.records.push(VolumeRecord {
            range,
            depth,
            state: VolumeState::Candidate,
        });
        id
    }

    /// Decomposes the volumes occupying `components` in the voxel arena.
    pub fn run(
        mut self,
        vset: &mut VoxelSet,
        components: Vec<Range<usize>>,
        budget: &mut BudgetTracker,
    ) -> SplitOutcome {
        let mut level: Vec<VolumeId> = components
            .into_iter()
            .map(|range| self.push_candidate(range, 0))
            .collect();

        while !level.is_empty() {
            self.evaluate_level(vset, &level, budget);
            let to_split = self.decide_level(&level, budget);
            level = self.split_level(vset, &to_split);
        }

        let mut max_depth = 0;
        let volumes = self
            .accepted
            .iter()
            .filter_map(|id| {
                let record = &self.records[id.0 as usize];
                max_depth = max_depth.max(record.depth);

                match &record.state {
                    VolumeState::Accepted(eval) => Some(AcceptedVolume {
                        ranges: SmallVec::from_iter([record.range.clone()]),
                        eval: eval.clone(),
                        depth: record.depth,
                    }),
                    _ => None,
                }
            })
            .collect();

        SplitOutcome {
            volumes,
            num_evaluations: budget.iterations(),
            num_splits: self.num_splits,
            max_depth,
            terminated_early: self.terminated_early,
        }
    }

    /// Computes the hull and concavity of every volume of the level.
    fn evaluate_level(&mut self, vset: &VoxelSet, level: &[VolumeId], budget: &mut BudgetTracker) {
        let records = &self.records;
        let evaluate = |id: &VolumeId| {
            let range = records[id.0 as usize].range.clone();
            Concavity::evaluate(vset, range)
        };

        #[cfg(feature = "parallel")]
        let evals: Vec<_> = level.par_iter().map(evaluate).collect();
        #[cfg(not(feature = "parallel"))]
        let evals: Vec<_> = level.iter().map(evaluate).collect();

        budget.record_iterations(level.len());

        for (id, eval) in level.iter().zip(evals) {
            self.records[id.0 as usize].state = VolumeState::Evaluated(eval);
        }
    }

    /// Accepts the volumes of the level that must not be split, and returns the others.
    fn decide_level(&mut self, level: &[VolumeId], budget: &mut BudgetTracker) -> Vec<VolumeId> {
        let mut to_split = Vec::new();

        for (i, id) in level.iter().enumerate() {
            let record = &mut self.records[id.0 as usize];
            let VolumeState::Evaluated(eval) = &record.state else {
                continue;
            };

            // The number of pieces if this volume is split and none of the undecided volumes
            // of this level is.
            let undecided = level.len() - i - 1;
            let projected_pieces =
                self.accepted.len() + 2 * to_split.len() + undecided + 2;

            let accept = if eval.concavity <= self.params.concavity {
                true
            } else if record.range.len() < self.params.min_voxels_per_volume as usize {
                true
            } else if record.depth >= self.max_depth {
                true
            } else if projected_pieces > self.params.max_convex_hulls as usize {
                true
            } else if budget.is_expired() {
                self.terminated_early = true;
                true
            } else {
                false
            };

            if accept {
                self.accept(*id);
            } else {
                to_split.push(*id);
            }
        }

        to_split
    }

    fn accept(&mut self, id: VolumeId) {
        let record = &mut self.records[id.0 as usize];
        let state = std::mem::replace(&mut record.state, VolumeState::Split);

        if let VolumeState::Evaluated(eval) = state {
            record.state = VolumeState::Accepted(eval);
            self.accepted.push(id);
        } else {
            record.state = state;
        }
    }

    /// Finds the best cut of every volume to split, partitions their voxels, and returns the
    /// children.
    fn split_level(&mut self, vset: &mut VoxelSet, to_split: &[VolumeId]) -> Vec<VolumeId> {
        let params = self.params;
        let planes: Vec<Option<CutPlane>> = {
            let records = &self.records;
            let vset = &*vset;
            let search = |id: &VolumeId| {
                let record = &records[id.0 as usize];
                match &record.state {
                    VolumeState::Evaluated(eval) => {
                        PlaneSearch::new(vset, record.range.clone(), eval, params).run()
                    }
                    _ => None,
                }
            };

            #[cfg(feature = "parallel")]
            let planes = to_split.par_iter().map(search).collect();
            #[cfg(not(feature = "parallel"))]
            let planes = to_split.iter().map(search).collect();
            planes
        };

        let mut cuts = Vec::with_capacity(to_split.len());

        for (id, plane) in to_split.iter().zip(planes) {
            match plane {
                Some(plane) => cuts.push((*id, plane)),
                None => {
                    log::debug!(
                        "No plane splits the volume {:?} in two, accepting it.",
                        self.records[id.0 as usize].range
                    );
                    self.accept(*id);
                }
            }
        }

        // Split the arena into the disjoint slices of the volumes to cut.
        cuts.sort_by_key(|(id, _)| self.records[id.0 as usize].range.start);
        let ranges: Vec<_> = cuts
            .iter()
            .map(|(id, _)| self.records[id.0 as usize].range.clone())
            .collect();
        let slices = vset.split_ranges_mut(&ranges);

        #[cfg(feature = "parallel")]
        let num_negatives: Vec<usize> = slices
            .into_par_iter()
            .zip(cuts.par_iter())
            .map(|(slice, (_, plane))| partition(slice, plane))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let num_negatives: Vec<usize> = slices
            .into_iter()
            .zip(cuts.iter())
            .map(|(slice, (_, plane))| partition(slice, plane))
            .collect();

        let mut children: Vec<(VolumeId, [Range<usize>; 2], u32)> = cuts
            .iter()
            .zip(num_negatives)
            .map(|((id, _), num_negative)| {
                let record = &self.records[id.0 as usize];
                let mid = record.range.start + num_negative;
                (
                    *id,
                    [record.range.start..mid, mid..record.range.end],
                    record.depth + 1,
                )
            })
            .collect();

        // Children are created in the order of their parent ids.
        children.sort_by_key(|(id, _, _)| *id);
        let mut next_level = Vec::with_capacity(children.len() * 2);

        for (id, [negative, positive], depth) in children {
            self.records[id.0 as usize].state = VolumeState::Split;
            self.num_splits += 1;

            for range in [negative, positive] {
                if range.is_empty() {
                    continue;
                }

                next_level.push(self.push_candidate(range, depth));
            }
        }

        next_level
    }
}

#[cfg(test)]
mod test {
    use super::Decomposer;
    use crate::math::{Isometry, Point};
    use crate::transformation::acd::budget::BudgetTracker;
    use crate::transformation::acd::{AcdParameters, Budget};
    use crate::transformation::voxelization::{
        connected_components, GridFrame, Voxel, VoxelSet,
    };

    fn vset(filled: impl Fn(u32, u32, u32) -> bool) -> VoxelSet {
        let n = 24;
        let mut voxels = Vec::new();

        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    if filled(i, j, k) {
                        let interior = [
                            (i + 1, j, k),
                            (i.wrapping_sub(1), j, k),
                            (i, j + 1, k),
                            (i, j.wrapping_sub(1), k),
                            (i, j, k + 1),
                            (i, j, k.wrapping_sub(1)),
                        ]
                        .iter()
                        .all(|&(a, b, c)| a < n && b < n && c < n && filled(a, b, c));

                        voxels.push(Voxel {
                            coords: Point::new(i, j, k),
                            is_on_surface: !interior,
                        });
                    }
                }
            }
        }

        let frame = GridFrame {
            origin: Point::origin(),
            scale: 1.0,
            transform: Isometry::identity(),
        };
        VoxelSet::new(frame, [n, n, n], voxels)
    }

    // A U-shaped volume: two pillars on a base.
    fn u_shape(i: u32, j: u32, k: u32) -> bool {
        i >= 2 && i < 20 && k >= 2 && k < 8 && (j >= 2 && j < 6 || (j < 20 && (i < 6 || i >= 16)))
    }

    fn decompose(
        params: &AcdParameters,
        filled: impl Fn(u32, u32, u32) -> bool,
    ) -> super::SplitOutcome {
        let mut set = vset(filled);
        let components = connected_components(&mut set);
        let mut budget = BudgetTracker::new(params.budget);
        Decomposer::new(params).run(&mut set, components, &mut budget)
    }

    #[test]
    fn convex_block_is_not_split() {
        let params = AcdParameters::DEFAULT;
        let out = decompose(&params, |i, j, k| i < 10 && j < 5 && k < 7);
        assert_eq!(out.volumes.len(), 1);
        assert_eq!(out.num_splits, 0);
        assert_eq!(out.num_evaluations, 1);
        assert!(!out.terminated_early);
    }

    #[test]
    fn u_shape_is_split_into_convex_volumes() {
        let params = AcdParameters {
            concavity: 0.01,
            ..AcdParameters::DEFAULT
        };
        let out = decompose(&params, u_shape);

        assert!(out.volumes.len() >= 3);
        assert!(out.num_splits >= 2);

        let total: usize = out.volumes.iter().map(|v| v.num_voxels()).sum();
        let expected = (0..24)
            .flat_map(|k| (0..24).flat_map(move |j| (0..24).map(move |i| (i, j, k))))
            .filter(|&(i, j, k)| u_shape(i, j, k))
            .count();
        assert_eq!(total, expected);
    }

    #[test]
    fn hull_count_is_limited() {
        let params = AcdParameters {
            concavity: 0.01,
            max_convex_hulls: 2,
            ..AcdParameters::DEFAULT
        };
        let out = decompose(&params, u_shape);
        assert!(out.volumes.len() <= 2);
    }

    #[test]
    fn expired_budget_accepts_everything() {
        let params = AcdParameters {
            concavity: 0.01,
            budget: Budget::with_iterations(1),
            ..AcdParameters::DEFAULT
        };
        let out = decompose(&params, u_shape);
        assert_eq!(out.volumes.len(), 1);
        assert!(out.terminated_early);
    }

    #[test]
    fn disjoint_volumes_are_decomposed_independently() {
        let params = AcdParameters::DEFAULT;
        let out = decompose(&params, |i, j, k| {
            j < 4 && k < 4 && (i < 4 || (i >= 10 && i < 14))
        });
        assert_eq!(out.volumes.len(), 2);
    }
}
