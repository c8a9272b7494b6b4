use super::{AcdError, Budget, InvalidInputKind};
use crate::math::Real;
use crate::transformation::voxelization::{clamp_resolution, FillMode};

/// Parameters controlling the approximate convex decomposition.
///
/// In most cases, one of the presets ([`FAST`](Self::FAST), [`DEFAULT`](Self::DEFAULT) or
/// [`DETAILED`](Self::DETAILED)) is a good starting point. Individual fields can then be
/// overridden with the struct update syntax.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AcdParameters {
    /// The target number of voxels of the grid the mesh is rasterized into.
    ///
    /// **Range**: 10 000 ~ 64 000 000. Out-of-range values are clamped, zero is rejected.
    pub resolution: u32,
    /// The concavity threshold: a volume whose concavity is smaller than this is accepted as
    /// a convex piece.
    ///
    /// **Range**: (0, 1)
    pub concavity: Real,
    /// The maximum number of convex pieces produced.
    ///
    /// If the mesh has more connected components than this, the pieces with the most convex
    /// unions are merged together until the count fits, even if they do not touch.
    pub max_convex_hulls: u32,
    /// The maximum number of successive splits of a volume.
    ///
    /// If `None`, it is derived from [`Self::max_convex_hulls`].
    pub max_recursion_depth: Option<u32>,
    /// Whether adjacent pieces are merged after the decomposition when their union is convex
    /// enough.
    pub merge_hulls: bool,
    /// Log the stage reports at the `info` level instead of `debug`.
    pub verbose: bool,
    /// Only one out of `plane_downsampling` candidate cutting planes is tested in the first
    /// pass of the plane search.
    pub plane_downsampling: u32,
    /// Only one out of `convex_hull_downsampling` far-away surface voxels is used to
    /// approximate the convex hulls of candidate cuts. The best approximated cuts are then
    /// compared with exact hulls. With a value of 1, every cut is compared with exact hulls.
    pub convex_hull_downsampling: u32,
    /// Whether candidate cuts are first compared with approximate hulls. If `false`, every
    /// candidate cut is compared with exact hulls, which is slower.
    pub convex_hull_approximation: bool,
    /// The weight of the volume balance between both sides of a cut.
    pub alpha: Real,
    /// The weight of the alignment of a cut with the preferred cutting direction of the
    /// volume.
    pub beta: Real,
    /// The weight of the area of a cut.
    pub gamma: Real,
    /// The weight of the degeneracy of the hulls produced by a cut.
    pub delta: Real,
    /// Also test cuts orthogonal to the principal axes of a volume.
    pub oriented_planes: bool,
    /// Align the mesh with its principal axes before voxelizing it.
    pub pca: bool,
    /// Volumes with fewer voxels than this are accepted without being split.
    pub min_voxels_per_volume: u32,
    /// The maximum number of vertices of each output hull.
    pub max_vertices_per_hull: Option<u32>,
    /// When reducing the number of vertices of a hull, stop adding vertices once the volume
    /// gained by a vertex is smaller than this fraction of the hull volume.
    pub min_volume_per_hull: Real,
    /// Controls whether the interior of the mesh is voxelized.
    pub fill_mode: FillMode,
    /// Limits the time and the number of evaluations spent on the decomposition.
    pub budget: Budget,
}

impl AcdParameters {
    /// Parameters for a quick, coarse decomposition.
    pub const FAST: Self = Self {
        resolution: 20_000,
        concavity: 0.01,
        max_convex_hulls: 64,
        plane_downsampling: 8,
        convex_hull_downsampling: 8,
        ..Self::DEFAULT
    };

    /// Parameters balancing speed and accuracy.
    pub const DEFAULT: Self = Self {
        resolution: 100_000,
        concavity: 0.0025,
        max_convex_hulls: 1024,
        max_recursion_depth: None,
        merge_hulls: true,
        verbose: false,
        plane_downsampling: 4,
        convex_hull_downsampling: 4,
        convex_hull_approximation: true,
        alpha: 0.05,
        beta: 0.05,
        gamma: 0.01,
        delta: 0.01,
        oriented_planes: false,
        pca: false,
        min_voxels_per_volume: 16,
        max_vertices_per_hull: None,
        min_volume_per_hull: 0.0001,
        fill_mode: FillMode::FloodFill,
        budget: Budget::UNLIMITED,
    };

    /// Parameters for a slow, fine-grained decomposition.
    pub const DETAILED: Self = Self {
        resolution: 1_000_000,
        concavity: 0.001,
        plane_downsampling: 2,
        convex_hull_downsampling: 2,
        oriented_planes: true,
        ..Self::DEFAULT
    };

    /// The maximum number of successive splits of a volume.
    ///
    /// When not set explicitly, this is the smallest depth of a binary tree with
    /// `max_convex_hulls` leaves, plus one: some branches usually stop early, so the extra
    /// level lets the other branches produce the remaining pieces.
    pub fn recursion_depth(&self) -> u32 {
        if let Some(depth) = self.max_recursion_depth {
            return depth;
        }

        let mut hull_count = 2u64;
        let mut depth = 1;

        while (self.max_convex_hulls as u64) > hull_count {
            depth += 1;
            hull_count *= 2;
        }

        depth + 1
    }

    /// Checks these parameters, clamping the resolution to its valid range.
    pub fn validate(&self) -> Result<Self, AcdError> {
        let mut result = *self;
        result.resolution = clamp_resolution(self.resolution)?;

        if !(self.concavity > 0.0 && self.concavity < 1.0) {
            return Err(InvalidInputKind::Concavity(self.concavity).into());
        }

        for (value, name) in [
            (self.max_convex_hulls, "max_convex_hulls"),
            (self.plane_downsampling, "plane_downsampling"),
            (self.convex_hull_downsampling, "convex_hull_downsampling"),
        ] {
            if value == 0 {
                return Err(InvalidInputKind::ZeroParameter(name).into());
            }
        }

        if self.max_vertices_per_hull == Some(0) {
            return Err(InvalidInputKind::ZeroParameter("max_vertices_per_hull").into());
        }

        for (value, name) in [
            (self.alpha, "alpha"),
            (self.beta, "beta"),
            (self.gamma, "gamma"),
            (self.delta, "delta"),
            (self.min_volume_per_hull, "min_volume_per_hull"),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(InvalidInputKind::InvalidWeight(name).into());
            }
        }

        Ok(result)
    }
}

impl Default for AcdParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}
