// Voxelizer derived from the volume voxelization of V-HACD, by Khaled Mamou
// (BSD-3-Clause, https://github.com/kmammou/v-hacd).

use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real, Vector};
use crate::query;
use crate::shape::TriMeshView;
use crate::transformation::acd::{AcdError, InvalidInputKind};
use crate::transformation::voxelization::{Voxel, VoxelSet};

/// The smallest accepted voxel resolution.
pub const MIN_RESOLUTION: u32 = 10_000;
/// The largest accepted voxel resolution.
pub const MAX_RESOLUTION: u32 = 64_000_000;

const RESOURCE_HINT: &str = "lower the voxel resolution";

/// Controls what is being voxelized.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FillMode {
    /// Only the voxels intersecting the boundary of the mesh are kept.
    SurfaceOnly,
    /// The voxels intersecting the boundary of the mesh, and the voxels enclosed by them,
    /// are kept.
    #[default]
    FloodFill,
}

/// The classification of a voxel-grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VoxelValue {
    /// Not classified yet.
    Undefined,
    /// Outside of the mesh, but its neighbors still need to be visited by the flood fill.
    OutsideSurfaceToWalk,
    /// Outside of the mesh.
    OutsideSurface,
    /// Inside of the mesh.
    InsideSurface,
    /// Intersecting the boundary of the mesh.
    OnSurface,
}

/// The mapping between voxel-grid coordinates and mesh coordinates.
///
/// The voxel with integer coordinates `(i, j, k)` covers the grid-space box
/// `[i, i + 1] x [j, j + 1] x [k, k + 1]`. A grid-space point `p` is located at
/// `transform⁻¹ * (origin + p * scale)` in mesh space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridFrame {
    /// The position of the grid-space origin, in the aligned space.
    pub origin: Point<Real>,
    /// The edge length of a voxel.
    pub scale: Real,
    /// The transformation from mesh space to the aligned space the grid was built in.
    pub transform: Isometry<Real>,
}

impl GridFrame {
    /// Converts a grid-space point to mesh space.
    #[inline]
    pub fn to_mesh(&self, pt: &Point<Real>) -> Point<Real> {
        self.transform
            .inverse_transform_point(&(self.origin + pt.coords * self.scale))
    }

    /// Converts a mesh-space point to grid space.
    #[inline]
    pub fn to_grid(&self, pt: &Point<Real>) -> Point<Real> {
        ((self.transform * pt - self.origin.coords) / self.scale).into()
    }

    /// The volume of a single voxel, in mesh units.
    #[inline]
    pub fn voxel_volume(&self) -> Real {
        self.scale * self.scale * self.scale
    }
}

/// Checks the requested voxel resolution, clamping it to
/// `[MIN_RESOLUTION, MAX_RESOLUTION]`.
pub fn clamp_resolution(resolution: u32) -> Result<u32, AcdError> {
    if resolution == 0 {
        return Err(InvalidInputKind::ZeroResolution.into());
    }

    let clamped = resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION);

    if clamped != resolution {
        log::warn!(
            "Voxel resolution {} is out of the range [{}, {}], using {} instead.",
            resolution,
            MIN_RESOLUTION,
            MAX_RESOLUTION,
            clamped
        );
    }

    Ok(clamped)
}

/// A dense voxel grid classifying every cell as outside, inside, or on the boundary of a
/// triangle mesh.
pub struct VoxelGrid {
    frame: GridFrame,
    dims: [u32; 3],
    num_voxels_on_surface: u32,
    num_voxels_inside_surface: u32,
    num_voxels_outside_surface: u32,
    data: Vec<VoxelValue>,
}

impl VoxelGrid {
    /// Voxelizes the closed triangle mesh described by `points` and `indices`.
    ///
    /// # Parameters
    /// * `resolution` - The target number of cells of the grid. The cells are cubic, with an
    ///   edge length chosen so that the bounding box of the mesh contains roughly
    ///   `resolution` of them. Values outside of `[MIN_RESOLUTION, MAX_RESOLUTION]` are
    ///   clamped, zero is rejected.
    /// * `fill_mode` - Controls whether the interior of the mesh is voxelized too.
    pub fn voxelize(
        points: &[Point<Real>],
        indices: &[[u32; 3]],
        resolution: u32,
        fill_mode: FillMode,
    ) -> Result<Self, AcdError> {
        let mesh = TriMeshView::new(points, indices)?;
        Self::voxelize_mesh(&mesh, &Isometry::identity(), resolution, fill_mode)
    }

    /// Voxelizes the given mesh after transforming it by `transform`.
    pub fn voxelize_mesh(
        mesh: &TriMeshView,
        transform: &Isometry<Real>,
        resolution: u32,
        fill_mode: FillMode,
    ) -> Result<Self, AcdError> {
        let resolution = clamp_resolution(resolution)?;

        let mut aabb = Aabb::new_invalid();
        for idx in mesh.indices() {
            for &i in idx {
                aabb.take_point(transform * mesh.points()[i as usize]);
            }
        }

        // Flat meshes still get a cell size of the order of their largest extent.
        let mut extents = aabb.extents();
        let min_extent = extents.max() * 1.0e-3;
        extents.apply(|e| *e = e.max(min_extent));

        let scale = (extents.x * extents.y * extents.z / resolution as Real).cbrt();

        if !(scale > 0.0 && scale.is_finite()) {
            return Err(InvalidInputKind::EmptyVoxelization.into());
        }

        // One and a half cell of padding before the mesh, so that its lower faces do not sit
        // on a cell boundary, and at least one full cell after it.
        let origin = aabb.mins - Vector::repeat(scale * 1.5);
        let mut dims = [0u32; 3];
        let mut requested_cells = 1u64;

        for (dim, extent) in dims.iter_mut().zip(extents.iter()) {
            let n = (*extent / scale).ceil() as u64 + 3;
            *dim = u32::try_from(n).map_err(|_| AcdError::ResourceExhausted {
                requested_cells: u64::MAX,
                hint: RESOURCE_HINT,
            })?;
            requested_cells =
                requested_cells
                    .checked_mul(n)
                    .ok_or(AcdError::ResourceExhausted {
                        requested_cells: u64::MAX,
                        hint: RESOURCE_HINT,
                    })?;
        }

        let exhausted = AcdError::ResourceExhausted {
            requested_cells,
            hint: RESOURCE_HINT,
        };
        let num_cells = usize::try_from(requested_cells).map_err(|_| exhausted.clone())?;
        let mut data = Vec::new();
        data.try_reserve_exact(num_cells)
            .map_err(|_| exhausted.clone())?;
        data.resize(num_cells, VoxelValue::Undefined);

        let mut result = VoxelGrid {
            frame: GridFrame {
                origin,
                scale,
                transform: *transform,
            },
            dims,
            num_voxels_on_surface: 0,
            num_voxels_inside_surface: 0,
            num_voxels_outside_surface: 0,
            data,
        };

        result.rasterize(mesh);

        match fill_mode {
            FillMode::SurfaceOnly => {
                for value in &mut result.data {
                    if *value != VoxelValue::OnSurface {
                        *value = VoxelValue::OutsideSurface;
                    }
                }
                result.num_voxels_outside_surface =
                    (num_cells - result.num_voxels_on_surface as usize) as u32;
            }
            FillMode::FloodFill => {
                result.mark_border_outside_surface();
                result.fill_outside_surface();
                result.fill_inside_surface();
            }
        }

        Ok(result)
    }

    fn rasterize(&mut self, mesh: &TriMeshView) {
        let inv_scale = 1.0 / self.frame.scale;
        let max_cell = Vector::new(self.dims[0] - 1, self.dims[1] - 1, self.dims[2] - 1);
        let mut num_skipped = 0;

        for tri in mesh.triangles() {
            if tri.is_affinely_dependent() {
                num_skipped += 1;
                continue;
            }

            let mut grid_tri = tri.transformed(&self.frame.transform);
            for pt in [&mut grid_tri.a, &mut grid_tri.b, &mut grid_tri.c] {
                *pt = ((*pt - self.frame.origin.coords) * inv_scale).into();
            }

            let tri_aabb = Aabb::from_points(&grid_tri.vertices());
            let first = tri_aabb
                .mins
                .coords
                .map(|e| (e.floor() as i64 - 1).max(0) as u32);
            let last = tri_aabb
                .maxs
                .coords
                .map(|e| (e.floor() as i64 + 1).max(0) as u32)
                .inf(&max_cell);

            for k in first.z..=last.z {
                for j in first.y..=last.y {
                    for i in first.x..=last.x {
                        let idx = self.voxel_index(i, j, k);

                        if self.data[idx] == VoxelValue::Undefined {
                            let cell = Aabb::new(
                                Point::new(i as Real, j as Real, k as Real),
                                Point::new((i + 1) as Real, (j + 1) as Real, (k + 1) as Real),
                            );

                            if query::intersection_test_aabb_triangle(&cell, &grid_tri) {
                                self.data[idx] = VoxelValue::OnSurface;
                                self.num_voxels_on_surface += 1;
                            }
                        }
                    }
                }
            }
        }

        if num_skipped > 0 {
            log::warn!(
                "Skipped {} degenerate triangles out of {} during voxelization.",
                num_skipped,
                mesh.indices().len()
            );
        }
    }

    /// The mapping between grid space and mesh space.
    #[inline]
    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    /// The position of the grid-space origin, in the aligned space.
    #[inline]
    pub fn origin(&self) -> Point<Real> {
        self.frame.origin
    }

    /// The edge length of a voxel.
    #[inline]
    pub fn scale(&self) -> Real {
        self.frame.scale
    }

    /// The number of cells along each axis.
    #[inline]
    pub fn dims(&self) -> [u32; 3] {
        self.dims
    }

    /// Converts a grid-space point to mesh space.
    #[inline]
    pub fn grid_to_mesh(&self, pt: &Point<Real>) -> Point<Real> {
        self.frame.to_mesh(pt)
    }

    #[inline]
    fn voxel_index(&self, i: u32, j: u32, k: u32) -> usize {
        i as usize + self.dims[0] as usize * (j as usize + self.dims[1] as usize * k as usize)
    }

    /// The classification of the cell `(i, j, k)`.
    ///
    /// Panics if the cell is out of the grid.
    #[inline]
    pub fn voxel(&self, i: u32, j: u32, k: u32) -> VoxelValue {
        self.data[self.voxel_index(i, j, k)]
    }

    /// The number of cells intersecting the boundary of the mesh.
    pub fn num_voxels_on_surface(&self) -> u32 {
        self.num_voxels_on_surface
    }

    /// The number of cells strictly inside of the mesh.
    pub fn num_voxels_inside_surface(&self) -> u32 {
        self.num_voxels_inside_surface
    }

    /// The number of cells outside of the mesh.
    pub fn num_voxels_outside_surface(&self) -> u32 {
        self.num_voxels_outside_surface
    }

    /// Marks the undefined cells of the six faces of the grid as outside cells to walk.
    fn mark_border_outside_surface(&mut self) {
        let [ni, nj, nk] = self.dims;

        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let on_border = i == 0
                        || j == 0
                        || k == 0
                        || i == ni - 1
                        || j == nj - 1
                        || k == nk - 1;
                    let idx = self.voxel_index(i, j, k);

                    if on_border && self.data[idx] == VoxelValue::Undefined {
                        self.data[idx] = VoxelValue::OutsideSurfaceToWalk;
                    }
                }
            }
        }
    }

    fn walk_forward(
        start: isize,
        end: isize,
        mut ptr: isize,
        out: &mut [VoxelValue],
        stride: isize,
        max_distance: isize,
    ) {
        let mut i = start;
        let mut count = 0;

        while count < max_distance && i < end && out[ptr as usize] == VoxelValue::Undefined {
            out[ptr as usize] = VoxelValue::OutsideSurfaceToWalk;
            i += 1;
            ptr += stride;
            count += 1;
        }
    }

    fn walk_backward(
        start: isize,
        end: isize,
        mut ptr: isize,
        out: &mut [VoxelValue],
        stride: isize,
        max_distance: isize,
    ) {
        let mut i = start;
        let mut count = 0;

        while count < max_distance && i >= end && out[ptr as usize] == VoxelValue::Undefined {
            out[ptr as usize] = VoxelValue::OutsideSurfaceToWalk;
            i -= 1;
            ptr -= stride;
            count += 1;
        }
    }

    /// Propagates the outside classification from the cells to walk.
    ///
    /// The grid is swept in memory order until a sweep walks no new cell. Every walked cell
    /// marks up to `walk_distance` undefined cells along each axis, which keeps the accesses
    /// local instead of growing a FIFO as large as the grid.
    fn fill_outside_surface(&mut self) {
        let [ni, nj, nk] = self.dims;
        let walk_distance = 64;

        let istride = 1isize;
        let jstride = ni as isize;
        let kstride = ni as isize * nj as isize;

        loop {
            let mut voxels_walked = 0;

            for k in 0..nk {
                for j in 0..nj {
                    for i in 0..ni {
                        let idx = self.voxel_index(i, j, k);

                        if self.data[idx] != VoxelValue::OutsideSurfaceToWalk {
                            continue;
                        }

                        voxels_walked += 1;
                        self.data[idx] = VoxelValue::OutsideSurface;
                        let idx = idx as isize;

                        Self::walk_forward(
                            i as isize + 1,
                            ni as isize,
                            idx + istride,
                            &mut self.data,
                            istride,
                            walk_distance,
                        );
                        Self::walk_backward(
                            i as isize - 1,
                            0,
                            idx - istride,
                            &mut self.data,
                            istride,
                            walk_distance,
                        );
                        Self::walk_forward(
                            j as isize + 1,
                            nj as isize,
                            idx + jstride,
                            &mut self.data,
                            jstride,
                            walk_distance,
                        );
                        Self::walk_backward(
                            j as isize - 1,
                            0,
                            idx - jstride,
                            &mut self.data,
                            jstride,
                            walk_distance,
                        );
                        Self::walk_forward(
                            k as isize + 1,
                            nk as isize,
                            idx + kstride,
                            &mut self.data,
                            kstride,
                            walk_distance,
                        );
                        Self::walk_backward(
                            k as isize - 1,
                            0,
                            idx - kstride,
                            &mut self.data,
                            kstride,
                            walk_distance,
                        );
                    }
                }
            }

            self.num_voxels_outside_surface += voxels_walked;

            if voxels_walked == 0 {
                break;
            }
        }
    }

    fn fill_inside_surface(&mut self) {
        for value in &mut self.data {
            if *value == VoxelValue::Undefined {
                *value = VoxelValue::InsideSurface;
                self.num_voxels_inside_surface += 1;
            }
        }
    }

    /// Collects the cells inside or on the boundary of the mesh into a [`VoxelSet`].
    ///
    /// The voxels are stored in the memory order of the grid.
    pub fn to_voxel_set(&self) -> VoxelSet {
        let mut voxels =
            Vec::with_capacity((self.num_voxels_inside_surface + self.num_voxels_on_surface) as usize);
        let [ni, nj, nk] = self.dims;

        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let is_on_surface = match self.voxel(i, j, k) {
                        VoxelValue::OnSurface => true,
                        VoxelValue::InsideSurface => false,
                        _ => continue,
                    };

                    voxels.push(Voxel {
                        coords: Point::new(i, j, k),
                        is_on_surface,
                    });
                }
            }
        }

        VoxelSet::new(self.frame, self.dims, voxels)
    }
}

impl From<VoxelGrid> for VoxelSet {
    fn from(grid: VoxelGrid) -> Self {
        grid.to_voxel_set()
    }
}
