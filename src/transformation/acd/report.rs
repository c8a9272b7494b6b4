use super::ConvexPiece;
use crate::math::Real;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// The time spent in each stage of a decomposition.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StageTimings {
    /// Alignment of the mesh with its principal axes.
    pub alignment: Duration,
    /// Rasterization of the mesh and flood fill.
    pub voxelization: Duration,
    /// Extraction of the connected volumes.
    pub volume_building: Duration,
    /// Recursive splitting of the volumes.
    pub splitting: Duration,
    /// Merging of adjacent pieces.
    pub merging: Duration,
    /// Conversion of the final hulls to mesh space.
    pub reconstruction: Duration,
}

impl StageTimings {
    /// The total time spent decomposing.
    pub fn total(&self) -> Duration {
        self.alignment
            + self.voxelization
            + self.volume_building
            + self.splitting
            + self.merging
            + self.reconstruction
    }
}

/// Statistics of a single convex piece.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PieceStats {
    /// Number of vertices of the hull.
    pub num_vertices: usize,
    /// Number of triangles of the hull.
    pub num_triangles: usize,
    /// Volume of the hull, in mesh units.
    pub volume: Real,
    /// Concavity of the piece.
    pub concavity: Real,
}

impl From<&ConvexPiece> for PieceStats {
    fn from(piece: &ConvexPiece) -> Self {
        Self {
            num_vertices: piece.vertices().len(),
            num_triangles: piece.indices().len(),
            volume: piece.volume(),
            concavity: piece.concavity(),
        }
    }
}

/// A summary of a decomposition.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecompositionReport {
    /// Number of cells of the voxel grid along each axis.
    pub grid_dims: [u32; 3],
    /// Edge length of a voxel, in mesh units.
    pub voxel_size: Real,
    /// Number of voxels intersecting the surface of the mesh.
    pub num_surface_voxels: u32,
    /// Number of voxels strictly inside of the mesh.
    pub num_inside_voxels: u32,
    /// Number of connected volumes extracted from the voxels.
    pub num_volumes: usize,
    /// Number of volume evaluations performed by the splitting stage.
    pub num_evaluations: u32,
    /// Number of volumes split in two.
    pub num_splits: u32,
    /// Largest number of successive splits of a piece.
    pub max_depth: u32,
    /// Number of pieces before merging.
    pub num_pieces_before_merge: usize,
    /// Number of pieces after merging.
    pub num_pieces: usize,
    /// Whether the budget expired before completion.
    pub terminated_early: bool,
    /// The time spent in each stage.
    pub timings: StageTimings,
    /// Statistics of every output piece, in output order.
    pub pieces: Vec<PieceStats>,
}

impl DecompositionReport {
    /// Writes this report, as displayed by its `Display` implementation, to the given file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_string())
    }

    /// Logs the summary of this report, at the `info` level if `verbose` is true and at the
    /// `debug` level otherwise.
    pub fn log(&self, verbose: bool) {
        let level = if verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        };

        if log::log_enabled!(level) {
            for line in self.to_string().lines() {
                log::log!(level, "{}", line);
            }
        }
    }
}

impl fmt::Display for DecompositionReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [ni, nj, nk] = self.grid_dims;
        writeln!(f, "+ Voxelization")?;
        writeln!(f, "\t dim = {} x {} x {}", ni, nj, nk)?;
        writeln!(f, "\t voxel size = {}", self.voxel_size)?;
        writeln!(f, "\t # surface voxels = {}", self.num_surface_voxels)?;
        writeln!(f, "\t # inside voxels = {}", self.num_inside_voxels)?;
        writeln!(f, "\t # volumes = {}", self.num_volumes)?;
        writeln!(f, "+ Decomposition")?;
        writeln!(f, "\t # evaluations = {}", self.num_evaluations)?;
        writeln!(f, "\t # splits = {}", self.num_splits)?;
        writeln!(f, "\t max depth = {}", self.max_depth)?;
        writeln!(f, "\t # pieces before merge = {}", self.num_pieces_before_merge)?;
        writeln!(f, "\t # pieces = {}", self.num_pieces)?;

        if self.terminated_early {
            writeln!(f, "\t terminated early: budget expired")?;
        }

        let t = &self.timings;
        writeln!(f, "+ Timings")?;
        writeln!(f, "\t alignment = {:?}", t.alignment)?;
        writeln!(f, "\t voxelization = {:?}", t.voxelization)?;
        writeln!(f, "\t volume building = {:?}", t.volume_building)?;
        writeln!(f, "\t splitting = {:?}", t.splitting)?;
        writeln!(f, "\t merging = {:?}", t.merging)?;
        writeln!(f, "\t reconstruction = {:?}", t.reconstruction)?;
        writeln!(f, "\t total = {:?}", t.total())?;

        writeln!(f, "+ Pieces")?;
        for (i, piece) in self.pieces.iter().enumerate() {
            writeln!(
                f,
                "\t [{}] {} vertices, {} triangles, volume = {}, concavity = {}",
                i, piece.num_vertices, piece.num_triangles, piece.volume, piece.concavity
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{DecompositionReport, PieceStats, StageTimings};
    use std::time::Duration;

    #[test]
    fn report_display() {
        let report = DecompositionReport {
            grid_dims: [10, 20, 30],
            num_pieces: 1,
            terminated_early: true,
            timings: StageTimings {
                voxelization: Duration::from_millis(2),
                splitting: Duration::from_millis(3),
                ..Default::default()
            },
            pieces: vec![PieceStats {
                num_vertices: 8,
                num_triangles: 12,
                volume: 1.0,
                concavity: 0.0,
            }],
            ..Default::default()
        };

        assert_eq!(report.timings.total(), Duration::from_millis(5));

        let text = report.to_string();
        assert!(text.contains("dim = 10 x 20 x 30"));
        assert!(text.contains("terminated early"));
        assert!(text.contains("[0] 8 vertices, 12 triangles"));
    }
}
