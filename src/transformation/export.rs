//! Text exporters for the pieces of a convex decomposition.

use crate::math::Real;
use crate::transformation::acd::ConvexPiece;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A mesh file format the pieces of a decomposition can be written to.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Object File Format: all the pieces are concatenated into a single mesh.
    Off,
    /// VRML 2.0: every piece is a separate shape with its own color.
    Vrml2,
}

impl ExportFormat {
    /// The usual file extension of this format, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Off => "off",
            ExportFormat::Vrml2 => "wrl",
        }
    }
}

/// Writes `pieces` to `out` in the given format.
pub fn write_pieces<W: Write>(
    pieces: &[ConvexPiece],
    format: ExportFormat,
    out: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Off => write_off(pieces, out),
        ExportFormat::Vrml2 => write_vrml2(pieces, out),
    }
}

/// Writes every piece to its own file in `dir`, named `{stem}_{i}.{extension}` where `i` is
/// the index of the piece.
///
/// Returns the paths of the written files, in the order of the pieces.
pub fn write_piece_files(
    pieces: &[ConvexPiece],
    format: ExportFormat,
    dir: impl AsRef<Path>,
    stem: &str,
) -> io::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut paths = Vec::with_capacity(pieces.len());

    for (i, piece) in pieces.iter().enumerate() {
        let path = dir.join(format!("{}_{}.{}", stem, i, format.extension()));
        let mut out = BufWriter::new(File::create(&path)?);
        write_pieces(std::slice::from_ref(piece), format, &mut out)?;
        out.flush()?;
        paths.push(path);
    }

    Ok(paths)
}

/// Writes all the pieces as a single OFF mesh.
pub fn write_off<W: Write>(pieces: &[ConvexPiece], out: &mut W) -> io::Result<()> {
    let num_vertices: usize = pieces.iter().map(|p| p.vertices().len()).sum();
    let num_triangles: usize = pieces.iter().map(|p| p.indices().len()).sum();

    writeln!(out, "OFF")?;
    writeln!(out, "{} {} 0", num_vertices, num_triangles)?;

    for pt in pieces.iter().flat_map(|p| p.vertices()) {
        writeln!(out, "{} {} {}", pt.x, pt.y, pt.z)?;
    }

    let mut base = 0;
    for piece in pieces {
        for idx in piece.indices() {
            writeln!(
                out,
                "3 {} {} {}",
                base + idx[0] as usize,
                base + idx[1] as usize,
                base + idx[2] as usize
            )?;
        }
        base += piece.vertices().len();
    }

    Ok(())
}

/// A color for the i-th piece, spreading hues with the golden ratio.
fn piece_color(i: usize) -> [Real; 3] {
    let hue = (i as Real * 0.618_034).fract() * 6.0;
    let x = 1.0 - (hue % 2.0 - 1.0).abs();
    let [r, g, b] = match hue as u32 {
        0 => [1.0, x, 0.0],
        1 => [x, 1.0, 0.0],
        2 => [0.0, 1.0, x],
        3 => [0.0, x, 1.0],
        4 => [x, 0.0, 1.0],
        _ => [1.0, 0.0, x],
    };
    // Pastel shades.
    [0.3 + 0.6 * r, 0.3 + 0.6 * g, 0.3 + 0.6 * b]
}

/// Writes every piece as a colored VRML 2.0 shape.
pub fn write_vrml2<W: Write>(pieces: &[ConvexPiece], out: &mut W) -> io::Result<()> {
    writeln!(out, "#VRML V2.0 utf8")?;
    writeln!(out)?;
    writeln!(out, "# Pieces: {}", pieces.len())?;
    writeln!(out)?;
    writeln!(out, "Group {{")?;
    writeln!(out, "    children [")?;

    for (i, piece) in pieces.iter().enumerate() {
        let [r, g, b] = piece_color(i);
        writeln!(out, "        Shape {{")?;
        writeln!(out, "            appearance Appearance {{")?;
        writeln!(out, "                material Material {{")?;
        writeln!(out, "                    diffuseColor {:.6} {:.6} {:.6}", r, g, b)?;
        writeln!(out, "                    ambientIntensity 0.400000")?;
        writeln!(out, "                    specularColor 0.500000 0.500000 0.500000")?;
        writeln!(out, "                    shininess 0.400000")?;
        writeln!(out, "                }}")?;
        writeln!(out, "            }}")?;
        writeln!(out, "            geometry IndexedFaceSet {{")?;
        writeln!(out, "                ccw TRUE")?;
        writeln!(out, "                solid TRUE")?;
        writeln!(out, "                convex TRUE")?;
        writeln!(out, "                coord Coordinate {{")?;
        writeln!(out, "                    point [")?;
        for pt in piece.vertices() {
            writeln!(out, "                        {:.6} {:.6} {:.6},", pt.x, pt.y, pt.z)?;
        }
        writeln!(out, "                    ]")?;
        writeln!(out, "                }}")?;
        writeln!(out, "                coordIndex [")?;
        for idx in piece.indices() {
            writeln!(out, "                        {}, {}, {}, -1,", idx[0], idx[1], idx[2])?;
        }
        writeln!(out, "                ]")?;
        writeln!(out, "            }}")?;
        writeln!(out, "        }}")?;
    }

    writeln!(out, "    ]")?;
    writeln!(out, "}}")?;
    Ok(())
}
