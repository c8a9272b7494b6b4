use crate::transformation::acd::ConvexPiece;
use obj::{Group, IndexTuple, ObjData, ObjError, Object, SimplePolygon};
use std::io::Write;
use std::path::Path;

/// Builds the Wavefront data of `pieces`, with one object per piece.
pub fn pieces_to_obj_data(pieces: &[ConvexPiece]) -> ObjData {
    let mut position = Vec::new();
    let mut objects = Vec::with_capacity(pieces.len());

    for (i, piece) in pieces.iter().enumerate() {
        let base = position.len();
        #[allow(clippy::unnecessary_cast)]
        position.extend(
            piece
                .vertices()
                .iter()
                .map(|v| [v.x as f32, v.y as f32, v.z as f32]),
        );

        let polys = piece
            .indices()
            .iter()
            .map(|tri| {
                SimplePolygon(vec![
                    IndexTuple(base + tri[0] as usize, None, None),
                    IndexTuple(base + tri[1] as usize, None, None),
                    IndexTuple(base + tri[2] as usize, None, None),
                ])
            })
            .collect();

        objects.push(Object {
            name: format!("piece_{}", i),
            groups: vec![Group {
                name: String::new(),
                index: 0,
                material: None,
                polys,
            }],
        });
    }

    ObjData {
        position,
        objects,
        ..Default::default()
    }
}

/// Writes `pieces` in the Wavefront (`.obj`) format.
///
/// This function is enabled by the `wavefront` feature flag.
pub fn write_obj<W: Write>(pieces: &[ConvexPiece], out: &mut W) -> Result<(), ObjError> {
    pieces_to_obj_data(pieces).write_to_buf(out)
}

/// Outputs a Wavefront (`.obj`) file at the given path.
///
/// This function is enabled by the `wavefront` feature flag.
pub fn write_obj_file(pieces: &[ConvexPiece], path: impl AsRef<Path>) -> Result<(), ObjError> {
    let mut file = std::fs::File::create(path)?;
    write_obj(pieces, &mut file)
}
