use acd3d::math::{Point, Real};
use acd3d::transformation::acd::{AcdParameters, ConvexDecomposition};
use acd3d::transformation::export::{write_piece_files, write_pieces, ExportFormat};
use std::path::Path;

/// Appends an axis-aligned box to the given buffers.
fn push_box(mins: [Real; 3], maxs: [Real; 3], vtx: &mut Vec<Point<Real>>, idx: &mut Vec<[u32; 3]>) {
    let base = vtx.len() as u32;

    for k in 0..8 {
        vtx.push(Point::new(
            if k & 1 == 0 { mins[0] } else { maxs[0] },
            if k & 2 == 0 { mins[1] } else { maxs[1] },
            if k & 4 == 0 { mins[2] } else { maxs[2] },
        ));
    }

    for tri in [
        [0, 2, 1], [1, 2, 3], [4, 5, 6], [5, 7, 6],
        [0, 1, 4], [1, 5, 4], [2, 6, 3], [3, 6, 7],
        [0, 4, 2], [2, 4, 6], [1, 3, 5], [3, 7, 5],
    ] {
        idx.push([base + tri[0], base + tri[1], base + tri[2]]);
    }
}

fn main() {
    env_logger::init();

    // A dumbbell: two cubes linked by a thin bar.
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    push_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], &mut vertices, &mut indices);
    push_box([1.0, 0.4, 0.4], [3.0, 0.6, 0.6], &mut vertices, &mut indices);
    push_box([3.0, 0.0, 0.0], [4.0, 1.0, 1.0], &mut vertices, &mut indices);

    let params = AcdParameters {
        concavity: 0.01,
        verbose: true,
        ..AcdParameters::DEFAULT
    };

    let decomposition = match ConvexDecomposition::compute(&vertices, &indices, &params) {
        Ok(decomposition) => decomposition,
        Err(err) => {
            eprintln!("Decomposition failed: {}", err);
            std::process::exit(err.status_code());
        }
    };

    println!("{}", decomposition.report());

    // decompose [OUTPUT.off|OUTPUT.wrl] [--separate]
    let mut args = std::env::args().skip(1);
    if let Some(path) = args.next() {
        let separate = args.next().as_deref() == Some("--separate");
        let format = if path.ends_with(".off") {
            ExportFormat::Off
        } else {
            ExportFormat::Vrml2
        };

        let result = if separate {
            let path = Path::new(&path);
            let dir = path.parent().unwrap_or(Path::new("."));
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("piece");
            write_piece_files(decomposition.pieces(), format, dir, stem).map(|_| ())
        } else {
            std::fs::File::create(&path)
                .and_then(|mut file| write_pieces(decomposition.pieces(), format, &mut file))
        };

        if let Err(err) = result {
            eprintln!("Cannot write {}: {}", path, err);
            std::process::exit(1);
        }
    }
}
