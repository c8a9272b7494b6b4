use super::meshes::dumbbell;
use acd3d::transformation::acd::{AcdParameters, ConvexDecomposition};
use acd3d::transformation::export::{write_piece_files, write_pieces, ExportFormat};

fn decomposition() -> acd3d::transformation::acd::Decomposition {
    let mesh = dumbbell();
    let params = AcdParameters {
        concavity: 0.01,
        ..AcdParameters::DEFAULT
    };
    ConvexDecomposition::compute(&mesh.vertices, &mesh.indices, &params).unwrap()
}

#[test]
fn off_export_concatenates_the_pieces() {
    let decomposition = decomposition();
    let pieces = decomposition.pieces();
    let mut out = Vec::new();
    write_pieces(pieces, ExportFormat::Off, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("OFF"));

    let num_vertices: usize = pieces.iter().map(|p| p.vertices().len()).sum();
    let num_triangles: usize = pieces.iter().map(|p| p.indices().len()).sum();
    let header = format!("{} {} 0", num_vertices, num_triangles);
    assert_eq!(lines.next(), Some(header.as_str()));
    assert_eq!(text.lines().count(), 2 + num_vertices + num_triangles);

    // Face indices refer to the concatenated vertex buffer.
    for face in text.lines().skip(2 + num_vertices) {
        let ids: Vec<usize> = face
            .split_whitespace()
            .map(|id| id.parse().unwrap())
            .collect();
        assert_eq!(ids[0], 3);
        assert!(ids[1..].iter().all(|id| *id < num_vertices));
    }
}

#[test]
fn vrml_export_has_one_shape_per_piece() {
    let decomposition = decomposition();
    let mut out = Vec::new();
    write_pieces(decomposition.pieces(), ExportFormat::Vrml2, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("#VRML V2.0 utf8"));
    assert_eq!(
        text.matches("Shape {").count(),
        decomposition.pieces().len()
    );
    assert_eq!(ExportFormat::Vrml2.extension(), "wrl");
}

#[test]
fn pieces_can_be_exported_to_separate_files() {
    let decomposition = decomposition();
    let pieces = decomposition.pieces();
    let dir = std::env::temp_dir().join(format!("acd3d-export-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let paths = write_piece_files(pieces, ExportFormat::Off, &dir, "dumbbell").unwrap();
    assert_eq!(paths.len(), pieces.len());

    for (i, (path, piece)) in paths.iter().zip(pieces).enumerate() {
        let name = format!("dumbbell_{}.off", i);
        assert_eq!(path.file_name().unwrap().to_str(), Some(name.as_str()));

        let text = std::fs::read_to_string(path).unwrap();
        let header = format!("{} {} 0", piece.vertices().len(), piece.indices().len());
        assert_eq!(text.lines().nth(1), Some(header.as_str()));
    }

    std::fs::remove_dir_all(&dir).unwrap();
}
