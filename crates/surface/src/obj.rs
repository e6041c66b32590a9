//! Wavefront OBJ plate model reader (vertices and faces only).

use std::fs;
use std::path::Path;

use terminus_core::vector::Vector3;
use tracing::debug;

use crate::{PlateModel, SurfaceError};

/// Read a plate model from an OBJ file. Polygonal faces are fan-triangulated;
/// texture and normal indices (`v/vt/vn`) and all other statements are
/// ignored.
pub fn load_obj<P: AsRef<Path>>(
    path: P,
    body: i32,
    surface_id: i32,
) -> Result<PlateModel, SurfaceError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let model = parse_obj(&contents, body, surface_id)?;
    debug!(
        path = %path.display(),
        vertices = model.vertices().len(),
        plates = model.plates().len(),
        "loaded plate model"
    );
    Ok(model)
}

/// Parse OBJ text into a plate model.
pub fn parse_obj(contents: &str, body: i32, surface_id: i32) -> Result<PlateModel, SurfaceError> {
    let mut vertices: Vec<Vector3> = Vec::new();
    let mut plates: Vec<[usize; 3]> = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        let mut fields = text.split_whitespace();
        match fields.next() {
            Some("v") => {
                let coords: Vec<f64> = fields
                    .take(3)
                    .map(|f| f.parse::<f64>())
                    .collect::<Result<_, _>>()
                    .map_err(|err| SurfaceError::Parse {
                        line,
                        message: format!("bad vertex coordinate: {err}"),
                    })?;
                if coords.len() != 3 {
                    return Err(SurfaceError::Parse {
                        line,
                        message: "vertex needs three coordinates".to_string(),
                    });
                }
                vertices.push([coords[0], coords[1], coords[2]]);
            }
            Some("f") => {
                let corners = fields
                    .map(|f| resolve_index(f, vertices.len(), line))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(SurfaceError::Parse {
                        line,
                        message: "face needs at least three vertices".to_string(),
                    });
                }
                for pair in corners[1..].windows(2) {
                    plates.push([corners[0], pair[0], pair[1]]);
                }
            }
            _ => {}
        }
    }

    PlateModel::new(body, surface_id, vertices, plates)
}

fn resolve_index(field: &str, vertex_count: usize, line: usize) -> Result<usize, SurfaceError> {
    let first = field.split('/').next().unwrap_or("");
    let value: i64 = first.parse().map_err(|_| SurfaceError::Parse {
        line,
        message: format!("bad face index `{field}`"),
    })?;
    let resolved = match value {
        v if v > 0 => v - 1,
        v if v < 0 => vertex_count as i64 + v,
        _ => -1,
    };
    if resolved < 0 {
        return Err(SurfaceError::Parse {
            line,
            message: format!("face index `{field}` is out of range"),
        });
    }
    Ok(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TETRAHEDRON: &str = "\
# unit tetrahedron
v 1 0 0
v 0 1 0
v 0 0 1
v 0 0 0
f 1 2 3
f 1/1 4/4 2/2
f -4 -1 -2
f 2 4 3
";

    #[test]
    fn parses_faces_with_relative_and_slashed_indices() {
        let model = parse_obj(TETRAHEDRON, 2000001, 3).unwrap();
        assert_eq!(model.vertices().len(), 4);
        assert_eq!(model.plates()[1], [0, 3, 1]);
        assert_eq!(model.plates()[2], [0, 3, 2]);
    }

    #[test]
    fn quads_are_fan_triangulated_and_files_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4").unwrap();
        let model = load_obj(file.path(), 10, 1).unwrap();
        assert_eq!(model.plates(), &[[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn malformed_vertices_report_line_numbers() {
        let err = parse_obj("v 1 2\n", 10, 1).unwrap_err();
        assert!(matches!(err, SurfaceError::Parse { line: 1, .. }));
    }
}
