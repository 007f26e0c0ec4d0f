//! Minimal OBJ parser for triangle meshes with positions, texture coordinates
//! and normals.
//!
//! Only `v`, `vt`, `vn` and `f` are read; every other directive is skipped.
//! Faces must be triangles written as three `v/vt/vn` corners. Anything else is
//! rejected and the whole load fails; no partial mesh is ever returned.

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::mesh::{MeshData, MeshVertex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Position,
    TexCoord,
    Normal,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Position => "position",
            Attribute::TexCoord => "texcoord",
            Attribute::Normal => "normal",
        })
    }
}

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to open OBJ file {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read line {line}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },
    #[error("missing {what} on line {line}")]
    MissingValue { line: usize, what: &'static str },
    #[error("invalid {what} '{token}' on line {line}")]
    InvalidNumber {
        line: usize,
        what: &'static str,
        token: String,
    },
    #[error("face on line {line} is not three v/vt/vn corners: '{text}'")]
    MalformedFace { line: usize, text: String },
    #[error("{attribute} index {index} out of range (1..={len}) on line {line}")]
    IndexOutOfRange {
        line: usize,
        attribute: Attribute,
        index: i64,
        len: usize,
    },
    #[error("{attribute} index {index} on line {line} must be 1 or greater")]
    NonPositiveIndex {
        line: usize,
        attribute: Attribute,
        index: i64,
    },
    #[error("OBJ contained no faces")]
    NoFaces,
}

/// One face corner, 1-based as written in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceVertex {
    pub position: u32,
    pub texcoord: u32,
    pub normal: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    pub corners: [FaceVertex; 3],
    /// Source line, 1-based.
    pub line: usize,
}

/// Raw attribute arrays and face triplets, before expansion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjData {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<Face>,
}

impl ObjData {
    /// Expand every face corner into its own vertex. The index buffer is `0..3F`.
    pub fn expand(&self) -> Result<MeshData, ObjError> {
        if self.faces.is_empty() {
            return Err(ObjError::NoFaces);
        }

        let mut vertices = Vec::with_capacity(self.faces.len() * 3);
        for face in &self.faces {
            for corner in &face.corners {
                let position = lookup(&self.positions, corner.position, Attribute::Position, face.line)?;
                let uv = lookup(&self.texcoords, corner.texcoord, Attribute::TexCoord, face.line)?;
                let normal = lookup(&self.normals, corner.normal, Attribute::Normal, face.line)?;
                vertices.push(MeshVertex::new(position, normal, uv));
            }
        }

        Ok(MeshData::from_vertices(vertices))
    }
}

fn lookup<T: Copy>(items: &[T], index: u32, attribute: Attribute, line: usize) -> Result<T, ObjError> {
    index
        .checked_sub(1)
        .and_then(|i| items.get(i as usize).copied())
        .ok_or(ObjError::IndexOutOfRange {
            line,
            attribute,
            index: i64::from(index),
            len: items.len(),
        })
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData, ObjError> {
    parse_obj_from_path(path)?.expand()
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<MeshData, ObjError> {
    parse_obj(reader)?.expand()
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData, ObjError> {
    load_obj_from_reader(io::Cursor::new(contents))
}

pub fn parse_obj_from_path(path: impl AsRef<Path>) -> Result<ObjData, ObjError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ObjError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_obj(BufReader::new(file))
}

pub fn parse_obj<R: BufRead>(reader: R) -> Result<ObjData, ObjError> {
    let mut data = ObjData::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.map_err(|source| ObjError::Read { line: line_no, source })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        match parts.next() {
            Some("v") => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                data.positions.push([x, y, z]);
            }
            Some("vt") => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), line_no, "v coordinate")?;
                data.texcoords.push([u, v]);
            }
            Some("vn") => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                data.normals.push([nx, ny, nz]);
            }
            Some("f") => {
                let face = parse_face(parts, trimmed, line_no)?;
                data.faces.push(face);
            }
            _ => {
                // Ignore other directives (o/g/s/usemtl/etc.)
            }
        }
    }

    log::debug!(
        "Parsed OBJ: {} positions, {} texcoords, {} normals, {} faces",
        data.positions.len(),
        data.texcoords.len(),
        data.normals.len(),
        data.faces.len()
    );
    Ok(data)
}

fn parse_f32(value: Option<&str>, line: usize, what: &'static str) -> Result<f32, ObjError> {
    let token = value.ok_or(ObjError::MissingValue { line, what })?;
    token.parse::<f32>().map_err(|_| ObjError::InvalidNumber {
        line,
        what,
        token: token.to_owned(),
    })
}

fn parse_face<'a>(parts: impl Iterator<Item = &'a str>, text: &str, line: usize) -> Result<Face, ObjError> {
    let malformed = || ObjError::MalformedFace {
        line,
        text: text.to_owned(),
    };

    let mut corners = [FaceVertex {
        position: 0,
        texcoord: 0,
        normal: 0,
    }; 3];
    let mut count = 0;
    for token in parts {
        let slot = corners.get_mut(count).ok_or_else(malformed)?;
        *slot = parse_corner(token, line).ok_or_else(malformed)??;
        count += 1;
    }
    if count != 3 {
        return Err(malformed());
    }

    Ok(Face { corners, line })
}

/// `None` when the token is not `a/b/c`; `Some(Err)` when an index is below 1.
fn parse_corner(token: &str, line: usize) -> Option<Result<FaceVertex, ObjError>> {
    let mut split = token.split('/');
    let raw = [split.next()?, split.next()?, split.next()?];
    if split.next().is_some() {
        return None;
    }

    let mut indices = [0u32; 3];
    let attributes = [Attribute::Position, Attribute::TexCoord, Attribute::Normal];
    for ((slot, text), attribute) in indices.iter_mut().zip(raw).zip(attributes) {
        let value = text.parse::<i64>().ok()?;
        if value < 1 {
            return Some(Err(ObjError::NonPositiveIndex {
                line,
                attribute,
                index: value,
            }));
        }
        // Past u32::MAX can never be in range; `expand` reports it with the real length.
        *slot = u32::try_from(value).unwrap_or(u32::MAX);
    }

    Some(Ok(FaceVertex {
        position: indices[0],
        texcoord: indices[1],
        normal: indices[2],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = r#"
        # one textured triangle
        o tri
        v 0.0 0.0 0.0
        v 1.0 0.0 0.0
        v 0.0 1.0 0.0
        vn 0.0 0.0 1.0
        vt 0.0 0.0
        vt 1.0 0.0
        vt 0.0 1.0
        s off
        f 1/1/1 2/2/1 3/3/1
    "#;

    #[test]
    fn parse_simple_triangle() {
        let mesh = load_obj_from_str(TRIANGLE).expect("parse triangle");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert!(mesh.is_valid());
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].uv, [0.0, 1.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn corners_resolve_independently() {
        // Same position with two different normals must stay two vertices.
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nvn 0 0 -1\n\
                   f 1/1/1 2/1/1 3/1/1\nf 1/1/2 3/1/2 2/1/2\n";
        let obj = parse_obj(io::Cursor::new(src)).expect("parse");
        let mesh = obj.expand().expect("expand");
        assert_eq!(mesh.vertices.len(), 3 * obj.faces.len());
        for (face, chunk) in obj.faces.iter().zip(mesh.vertices.chunks(3)) {
            for (corner, vertex) in face.corners.iter().zip(chunk) {
                assert_eq!(vertex.position, obj.positions[corner.position as usize - 1]);
                assert_eq!(vertex.uv, obj.texcoords[corner.texcoord as usize - 1]);
                assert_eq!(vertex.normal, obj.normals[corner.normal as usize - 1]);
            }
        }
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices[3].normal, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn two_corner_face_is_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1\n";
        let err = load_obj_from_str(src).unwrap_err();
        assert!(matches!(err, ObjError::MalformedFace { line: 5, .. }), "{err}");
    }

    #[test]
    fn quads_and_short_corners_are_rejected() {
        let quad = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1 1/1/1\n";
        assert!(matches!(load_obj_from_str(quad), Err(ObjError::MalformedFace { .. })));

        let no_uv = "v 0 0 0\nvn 0 0 1\nf 1//1 1//1 1//1\n";
        assert!(matches!(load_obj_from_str(no_uv), Err(ObjError::MalformedFace { .. })));

        let positions_only = "v 0 0 0\nf 1 1 1\n";
        assert!(matches!(load_obj_from_str(positions_only), Err(ObjError::MalformedFace { .. })));
    }

    #[test]
    fn out_of_range_and_zero_indices_fail() {
        let src = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 2/1/1\n";
        let err = load_obj_from_str(src).unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange {
                attribute: Attribute::Position,
                index: 2,
                len: 1,
                line: 4
            }
        ));

        let zero = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 0/1/1 1/1/1 1/1/1\n";
        let err = load_obj_from_str(zero).unwrap_err();
        assert!(matches!(
            err,
            ObjError::NonPositiveIndex {
                attribute: Attribute::Position,
                index: 0,
                line: 4
            }
        ));
        assert!(!err.to_string().contains("1..="), "{err}");

        let negative = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/-1/1 1/1/1\n";
        assert!(matches!(
            load_obj_from_str(negative),
            Err(ObjError::NonPositiveIndex {
                attribute: Attribute::TexCoord,
                index: -1,
                ..
            })
        ));

        let huge = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/99999999999\n";
        assert!(matches!(
            load_obj_from_str(huge),
            Err(ObjError::IndexOutOfRange {
                attribute: Attribute::Normal,
                len: 1,
                ..
            })
        ));
    }

    #[test]
    fn bad_numbers_are_reported_with_line() {
        let err = load_obj_from_str("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, ObjError::InvalidNumber { line: 1, what: "y coordinate", .. }));
        let err = load_obj_from_str("vn 0 0\n").unwrap_err();
        assert!(matches!(err, ObjError::MissingValue { line: 1, .. }));
    }

    #[test]
    fn empty_input_has_no_faces() {
        assert!(matches!(load_obj_from_str("v 0 0 0\n"), Err(ObjError::NoFaces)));
    }

    #[test]
    fn reparsing_is_deterministic() {
        let a = load_obj_from_str(TRIANGLE).expect("first");
        let b = load_obj_from_str(TRIANGLE).expect("second");
        assert_eq!(a, b);
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_obj_from_path("definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, ObjError::Open { .. }));
        assert!(err.to_string().contains("here.obj"));
    }
}
