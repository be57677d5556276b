use std::{
    collections::HashMap,
    fs,
    io::{self, BufWriter, Read, Seek, Write},
    path::Path,
};

use stl_io::{Normal, Triangle, Vertex};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    error::{HollowError, HollowResult},
    mesh::Mesh,
    Pos,
};

/// Reads an ASCII or binary STL. Vertices at the same position are merged,
/// so the result has shared indices even though STL stores triangles
/// separately.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> HollowResult<Mesh> {
    let stl = stl_io::read_stl(reader).map_err(|err| HollowError::Parse(err.to_string()))?;

    // stl_io merges vertices by exact bit pattern, which keeps `-0.0` and
    // `0.0` apart. Weld again on the normalized position.
    let mut welded = HashMap::new();
    let mut vertices = Vec::new();
    let remap = (stl.vertices.iter())
        .map(|vertex| {
            let position = Pos::new(vertex[0], vertex[1], vertex[2]).map(|x| x + 0.0);
            vert_idx(&mut welded, &mut vertices, position)
        })
        .collect::<Vec<_>>();

    let mut faces = Vec::with_capacity(stl.faces.len());
    for face in &stl.faces {
        if face.vertices.iter().any(|&x| x >= remap.len()) {
            return Err(HollowError::Parse(format!(
                "face references missing vertex {:?}",
                face.vertices
            )));
        }

        faces.push(face.vertices.map(|x| remap[x]));
    }

    debug!(
        vertices = vertices.len(),
        merged = stl.vertices.len() - vertices.len(),
        faces = faces.len(),
        "Read STL"
    );

    Ok(Mesh::new(vertices, faces))
}

fn vert_idx(welded: &mut HashMap<[u32; 3], u32>, vertices: &mut Vec<Pos>, vertex: Pos) -> u32 {
    *welded
        .entry([vertex.x, vertex.y, vertex.z].map(f32::to_bits))
        .or_insert_with(|| {
            vertices.push(vertex);
            (vertices.len() - 1) as u32
        })
}

/// Writes `mesh` as a binary STL with per-face normals.
pub fn write_stl<W: Write>(writer: &mut W, mesh: &Mesh) -> io::Result<()> {
    let triangles = (0..mesh.face_count()).map(|face| {
        let normal = mesh.normal(face);
        Triangle {
            normal: Normal::new([normal.x, normal.y, normal.z]),
            vertices: mesh
                .face_verts(face)
                .map(|x| Vertex::new([x.x, x.y, x.z])),
        }
    });

    stl_io::write_stl(writer, triangles)
}

/// Writes `mesh` to `path` through a temporary file in the same directory,
/// so `path` is either left alone or fully written.
pub fn save_mesh(path: &Path, mesh: &Mesh) -> HollowResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| HollowError::io(parent, err))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|err| HollowError::io(parent, err))?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write_stl(&mut writer, mesh)
            .and_then(|_| writer.flush())
            .map_err(|err| HollowError::io(path, err))?;
    }

    temp.persist(path)
        .map_err(|err| HollowError::io(path, err.error))?;

    info!(faces = mesh.face_count(), "Wrote `{}`", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Cursor};

    use super::{read_stl, save_mesh, write_stl};
    use crate::{builder::MeshBuilder, error::HollowError, validate::MeshReport, Pos};

    const ASCII_TETRAHEDRON: &str = "solid tetra
facet normal 0 0 -1
  outer loop
    vertex 0 0 0
    vertex 0 1 0
    vertex 1 0 0
  endloop
endfacet
facet normal 0 -1 0
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 0 0 1
  endloop
endfacet
facet normal -1 0 0
  outer loop
    vertex 0 0 0
    vertex 0 0 1
    vertex 0 1 0
  endloop
endfacet
facet normal 0.577 0.577 0.577
  outer loop
    vertex 1 0 0
    vertex 0 1 0
    vertex 0 0 1
  endloop
endfacet
endsolid tetra
";

    #[test]
    fn read_ascii() {
        let mesh = read_stl(&mut Cursor::new(ASCII_TETRAHEDRON.as_bytes())).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
        assert!(MeshReport::new(&mesh).is_solid());
        assert!((mesh.volume() - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn binary_keeps_shared_vertices() {
        let sphere = MeshBuilder::sphere(Pos::zeros(), 5.0, 8, 12);

        let mut buffer = Vec::new();
        write_stl(&mut buffer, &sphere).unwrap();
        assert_eq!(buffer.len(), 84 + 50 * sphere.face_count());

        let read = read_stl(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(read.face_count(), sphere.face_count());
        assert_eq!(read.vertex_count(), sphere.vertex_count());
        assert!(MeshReport::new(&read).is_solid());
        assert!((read.volume() - sphere.volume()).abs() < 1e-3);
    }

    #[test]
    fn negative_zero_is_welded() {
        let cube = MeshBuilder::cuboid(Pos::zeros(), Pos::repeat(10.0));
        let mut buffer = Vec::new();
        write_stl(&mut buffer, &cube).unwrap();

        // Binary facets start after the 84 byte header, each is 50 bytes with
        // the three vertices following the 12 byte normal.
        for corner in 0..3 {
            for axis in 0..3 {
                let offset = 84 + 12 + corner * 12 + axis * 4;
                let value = f32::from_le_bytes(buffer[offset..offset + 4].try_into().unwrap());
                if value == 0.0 {
                    buffer[offset..offset + 4].copy_from_slice(&(-0.0f32).to_le_bytes());
                }
            }
        }

        let read = read_stl(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(read.vertex_count(), 8);
        assert!(MeshReport::new(&read).is_solid());
        assert!(read.vertices().iter().flatten().all(|x| x.is_sign_positive()));

        let hollowed = crate::hollow(&read, &crate::HollowParams::new(2.0)).unwrap();
        assert!((hollowed.stats.output_volume - (1000.0 - 216.0)).abs() < 1e-2);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = read_stl(&mut Cursor::new(b"solid nope\nfacet normal x".to_vec())).unwrap_err();
        assert!(matches!(err, HollowError::Parse(_)));
    }

    #[test]
    fn save_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("Top_hollow.stl");

        let cube = MeshBuilder::cuboid(Pos::zeros(), Pos::repeat(1.0));
        save_mesh(&path, &cube).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 84 + 50 * 12);

        let sphere = MeshBuilder::sphere(Pos::zeros(), 1.0, 4, 6);
        save_mesh(&path, &sphere).unwrap();
        let expected = 84 + 50 * sphere.face_count() as u64;
        assert_eq!(fs::metadata(&path).unwrap().len(), expected);

        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
