use std::{fs::File, io::BufReader, path::Path};

use tracing::info;

use crate::{
    error::{HollowError, HollowResult},
    mesh::Mesh,
};

mod stl;

pub use stl::{read_stl, save_mesh, write_stl};

/// Loads a mesh from disk, picking the parser from the file extension.
pub fn load_mesh(path: &Path) -> HollowResult<Mesh> {
    let extension = path
        .extension()
        .and_then(|x| x.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if extension != "stl" {
        return Err(HollowError::UnsupportedFormat { extension });
    }

    let file = File::open(path).map_err(|err| HollowError::io(path, err))?;
    let mesh = read_stl(&mut BufReader::new(file))?;

    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Loaded `{}`",
        path.display()
    );

    Ok(mesh)
}
