use std::{io, path::PathBuf};

use thiserror::Error;

pub type HollowResult<T> = Result<T, HollowError>;

/// Everything that can stop a hollowing run. None of these leave an output
/// file behind.
#[derive(Debug, Error)]
pub enum HollowError {
    #[error("input mesh `{}` not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("i/o error on `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse mesh: {0}")]
    Parse(String),

    #[error("unsupported mesh format `{extension}`")]
    UnsupportedFormat { extension: String },

    #[error("mesh has no faces")]
    EmptyMesh,

    #[error(
        "mesh is not a closed solid ({boundary_edges} boundary edges, \
         {non_manifold_edges} non-manifold edges, {inconsistent_edges} inconsistently wound edges)"
    )]
    NotSolid {
        boundary_edges: usize,
        non_manifold_edges: usize,
        inconsistent_edges: usize,
    },

    #[error("wall thickness must be a positive number, got {0}")]
    InvalidThickness(f32),

    #[error(
        "wall thickness {requested:.3}mm is too large, the thinnest section is \
         {min_thickness:.3}mm so walls must be under {limit:.3}mm"
    )]
    ThicknessTooLarge {
        requested: f32,
        min_thickness: f32,
        limit: f32,
    },

    #[error(
        "inner surface is degenerate ({inverted_faces} inverted faces, \
         {escaped_vertices} vertices outside the solid, thinnest wall {min_wall:.3}mm)"
    )]
    Degenerate {
        inverted_faces: usize,
        escaped_vertices: usize,
        min_wall: f32,
    },

    #[error("refusing to overwrite input mesh `{}`", .path.display())]
    OverwriteInput { path: PathBuf },
}

impl HollowError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => HollowError::NotFound { path },
            _ => HollowError::Io { path, source },
        }
    }
}
