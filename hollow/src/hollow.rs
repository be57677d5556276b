use std::{
    fs,
    path::Path,
    time::{Duration, Instant},
};

use common::{
    config::{HollowConfig, HollowMethod},
    progress::Progress,
};
use nalgebra::Matrix4;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info};

use crate::{
    error::{HollowError, HollowResult},
    format,
    geometry::bvh::Bvh,
    mesh::Mesh,
    offset::{inverted_faces, offset_inward},
    thickness::min_local_thickness,
    validate::check_solid,
};

/// Parameters for [`hollow`].
#[derive(Debug, Clone, PartialEq)]
pub struct HollowParams {
    /// Target wall thickness in model units (mm for printable parts).
    pub wall_thickness: f32,
    pub method: HollowMethod,

    /// Bounds on the scale factor used by [`HollowMethod::Scale`].
    pub min_scale: f32,
    pub max_scale: f32,

    /// Cap on how far a single vertex may move, as a multiple of the wall
    /// thickness. Only used by [`HollowMethod::Offset`].
    pub max_displacement: f32,
    /// Fraction of the wall thickness every inner vertex must keep from the
    /// outer surface. Only used by [`HollowMethod::Offset`].
    pub min_wall_ratio: f32,
}

/// A hollowed mesh together with what it took to make it.
#[derive(Debug, Clone)]
pub struct Hollowed {
    /// Outer surface plus the inward facing cavity surface.
    pub mesh: Mesh,
    /// The cavity surface, still wound like the outer surface.
    pub inner: Mesh,
    pub stats: HollowStats,
}

#[derive(Debug, Clone)]
pub struct HollowStats {
    pub method: HollowMethod,
    pub wall_thickness: f32,

    pub input_vertices: usize,
    pub input_faces: usize,
    pub output_vertices: usize,
    pub output_faces: usize,

    pub input_volume: f64,
    pub cavity_volume: f64,
    pub output_volume: f64,

    /// Scale applied to the cavity, only set for [`HollowMethod::Scale`].
    pub scale_factor: Option<f32>,
    /// Thinnest section of the input, only measured for
    /// [`HollowMethod::Offset`].
    pub min_local_thickness: Option<f32>,
    /// Smallest distance from a cavity vertex to the outer surface.
    pub min_wall: f32,

    pub elapsed: Duration,
}

impl HollowStats {
    /// Fraction of the original material removed by the cavity.
    pub fn material_savings(&self) -> f64 {
        self.cavity_volume / self.input_volume
    }
}

/// Hollows out a closed mesh, leaving walls of roughly
/// `params.wall_thickness`. The input is left untouched.
pub fn hollow(mesh: &Mesh, params: &HollowParams) -> HollowResult<Hollowed> {
    hollow_with_progress(mesh, params, &Progress::new())
}

/// Same as [`hollow`], reporting progress through the thickness analysis and
/// the cavity checks. `progress` is marked finished when this returns,
/// whether or not it succeeded.
pub fn hollow_with_progress(
    mesh: &Mesh,
    params: &HollowParams,
    progress: &Progress,
) -> HollowResult<Hollowed> {
    let result = hollow_inner(mesh, params, progress);
    progress.set_finished();
    result
}

fn hollow_inner(mesh: &Mesh, params: &HollowParams, progress: &Progress) -> HollowResult<Hollowed> {
    let start = Instant::now();
    let thickness = params.wall_thickness;
    if !(thickness.is_finite() && thickness > 0.0) {
        return Err(HollowError::InvalidThickness(thickness));
    }

    let outer = check_solid(mesh)?;
    let bvh = Bvh::build(&outer);

    info!(
        vertices = outer.vertex_count(),
        faces = outer.face_count(),
        wall_thickness = thickness,
        method = %params.method,
        "Hollowing mesh"
    );

    let (inner, scale, local_thickness) = match params.method {
        HollowMethod::Offset => {
            progress.set_total((outer.face_count() + outer.vertex_count()) as u64);
            let thinnest = min_local_thickness(&outer, &bvh, progress);

            if let Some(thinnest) = thinnest {
                if 2.0 * thickness >= thinnest.thickness {
                    return Err(HollowError::ThicknessTooLarge {
                        requested: thickness,
                        min_thickness: thinnest.thickness,
                        limit: thinnest.thickness / 2.0,
                    });
                }
            }

            let inner = offset_inward(&outer, thickness, params.max_displacement);
            (inner, None, thinnest.map(|x| x.thickness))
        }
        HollowMethod::Scale => {
            progress.set_total(outer.vertex_count() as u64);
            let min_dim = outer.dimensions().min();
            if 2.0 * thickness >= min_dim {
                return Err(HollowError::ThicknessTooLarge {
                    requested: thickness,
                    min_thickness: min_dim,
                    limit: min_dim / 2.0,
                });
            }

            let scale = scale_factor(&outer, params);
            let center = outer.centroid();
            let matrix = Matrix4::new_translation(&center)
                * Matrix4::new_scaling(scale)
                * Matrix4::new_translation(&-center);

            debug!(scale, ?center, "Scaling cavity about centroid");
            (outer.transformed(&matrix), Some(scale), None)
        }
    };

    let min_wall = match params.method {
        HollowMethod::Offset => thickness * params.min_wall_ratio,
        HollowMethod::Scale => 0.0,
    };
    let wall = check_cavity(&outer, &bvh, &inner, min_wall, progress)?;

    let input_volume = outer.volume();
    let cavity_volume = inner.volume();
    if !(cavity_volume > 0.0 && cavity_volume < input_volume) {
        return Err(HollowError::Degenerate {
            inverted_faces: 0,
            escaped_vertices: 0,
            min_wall: wall,
        });
    }

    let hollowed = outer.merge(&inner.flipped());
    let stats = HollowStats {
        method: params.method,
        wall_thickness: thickness,

        input_vertices: outer.vertex_count(),
        input_faces: outer.face_count(),
        output_vertices: hollowed.vertex_count(),
        output_faces: hollowed.face_count(),

        input_volume,
        cavity_volume,
        output_volume: hollowed.volume(),

        scale_factor: scale,
        min_local_thickness: local_thickness,
        min_wall: wall,

        elapsed: start.elapsed(),
    };

    info!(
        output_faces = stats.output_faces,
        output_volume = stats.output_volume,
        savings = stats.material_savings(),
        min_wall = stats.min_wall,
        "Hollowed mesh"
    );

    Ok(Hollowed {
        mesh: hollowed,
        inner,
        stats,
    })
}

/// Scale factor that shrinks the smallest bounding box dimension by twice the
/// wall thickness, clamped to the configured bounds.
pub fn scale_factor(mesh: &Mesh, params: &HollowParams) -> f32 {
    let min_dim = mesh.dimensions().min();
    let scale = (min_dim - 2.0 * params.wall_thickness) / min_dim;
    scale.clamp(params.min_scale, params.max_scale)
}

/// Verifies that the cavity sits inside the outer surface without flipped
/// faces, keeping at least `min_wall` from it. Returns the thinnest wall.
fn check_cavity(
    outer: &Mesh,
    bvh: &Bvh,
    inner: &Mesh,
    min_wall: f32,
    progress: &Progress,
) -> HollowResult<f32> {
    let inverted_faces = inverted_faces(outer, inner);

    let walls = (inner.vertices().par_iter())
        .map(|&vertex| {
            let inside = bvh.contains(outer, vertex);
            let wall = bvh.closest(outer, vertex).map_or(0.0, |hit| hit.t);
            progress.add_complete(1);
            (inside, wall)
        })
        .collect::<Vec<_>>();

    let escaped_vertices = (walls.iter())
        .filter(|(inside, wall)| !inside || *wall < min_wall)
        .count();
    let thinnest = (walls.iter())
        .map(|(_, wall)| *wall)
        .fold(f32::MAX, f32::min);

    debug!(inverted_faces, escaped_vertices, thinnest, "Checked cavity");

    if inverted_faces > 0 || escaped_vertices > 0 {
        return Err(HollowError::Degenerate {
            inverted_faces,
            escaped_vertices,
            min_wall: thinnest,
        });
    }

    Ok(thinnest)
}

/// Loads `input`, hollows it and writes the result to `output`. The output
/// is only created once hollowing succeeds, and never replaces the input.
pub fn hollow_file(
    input: &Path,
    output: &Path,
    params: &HollowParams,
    progress: &Progress,
) -> HollowResult<Hollowed> {
    if same_file(input, output) {
        progress.set_finished();
        return Err(HollowError::OverwriteInput {
            path: output.to_path_buf(),
        });
    }

    let mesh = match format::load_mesh(input) {
        Ok(mesh) => mesh,
        Err(err) => {
            progress.set_finished();
            return Err(err);
        }
    };

    let hollowed = hollow_with_progress(&mesh, params, progress)?;
    format::save_mesh(output, &hollowed.mesh)?;
    Ok(hollowed)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }

    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl Default for HollowParams {
    fn default() -> Self {
        Self::from(&HollowConfig::default())
    }
}

impl From<&HollowConfig> for HollowParams {
    fn from(config: &HollowConfig) -> Self {
        Self {
            wall_thickness: config.wall_thickness,
            method: config.method,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            max_displacement: 4.0,
            min_wall_ratio: config.min_wall_ratio,
        }
    }
}

impl HollowParams {
    pub fn new(wall_thickness: f32) -> Self {
        Self {
            wall_thickness,
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: HollowMethod) -> Self {
        self.method = method;
        self
    }
}
