use common::progress::Progress;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use crate::{geometry::bvh::Bvh, mesh::Mesh, Pos};

/// Offset applied to ray origins, relative to the size of the model, so rays
/// do not hit the face they start from.
const ORIGIN_OFFSET: f32 = 1e-5;

/// The thinnest section of a mesh found by [`min_local_thickness`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalThickness {
    pub thickness: f32,
    /// Face the measuring ray started from.
    pub face: usize,
}

/// Distance through the solid measured from the center of one face, straight
/// inward against its normal. `None` for degenerate faces or if the ray leaves
/// through a hole in the mesh.
pub fn face_thickness(mesh: &Mesh, bvh: &Bvh, face: usize) -> Option<f32> {
    let normal = mesh.normal(face);
    if normal == Pos::zeros() {
        return None;
    }

    let [v0, v1, v2] = mesh.face_verts(face);
    let center = (v0 + v1 + v2) / 3.0;
    let epsilon = ORIGIN_OFFSET * mesh.dimensions().max().max(1.0);

    let origin = center - normal * epsilon;
    bvh.intersect_ray(mesh, origin, -normal)
        .map(|hit| hit.t + epsilon)
}

/// Estimates the minimum local thickness of a closed mesh by casting a ray
/// inward from every face. Faces are processed in parallel; `progress` is
/// advanced once per face.
pub fn min_local_thickness(mesh: &Mesh, bvh: &Bvh, progress: &Progress) -> Option<LocalThickness> {
    let thinnest = (0..mesh.face_count())
        .into_par_iter()
        .filter_map(|face| {
            let thickness = face_thickness(mesh, bvh, face);
            progress.add_complete(1);
            thickness.map(|thickness| LocalThickness { thickness, face })
        })
        .reduce_with(|a, b| {
            // Ties go to the lower face index so the result never depends on
            // how rayon split the work.
            match a.thickness.total_cmp(&b.thickness).then(a.face.cmp(&b.face)) {
                std::cmp::Ordering::Greater => b,
                _ => a,
            }
        });

    if let Some(thinnest) = thinnest {
        debug!(
            thickness = thinnest.thickness,
            face = thinnest.face,
            "Found thinnest section"
        );
    }

    thinnest
}
