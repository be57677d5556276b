use nalgebra::{Matrix3, Vector3};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::debug;

use crate::{half_edge::HalfEdgeMesh, mesh::Mesh, Pos};

/// Singular values below this fraction of the largest one are treated as
/// zero when solving for a vertex displacement.
const RANK_TOLERANCE: f64 = 1e-3;

/// Moves every vertex of a closed mesh inward so that each face touching it
/// ends up `distance` behind its original plane.
///
/// For each vertex this solves, in the least squares sense, `n · d = -distance`
/// for the normals `n` of the surrounding faces. On flat regions this is a
/// plain move along the normal. Along creases and corners it moves further,
/// so the walls on both sides keep their thickness. Displacements are capped
/// at `max_displacement * distance` to keep needle-like spikes from shooting
/// through the opposite wall.
pub fn offset_inward(mesh: &Mesh, distance: f32, max_displacement: f32) -> Mesh {
    let vertex_faces = HalfEdgeMesh::build(mesh).vertex_faces();
    let normals = (0..mesh.face_count())
        .map(|face| mesh.normal(face).cast::<f64>())
        .collect::<Vec<_>>();

    let distance = distance as f64;
    let limit = max_displacement as f64 * distance;

    let displaced = (vertex_faces.par_iter())
        .zip(mesh.vertices().par_iter())
        .map(|(faces, vertex)| {
            let normals = faces.iter().map(|&face| &normals[face as usize]);
            let (displacement, clamped) = vertex_displacement(normals, distance, limit);
            (vertex + displacement.cast::<f32>(), clamped)
        })
        .collect::<Vec<_>>();

    let clamped = displaced.iter().filter(|(_, clamped)| *clamped).count();
    if clamped > 0 {
        debug!(clamped, "Capped displacement of sharp vertices");
    }

    mesh.with_vertices(displaced.into_iter().map(|(vertex, _)| vertex).collect())
}

/// Solves for the displacement of one vertex. Returns the displacement and
/// whether it had to be capped.
fn vertex_displacement<'a>(
    normals: impl Iterator<Item = &'a Vector3<f64>>,
    distance: f64,
    limit: f64,
) -> (Vector3<f64>, bool) {
    let mut normal_matrix = Matrix3::zeros();
    let mut target = Vector3::zeros();

    for normal in normals.filter(|x| **x != Vector3::zeros()) {
        normal_matrix += normal * normal.transpose();
        target -= normal * distance;
    }

    if target == Vector3::zeros() {
        return (target, false);
    }

    let svd = normal_matrix.svd(true, true);
    let eps = svd.singular_values.max() * RANK_TOLERANCE;
    let Ok(displacement) = svd.solve(&target, eps) else {
        return (Vector3::zeros(), false);
    };

    let length = displacement.magnitude();
    if length > limit {
        return (displacement * (limit / length), true);
    }

    (displacement, false)
}

/// Counts inner faces that point the opposite way to the outer face they were
/// offset from.
pub fn inverted_faces(outer: &Mesh, inner: &Mesh) -> usize {
    (0..outer.face_count())
        .filter(|&face| {
            let before = outer.normal(face);
            before != Pos::zeros() && before.dot(&inner.normal(face)) <= 0.0
        })
        .count()
}
