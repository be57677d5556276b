use crate::{
    geometry::{Hit, Ray},
    mesh::Mesh,
    Pos,
};

/// Möller-Trumbore ray triangle intersection. Hits from either side of the
/// face count. Rays parallel to the face and degenerate faces never hit.
pub fn ray_triangle(mesh: &Mesh, face: usize, ray: Ray) -> Option<Hit> {
    let [v0, v1, v2] = mesh.face_verts(face);
    let (edge1, edge2) = (v1 - v0, v2 - v0);

    let p = ray.direction.cross(&edge2);
    let det = edge1.dot(&p);
    let scale = edge1.cross(&edge2).norm() * ray.direction.norm();
    if scale == 0.0 || det.abs() <= f32::EPSILON * scale {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - v0;
    let u = s.dot(&p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = ray.direction.dot(&q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(&q) * inv_det;
    (t >= 0.0).then(|| Hit {
        position: ray.at(t),
        t,
        face,
    })
}

/// Closest point on a face to `point`, found by testing which Voronoi region
/// of the triangle the point projects into. See "Closest Point on Triangle to
/// Point" in Ericson's Real-Time Collision Detection.
pub fn closest_point(mesh: &Mesh, face: usize, point: Pos) -> Pos {
    let [a, b, c] = mesh.face_verts(face);
    let (ab, ac) = (b - a, c - a);

    let ap = point - a;
    let (d1, d2) = (ab.dot(&ap), ac.dot(&ap));
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = point - b;
    let (d3, d4) = (ab.dot(&bp), ac.dot(&bp));
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = point - c;
    let (d5, d6) = (ab.dot(&cp), ac.dot(&cp));
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && d4 >= d3 && d5 >= d6 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let sum = va + vb + vc;
    if !(sum > 0.0) {
        // Collinear corners that slipped through the edge tests.
        return [a, b, c]
            .into_iter()
            .min_by(|x, y| (x - point).norm_squared().total_cmp(&(y - point).norm_squared()))
            .unwrap_or(a);
    }

    a + ab * (vb / sum) + ac * (vc / sum)
}
