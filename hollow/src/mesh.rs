use std::sync::Arc;

use nalgebra::{Matrix4, Vector3};

use crate::Pos;

/// A triangle mesh made of vertices and indexed faces. The vertex and face
/// buffers are shared, so cloning a mesh is cheap. Every transformation
/// returns a new mesh rather than editing this one.
#[derive(Debug, Clone)]
pub struct Mesh {
    inner: Arc<MeshInner>,
}

#[derive(Debug)]
struct MeshInner {
    vertices: Box<[Pos]>,
    faces: Box<[[u32; 3]]>,
}

impl Mesh {
    /// Creates a new mesh from the given vertices and faces. Faces are
    /// expected to wind counter-clockwise when viewed from outside.
    pub fn new(vertices: Vec<Pos>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            inner: Arc::new(MeshInner {
                vertices: vertices.into_boxed_slice(),
                faces: faces.into_boxed_slice(),
            }),
        }
    }

    pub fn vertices(&self) -> &[Pos] {
        self.inner.vertices.as_ref()
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        self.inner.faces.as_ref()
    }

    pub fn face(&self, index: usize) -> &[u32; 3] {
        &self.faces()[index]
    }

    pub fn face_verts(&self, index: usize) -> [Pos; 3] {
        let (v, f) = (self.vertices(), self.face(index));
        [v[f[0] as usize], v[f[1] as usize], v[f[2] as usize]]
    }

    /// Unit normal of a face. Degenerate faces get a zero vector.
    pub fn normal(&self, index: usize) -> Pos {
        let [v0, v1, v2] = self.face_verts(index);
        let edge1 = v2 - v1;
        let edge2 = v0 - v1;
        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Pos::zeros)
    }

    pub fn area(&self, index: usize) -> f32 {
        let [v0, v1, v2] = self.face_verts(index);
        (v1 - v0).cross(&(v2 - v0)).magnitude() / 2.0
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    pub fn face_count(&self) -> usize {
        self.faces().len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces().is_empty()
    }

    /// Get the minimum and maximum of each component of every vertex in the
    /// model. These points define the bounding box of the model.
    pub fn bounds(&self) -> (Pos, Pos) {
        vertex_bounds(self.vertices())
    }

    /// Size of the bounding box along each axis.
    pub fn dimensions(&self) -> Pos {
        let (min, max) = self.bounds();
        max - min
    }

    /// Signed enclosed volume, summed over the tetrahedra each face makes with
    /// the origin. Positive for a closed mesh with outward facing normals.
    pub fn volume(&self) -> f64 {
        (0..self.face_count())
            .map(|face| {
                let [v0, v1, v2] = self.face_verts(face).map(|v| v.cast::<f64>());
                v0.dot(&v1.cross(&v2))
            })
            .sum::<f64>()
            / 6.0
    }

    pub fn surface_area(&self) -> f64 {
        (0..self.face_count())
            .map(|face| self.area(face) as f64)
            .sum()
    }

    /// Center of mass of the enclosed volume, assuming uniform density. Falls
    /// back to the center of the bounding box for meshes without volume.
    pub fn centroid(&self) -> Pos {
        let mut weighted = Vector3::<f64>::zeros();
        let mut total = 0.0;

        for face in 0..self.face_count() {
            let [v0, v1, v2] = self.face_verts(face).map(|v| v.cast::<f64>());
            let volume = v0.dot(&v1.cross(&v2)) / 6.0;
            weighted += (v0 + v1 + v2) / 4.0 * volume;
            total += volume;
        }

        if total.abs() <= f64::EPSILON {
            let (min, max) = self.bounds();
            return (min + max) / 2.0;
        }

        (weighted / total).cast::<f32>()
    }

    /// Returns a copy of this mesh with every face wound the other way,
    /// turning its normals inside out.
    pub fn flipped(&self) -> Mesh {
        let faces = self.faces().iter().map(|&[a, b, c]| [a, c, b]).collect();
        Mesh::new(self.vertices().to_vec(), faces)
    }

    /// Returns a copy of this mesh with the same faces but new vertex
    /// positions.
    pub fn with_vertices(&self, vertices: Vec<Pos>) -> Mesh {
        debug_assert_eq!(vertices.len(), self.vertex_count());
        Self {
            inner: Arc::new(MeshInner {
                vertices: vertices.into_boxed_slice(),
                faces: self.inner.faces.clone(),
            }),
        }
    }

    /// Applies an affine transformation to every vertex.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Mesh {
        let vertices = (self.vertices().iter())
            .map(|v| (matrix * v.push(1.0)).xyz())
            .collect();
        self.with_vertices(vertices)
    }

    /// Combines two meshes into one, keeping both sets of faces.
    pub fn merge(&self, other: &Mesh) -> Mesh {
        let offset = self.vertex_count() as u32;

        let mut vertices = Vec::with_capacity(self.vertex_count() + other.vertex_count());
        vertices.extend_from_slice(self.vertices());
        vertices.extend_from_slice(other.vertices());

        let mut faces = Vec::with_capacity(self.face_count() + other.face_count());
        faces.extend_from_slice(self.faces());
        faces.extend(other.faces().iter().map(|&face| face.map(|x| x + offset)));

        Mesh::new(vertices, faces)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Mesh::new(Vec::new(), Vec::new())
    }
}

impl PartialEq for Mesh {
    fn eq(&self, other: &Self) -> bool {
        self.vertices() == other.vertices() && self.faces() == other.faces()
    }
}

/// Get the minimum and maximum of each component of every vertex.
/// These points define the bounding box of the model.
fn vertex_bounds(vertices: &[Pos]) -> (Pos, Pos) {
    if vertices.is_empty() {
        return (Pos::zeros(), Pos::zeros());
    }

    vertices.iter().fold(
        (Pos::repeat(f32::MAX), Pos::repeat(f32::MIN)),
        |(min, max), v| (min.inf(v), max.sup(v)),
    )
}
