use std::collections::HashMap;

use crate::mesh::Mesh;

/// Directed edge view of a mesh, used to check that a surface is closed and
/// consistently wound before it gets hollowed.
#[derive(Clone)]
pub struct HalfEdgeMesh {
    half_edges: Vec<HalfEdge>,
    vertex_count: usize,

    boundary_edges: usize,
    non_manifold_edges: usize,
    inconsistent_edges: usize,
}

/// Edge of a face, running from `origin_vertex` to the next corner.
#[derive(Debug, Clone)]
struct HalfEdge {
    origin_vertex: u32,
    face: u32,
}

#[derive(Default)]
struct EdgeUses {
    forward: u32,
    backward: u32,
}

impl HalfEdgeMesh {
    pub fn build(mesh: &Mesh) -> Self {
        let mut half_edges = Vec::with_capacity(mesh.face_count() * 3);
        let mut uses = HashMap::<(u32, u32), EdgeUses>::new();

        for (face_idx, face) in mesh.faces().iter().enumerate() {
            for i in 0..3 {
                let (origin, vertex) = (face[i], face[(i + 1) % 3]);
                half_edges.push(HalfEdge {
                    origin_vertex: origin,
                    face: face_idx as u32,
                });

                let entry = uses.entry((origin.min(vertex), origin.max(vertex))).or_default();
                if origin < vertex {
                    entry.forward += 1;
                } else {
                    entry.backward += 1;
                }
            }
        }

        let (mut boundary_edges, mut non_manifold_edges, mut inconsistent_edges) = (0, 0, 0);
        for EdgeUses { forward, backward } in uses.values() {
            match forward + backward {
                1 => boundary_edges += 1,
                2 if *forward != 1 => inconsistent_edges += 1,
                2 => {}
                _ => non_manifold_edges += 1,
            }
        }

        Self {
            half_edges,
            vertex_count: mesh.vertex_count(),
            boundary_edges,
            non_manifold_edges,
            inconsistent_edges,
        }
    }

    /// Edges used by a single face.
    pub fn boundary_edges(&self) -> usize {
        self.boundary_edges
    }

    /// Edges shared by more than two faces.
    pub fn non_manifold_edges(&self) -> usize {
        self.non_manifold_edges
    }

    /// Edges shared by two faces that both traverse it in the same direction.
    pub fn inconsistent_edges(&self) -> usize {
        self.inconsistent_edges
    }

    /// Lists the faces touching each vertex. Vertices not used by any face get
    /// an empty list.
    pub fn vertex_faces(&self) -> Vec<Vec<u32>> {
        let mut out = vec![Vec::new(); self.vertex_count];
        for edge in self.half_edges.iter() {
            out[edge.origin_vertex as usize].push(edge.face);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::HalfEdgeMesh;
    use crate::{builder::MeshBuilder, mesh::Mesh, Pos};

    #[test]
    fn closed_cube() {
        let cube = MeshBuilder::cuboid(Pos::zeros(), Pos::repeat(1.0));
        let half_edge = HalfEdgeMesh::build(&cube);

        assert_eq!(half_edge.boundary_edges(), 0);
        assert_eq!(half_edge.non_manifold_edges(), 0);
        assert_eq!(half_edge.inconsistent_edges(), 0);

        let faces = half_edge.vertex_faces();
        assert_eq!(faces.len(), 8);
        assert_eq!(faces.iter().map(Vec::len).sum::<usize>(), 36);
        assert!(faces.iter().all(|x| x.len() >= 3));
    }

    #[test]
    fn missing_face_leaves_boundary() {
        let cube = MeshBuilder::cuboid(Pos::zeros(), Pos::repeat(1.0));
        let open = Mesh::new(cube.vertices().to_vec(), cube.faces()[1..].to_vec());
        let half_edge = HalfEdgeMesh::build(&open);

        assert_eq!(half_edge.boundary_edges(), 3);
        assert_eq!(half_edge.inconsistent_edges(), 0);

        // Corners of the missing face lose one neighbor each.
        let faces = half_edge.vertex_faces();
        assert_eq!(faces.iter().map(Vec::len).sum::<usize>(), 33);
    }

    #[test]
    fn flipped_face_is_inconsistent() {
        let cube = MeshBuilder::cuboid(Pos::zeros(), Pos::repeat(1.0));
        let mut faces = cube.faces().to_vec();
        faces[0] = [faces[0][0], faces[0][2], faces[0][1]];
        let half_edge = HalfEdgeMesh::build(&Mesh::new(cube.vertices().to_vec(), faces));

        assert_eq!(half_edge.boundary_edges(), 0);
        assert_eq!(half_edge.inconsistent_edges(), 3);
    }

    #[test]
    fn fin_is_non_manifold() {
        let cube = MeshBuilder::cuboid(Pos::zeros(), Pos::repeat(1.0));
        let mut vertices = cube.vertices().to_vec();
        let fin = vertices.len() as u32;
        vertices.push(Pos::new(-1.0, 0.0, 0.5));

        // Third face hanging off the edge between corners 0 and 4.
        let mut faces = cube.faces().to_vec();
        faces.push([0, 4, fin]);
        let half_edge = HalfEdgeMesh::build(&Mesh::new(vertices, faces));

        assert_eq!(half_edge.non_manifold_edges(), 1);
        assert_eq!(half_edge.boundary_edges(), 2);
    }
}
