use tracing::{debug, warn};

use crate::{
    error::{HollowError, HollowResult},
    half_edge::HalfEdgeMesh,
    mesh::Mesh,
    Pos,
};

/// Topology and size summary of a mesh.
#[derive(Debug, Clone)]
pub struct MeshReport {
    pub vertices: usize,
    pub faces: usize,

    pub boundary_edges: usize,
    pub non_manifold_edges: usize,
    pub inconsistent_edges: usize,
    pub degenerate_faces: usize,

    pub volume: f64,
    pub surface_area: f64,
    pub bounds: (Pos, Pos),
}

impl MeshReport {
    pub fn new(mesh: &Mesh) -> Self {
        let half_edge = HalfEdgeMesh::build(mesh);
        let degenerate_faces = (0..mesh.face_count())
            .filter(|&face| mesh.normal(face) == Pos::zeros())
            .count();

        Self {
            vertices: mesh.vertex_count(),
            faces: mesh.face_count(),

            boundary_edges: half_edge.boundary_edges(),
            non_manifold_edges: half_edge.non_manifold_edges(),
            inconsistent_edges: half_edge.inconsistent_edges(),
            degenerate_faces,

            volume: mesh.volume(),
            surface_area: mesh.surface_area(),
            bounds: mesh.bounds(),
        }
    }

    /// Every edge is shared by exactly two faces.
    pub fn is_watertight(&self) -> bool {
        self.faces > 0 && self.boundary_edges == 0 && self.non_manifold_edges == 0
    }

    /// Watertight and every pair of neighboring faces agree on winding.
    pub fn is_oriented(&self) -> bool {
        self.is_watertight() && self.inconsistent_edges == 0
    }

    /// Oriented with outward facing normals, so it encloses positive volume.
    pub fn is_solid(&self) -> bool {
        self.is_oriented() && self.volume > 0.0
    }

    pub fn dimensions(&self) -> Pos {
        self.bounds.1 - self.bounds.0
    }
}

/// Makes sure a mesh can be hollowed. Closed meshes that are wound inside out
/// are flipped rather than rejected.
pub fn check_solid(mesh: &Mesh) -> HollowResult<Mesh> {
    if mesh.is_empty() {
        return Err(HollowError::EmptyMesh);
    }

    let report = MeshReport::new(mesh);
    debug!(
        vertices = report.vertices,
        faces = report.faces,
        boundary_edges = report.boundary_edges,
        non_manifold_edges = report.non_manifold_edges,
        inconsistent_edges = report.inconsistent_edges,
        degenerate_faces = report.degenerate_faces,
        volume = report.volume,
        "Checked mesh"
    );

    if !report.is_oriented() {
        return Err(HollowError::NotSolid {
            boundary_edges: report.boundary_edges,
            non_manifold_edges: report.non_manifold_edges,
            inconsistent_edges: report.inconsistent_edges,
        });
    }

    if report.volume < 0.0 {
        warn!("Mesh is inside out, flipping faces");
        return Ok(mesh.flipped());
    }

    if report.volume == 0.0 {
        return Err(HollowError::EmptyMesh);
    }

    Ok(mesh.clone())
}

#[cfg(test)]
mod tests {
    use super::{check_solid, MeshReport};
    use crate::{builder::MeshBuilder, error::HollowError, mesh::Mesh, Pos};

    #[test]
    fn cube_is_solid() {
        let cube = MeshBuilder::cuboid(Pos::zeros(), Pos::new(1.0, 2.0, 3.0));
        let report = MeshReport::new(&cube);

        assert!(report.is_solid());
        assert_eq!(report.degenerate_faces, 0);
        assert_eq!(report.dimensions(), Pos::new(1.0, 2.0, 3.0));
        assert_eq!(check_solid(&cube).unwrap(), cube);
    }

    #[test]
    fn inside_out_is_flipped() {
        let cube = MeshBuilder::cuboid(Pos::zeros(), Pos::repeat(2.0));
        let report = MeshReport::new(&cube.flipped());
        assert!(report.is_oriented());
        assert!(!report.is_solid());

        let fixed = check_solid(&cube.flipped()).unwrap();
        assert!((fixed.volume() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn open_mesh_is_rejected() {
        let cube = MeshBuilder::cuboid(Pos::zeros(), Pos::repeat(2.0));
        let open = Mesh::new(cube.vertices().to_vec(), cube.faces()[2..].to_vec());

        match check_solid(&open) {
            Err(HollowError::NotSolid { boundary_edges, .. }) => assert_eq!(boundary_edges, 4),
            other => panic!("expected NotSolid, got {other:?}"),
        }
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert!(matches!(
            check_solid(&Mesh::default()),
            Err(HollowError::EmptyMesh)
        ));
    }
}
