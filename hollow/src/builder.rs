use std::f32::consts::{PI, TAU};

use crate::{mesh::Mesh, Pos};

/// Builds meshes out of simple closed primitives. Every primitive is wound
/// counter-clockwise when viewed from outside.
pub struct MeshBuilder {
    vertices: Vec<Pos>,
    faces: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, vertex: Pos) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_face(&mut self, face: [u32; 3]) {
        self.faces.push(face);
    }

    /// Adds two faces covering the quad `a b c d`, given in counter-clockwise
    /// order.
    pub fn add_quad(&mut self, [a, b, c, d]: [u32; 4]) {
        self.add_face([a, b, c]);
        self.add_face([a, c, d]);
    }

    pub fn build(self) -> Mesh {
        Mesh::new(self.vertices, self.faces)
    }
}

impl MeshBuilder {
    /// Shorthand for a mesh holding a single axis aligned box.
    pub fn cuboid(origin: Pos, size: Pos) -> Mesh {
        let mut builder = Self::new();
        builder.add_cuboid(origin, size);
        builder.build()
    }

    /// Shorthand for a mesh holding a single sphere.
    pub fn sphere(center: Pos, radius: f32, rings: u32, segments: u32) -> Mesh {
        let mut builder = Self::new();
        builder.add_sphere(center, radius, rings, segments);
        builder.build()
    }

    /// Adds an axis aligned box with its minimum corner at `origin`.
    pub fn add_cuboid(&mut self, origin: Pos, size: Pos) {
        // Corner `i` sits at (x, y, z) = (i & 1, i >> 1 & 1, i >> 2 & 1) * size.
        let base = self.vertices.len() as u32;
        for i in 0..8 {
            let corner = Pos::new((i & 1) as f32, (i >> 1 & 1) as f32, (i >> 2 & 1) as f32);
            self.add_vertex(origin + corner.component_mul(&size));
        }

        let quads = [
            [0, 2, 3, 1], // -z
            [4, 5, 7, 6], // +z
            [0, 1, 5, 4], // -y
            [2, 6, 7, 3], // +y
            [0, 4, 6, 2], // -x
            [1, 3, 7, 5], // +x
        ];

        for quad in quads {
            self.add_quad(quad.map(|x| x + base));
        }
    }

    /// Adds a UV sphere. `rings` is the number of latitude bands and must be
    /// at least two; `segments` is the number of longitude slices and must be
    /// at least three.
    pub fn add_sphere(&mut self, center: Pos, radius: f32, rings: u32, segments: u32) {
        debug_assert!(rings >= 2 && segments >= 3);

        let north = self.add_vertex(center + Pos::z() * radius);
        let first = north + 1;
        for ring in 1..rings {
            let theta = PI * ring as f32 / rings as f32;
            for segment in 0..segments {
                let phi = TAU * segment as f32 / segments as f32;
                let direction = Pos::new(
                    theta.sin() * phi.cos(),
                    theta.sin() * phi.sin(),
                    theta.cos(),
                );
                self.add_vertex(center + direction * radius);
            }
        }
        let south = self.add_vertex(center - Pos::z() * radius);

        let ring_vertex = |ring: u32, segment: u32| first + (ring - 1) * segments + segment % segments;

        for segment in 0..segments {
            let (a, b) = (ring_vertex(1, segment), ring_vertex(1, segment + 1));
            self.add_face([north, a, b]);

            for ring in 1..rings - 1 {
                let (top, top_next) = (ring_vertex(ring, segment), ring_vertex(ring, segment + 1));
                let (bottom, bottom_next) = (
                    ring_vertex(ring + 1, segment),
                    ring_vertex(ring + 1, segment + 1),
                );
                self.add_quad([top, bottom, bottom_next, top_next]);
            }

            let (c, d) = (
                ring_vertex(rings - 1, segment),
                ring_vertex(rings - 1, segment + 1),
            );
            self.add_face([c, south, d]);
        }
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}
