use std::sync::Arc;

use crate::{
    geometry::{
        triangle::{closest_point, ray_triangle},
        Hit, Ray,
    },
    mesh::Mesh,
    Pos,
};
use bvh_node::{build_nodes, BvhNode};

mod bounding_box;
mod bvh_node;

const LEAF_SIZE: usize = 8;

/// Bounding volume hierarchy over the faces of a mesh. The mesh itself is not
/// stored, so every query takes the mesh the hierarchy was built from.
#[derive(Clone)]
pub struct Bvh {
    nodes: Arc<[BvhNode]>,
    order: Arc<[usize]>,
}

impl Bvh {
    pub fn build(mesh: &Mesh) -> Self {
        let (nodes, order) = build_nodes(mesh);
        Self {
            nodes: nodes.into(),
            order: order.into(),
        }
    }

    fn root(&self) -> Option<usize> {
        self.nodes.len().checked_sub(1)
    }

    fn leaf_faces(&self, node: &BvhNode) -> &[usize] {
        match node {
            BvhNode::Leaf { faces, .. } => &self.order[faces.clone()],
            BvhNode::Branch { .. } => &[],
        }
    }

    /// Nearest face the ray passes through.
    pub fn cast(&self, mesh: &Mesh, ray: Ray) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        let mut stack = (self.root())
            .and_then(|root| Some((root, self.nodes[root].bounds().entry(ray)?)))
            .into_iter()
            .collect::<Vec<_>>();

        while let Some((index, entry)) = stack.pop() {
            if best.is_some_and(|best| entry > best.t) {
                continue;
            }

            let node = &self.nodes[index];
            for &face in self.leaf_faces(node) {
                if let Some(hit) = ray_triangle(mesh, face, ray) {
                    if best.map_or(true, |best| hit.t < best.t) {
                        best = Some(hit);
                    }
                }
            }

            if let BvhNode::Branch { children, .. } = node {
                let mut next = children
                    .map(|child| (child, self.nodes[child].bounds().entry(ray)));
                // Far child goes on the stack first so the near one is
                // searched first.
                next.sort_by(|a, b| b.1.unwrap_or(f32::MAX).total_cmp(&a.1.unwrap_or(f32::MAX)));
                stack.extend(
                    (next.into_iter()).filter_map(|(child, entry)| Some((child, entry?))),
                );
            }
        }

        best
    }

    pub fn intersect_ray(&self, mesh: &Mesh, origin: Pos, direction: Pos) -> Option<Hit> {
        self.cast(mesh, Ray::new(origin, direction))
    }

    /// Number of faces a ray starting at `origin` passes through.
    pub fn crossings(&self, mesh: &Mesh, origin: Pos, direction: Pos) -> usize {
        let ray = Ray::new(origin, direction);
        let mut count = 0;
        let mut stack = self.root().into_iter().collect::<Vec<_>>();

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.bounds().entry(ray).is_none() {
                continue;
            }

            count += (self.leaf_faces(node).iter())
                .filter(|&&face| ray_triangle(mesh, face, ray).is_some())
                .count();

            if let BvhNode::Branch { children, .. } = node {
                stack.extend(children);
            }
        }

        count
    }

    /// Parity test for whether a point is enclosed by a closed mesh.
    pub fn contains(&self, mesh: &Mesh, point: Pos) -> bool {
        self.crossings(mesh, point, parity_direction()) % 2 == 1
    }

    /// Closest point on the surface of the mesh. The returned hit's `t` is the
    /// distance to that point.
    pub fn closest(&self, mesh: &Mesh, point: Pos) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        let mut best_squared = f32::INFINITY;
        let mut stack = (self.root())
            .map(|root| (root, self.nodes[root].bounds().distance_squared(point)))
            .into_iter()
            .collect::<Vec<_>>();

        while let Some((index, distance)) = stack.pop() {
            if distance >= best_squared {
                continue;
            }

            let node = &self.nodes[index];
            for &face in self.leaf_faces(node) {
                let position = closest_point(mesh, face, point);
                let squared = (position - point).norm_squared();
                if squared < best_squared {
                    best_squared = squared;
                    best = Some(Hit {
                        position,
                        t: squared,
                        face,
                    });
                }
            }

            if let BvhNode::Branch { children, .. } = node {
                let mut next =
                    children.map(|child| (child, self.nodes[child].bounds().distance_squared(point)));
                next.sort_by(|a, b| b.1.total_cmp(&a.1));
                stack.extend(next);
            }
        }

        best.map(|hit| Hit {
            t: hit.t.sqrt(),
            ..hit
        })
    }
}

/// Not aligned with any axis or diagonal, so rays rarely graze the edges of
/// axis aligned models.
fn parity_direction() -> Pos {
    Pos::new(0.5377, 0.6121, 0.5797)
}
