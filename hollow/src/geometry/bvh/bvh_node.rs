use std::ops::Range;

use ordered_float::OrderedFloat;

use crate::mesh::Mesh;

use super::{bounding_box::BoundingBox, LEAF_SIZE};

pub enum BvhNode {
    /// Range into the hierarchy's face order.
    Leaf {
        bounds: BoundingBox,
        faces: Range<usize>,
    },
    Branch {
        bounds: BoundingBox,
        children: [usize; 2],
    },
}

impl BvhNode {
    pub fn bounds(&self) -> &BoundingBox {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Branch { bounds, .. } => bounds,
        }
    }
}

/// Builds the nodes of a hierarchy over every face of `mesh`. Returns the
/// nodes, with the root last, and the face order leaves index into.
pub fn build_nodes(mesh: &Mesh) -> (Vec<BvhNode>, Vec<usize>) {
    let face_bounds = (0..mesh.face_count())
        .map(|face| BoundingBox::of_face(mesh, face))
        .collect::<Vec<_>>();
    let mut order = (0..mesh.face_count()).collect::<Vec<_>>();

    // A binary tree with `n` leaves has `2n - 1` nodes.
    let mut arena = Vec::with_capacity(2 * order.len().div_ceil(LEAF_SIZE));
    if !order.is_empty() {
        build_node(&mut arena, &face_bounds, &mut order, 0);
    }

    (arena, order)
}

/// Splits `order` at the median face center along the longest axis of its
/// bounds, recursing until every leaf holds at most [`LEAF_SIZE`] faces.
fn build_node(
    arena: &mut Vec<BvhNode>,
    face_bounds: &[BoundingBox],
    order: &mut [usize],
    start: usize,
) -> usize {
    let bounds = (order.iter()).fold(BoundingBox::new(), |bounds, &face| {
        bounds.union(&face_bounds[face])
    });

    let node = if order.len() <= LEAF_SIZE {
        BvhNode::Leaf {
            bounds,
            faces: start..start + order.len(),
        }
    } else {
        let axis = bounds.longest_axis();
        let middle = order.len() / 2;
        order.select_nth_unstable_by_key(middle, |&face| {
            OrderedFloat(face_bounds[face].center()[axis])
        });

        let (left, right) = order.split_at_mut(middle);
        let left = build_node(arena, face_bounds, left, start);
        let right = build_node(arena, face_bounds, right, start + middle);

        BvhNode::Branch {
            bounds,
            children: [left, right],
        }
    };

    arena.push(node);
    arena.len() - 1
}

#[cfg(test)]
mod tests {
    use super::{build_nodes, BvhNode};
    use crate::{builder::MeshBuilder, geometry::bvh::LEAF_SIZE, Pos};

    #[test]
    fn leaves_cover_every_face_once() {
        let sphere = MeshBuilder::sphere(Pos::zeros(), 5.0, 12, 24);
        let (nodes, mut order) = build_nodes(&sphere);

        let mut covered = 0;
        for node in &nodes {
            if let BvhNode::Leaf { faces, .. } = node {
                assert!(!faces.is_empty() && faces.len() <= LEAF_SIZE);
                covered += faces.len();
            }
        }
        assert_eq!(covered, sphere.face_count());

        order.sort_unstable();
        assert!(order.iter().copied().eq(0..sphere.face_count()));
    }

    #[test]
    fn children_fit_in_parent() {
        let sphere = MeshBuilder::sphere(Pos::new(3.0, -2.0, 1.0), 2.0, 8, 16);
        let (nodes, _) = build_nodes(&sphere);

        for node in &nodes {
            if let BvhNode::Branch { bounds, children } = node {
                for child in children {
                    let child = nodes[*child].bounds();
                    assert_eq!(bounds.union(child), *bounds);
                }
            }
        }
    }
}
