use crate::Pos;

pub mod bvh;
pub mod triangle;

/// Where a query met the surface of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub position: Pos,
    /// Ray parameter for casts, distance for closest point queries.
    pub t: f32,
    pub face: usize,
}

/// The points `origin + t * direction` for `t >= 0`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Pos,
    pub direction: Pos,
}

impl Ray {
    pub fn new(origin: Pos, direction: Pos) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Pos {
        self.origin + self.direction * t
    }
}
