use crate::{
    geometry::Ray,
    mesh::Mesh,
    Pos,
};

/// Axis aligned box. A new box is empty and grows as points are added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Pos,
    max: Pos,
}

impl BoundingBox {
    pub fn new() -> Self {
        Self {
            min: Pos::repeat(f32::INFINITY),
            max: Pos::repeat(f32::NEG_INFINITY),
        }
    }

    pub fn of_face(mesh: &Mesh, face: usize) -> Self {
        (mesh.face_verts(face).into_iter()).fold(Self::new(), Self::with_point)
    }

    pub fn with_point(self, point: Pos) -> Self {
        Self {
            min: self.min.inf(&point),
            max: self.max.sup(&point),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn center(&self) -> Pos {
        (self.min + self.max) / 2.0
    }

    pub fn longest_axis(&self) -> usize {
        (self.max - self.min).imax()
    }

    /// Squared distance from the point to the nearest point of the box, zero
    /// when the point is inside.
    pub fn distance_squared(&self, point: Pos) -> f32 {
        let outside = (self.min - point).sup(&(point - self.max)).sup(&Pos::zeros());
        outside.norm_squared()
    }

    /// Slab test. Returns the ray parameter where the ray enters the box, or
    /// zero if it starts inside.
    pub fn entry(&self, ray: Ray) -> Option<f32> {
        let (mut near, mut far) = (0.0f32, f32::INFINITY);

        for axis in 0..3 {
            let inv = 1.0 / ray.direction[axis];
            let a = (self.min[axis] - ray.origin[axis]) * inv;
            let b = (self.max[axis] - ray.origin[axis]) * inv;

            // `f32::max` and `f32::min` skip NaN, which shows up when the ray
            // is parallel to and exactly on a slab plane.
            near = near.max(a.min(b));
            far = far.min(a.max(b));
        }

        (near <= far).then_some(near)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::BoundingBox;
    use crate::{
        geometry::Ray,
        Pos,
    };

    fn unit_box() -> BoundingBox {
        BoundingBox::new()
            .with_point(Pos::repeat(1.0))
            .with_point(Pos::repeat(2.0))
    }

    #[test]
    fn grows_from_empty() {
        let bounds = unit_box();
        assert_eq!(bounds.center(), Pos::repeat(1.5));
        assert_eq!(bounds.distance_squared(Pos::repeat(1.5)), 0.0);
        assert_eq!(bounds.distance_squared(Pos::new(0.0, 1.5, 1.5)), 1.0);
        assert_eq!(BoundingBox::new().union(&bounds), bounds);

        let tall = bounds.with_point(Pos::new(1.0, 1.0, 9.0));
        assert_eq!(tall.longest_axis(), 2);
    }

    #[test]
    fn slab_entry() {
        let bounds = unit_box();
        let towards = Ray::new(Pos::new(0.0, 1.5, 1.5), Pos::x());
        let away = Ray::new(Pos::new(0.0, 1.5, 1.5), -Pos::x());
        let inside = Ray::new(Pos::repeat(1.5), Pos::y());

        assert_eq!(bounds.entry(towards), Some(1.0));
        assert_eq!(bounds.entry(away), None);
        assert_eq!(bounds.entry(inside), Some(0.0));
    }
}
