use nalgebra::Vector3;

pub mod builder;
pub mod error;
pub mod format;
pub mod geometry;
pub mod half_edge;
pub mod hollow;
pub mod mesh;
pub mod offset;
pub mod thickness;
pub mod validate;

pub use common::config::HollowMethod;
pub use error::{HollowError, HollowResult};
pub use hollow::{hollow, HollowParams, HollowStats, Hollowed};

pub type Pos = Vector3<f32>;
