//! Mathematical utilities and data structures

pub mod region;
pub mod aabb;
pub mod frustum;

pub use region::Region;
pub use aabb::Aabb;
pub use frustum::{Plane, Frustum, FrustumClass};
