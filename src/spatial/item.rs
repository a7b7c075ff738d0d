//! Item and observer contracts for the spatial octree

use std::rc::Rc;
use std::sync::Arc;

use crate::math::Aabb;

/// Capability contract for anything a spatial octree can index.
///
/// The tree stores whatever handle it is given (a value, a reference, a
/// shared pointer, an ID wrapper) and only ever asks it for a bounding
/// box; the referent stays externally owned.
pub trait Bounded {
    /// Axis-aligned bounding box of this item in world space
    fn bounds(&self) -> Aabb;
}

impl<T: Bounded + ?Sized> Bounded for &T {
    fn bounds(&self) -> Aabb {
        (**self).bounds()
    }
}

impl<T: Bounded + ?Sized> Bounded for Box<T> {
    fn bounds(&self) -> Aabb {
        (**self).bounds()
    }
}

impl<T: Bounded + ?Sized> Bounded for Rc<T> {
    fn bounds(&self) -> Aabb {
        (**self).bounds()
    }
}

impl<T: Bounded + ?Sized> Bounded for Arc<T> {
    fn bounds(&self) -> Aabb {
        (**self).bounds()
    }
}

/// Observer notified synchronously when the octree grows new partition
/// nodes, so consumers can react to topology growth (e.g. pre-allocating
/// per-node render state) without polling.
pub trait OctreeListener {
    /// Called once per child, in octant order, when a node subdivides
    fn node_created(&mut self, parent: &Aabb, child: &Aabb);
}
