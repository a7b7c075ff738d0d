//! Recursive octant node of the spatial octree

use crate::math::{Aabb, Frustum, FrustumClass};

use super::item::{Bounded, OctreeListener};

/// One node of a spatial octree: a box, the items that do not fit cleanly
/// into any child octant, and up to 8 children created lazily on the first
/// insert attempt.
pub struct OctreeNode<T> {
    bounds: Aabb,
    depth: u8,
    items: Vec<T>,
    children: Option<Box<[OctreeNode<T>; 8]>>,
    /// Items stored in this node and all descendants. Lets traversals skip
    /// empty subtrees without descending into them.
    subtree_len: usize,
}

impl<T: Bounded> OctreeNode<T> {
    pub(crate) fn new(bounds: Aabb, depth: u8) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
            subtree_len: 0,
        }
    }

    /// This node's box
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Depth below the root (root is 0)
    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub(crate) fn subtree_len(&self) -> usize {
        self.subtree_len
    }

    pub(crate) fn node_count(&self) -> usize {
        1 + self
            .children
            .as_deref()
            .map_or(0, |c| c.iter().map(OctreeNode::node_count).sum::<usize>())
    }

    /// A node splits exactly once, unless it sits at max depth or its box
    /// is already no larger than one unit on every axis.
    fn can_subdivide(&self, max_depth: u8) -> bool {
        if self.children.is_some() || self.depth >= max_depth {
            return false;
        }
        let size = self.bounds.size();
        size.x > 1.0 || size.y > 1.0 || size.z > 1.0
    }

    fn subdivide(&mut self, listener: &mut Option<Box<dyn OctreeListener>>) {
        let children: Box<[OctreeNode<T>; 8]> = Box::new(std::array::from_fn(|i| {
            OctreeNode::new(self.bounds.child_octant(i as u8), self.depth + 1)
        }));
        if let Some(listener) = listener {
            for child in children.iter() {
                listener.node_created(&self.bounds, &child.bounds);
            }
        }
        self.children = Some(children);
    }

    /// Push the item to the deepest node whose box fully contains
    /// `item_bounds`; the caller has already checked containment against
    /// this node's box.
    pub(crate) fn insert(
        &mut self,
        item: T,
        item_bounds: &Aabb,
        max_depth: u8,
        listener: &mut Option<Box<dyn OctreeListener>>,
    ) {
        if self.can_subdivide(max_depth) {
            self.subdivide(listener);
        }
        self.subtree_len += 1;
        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                if child.bounds.contains_aabb(item_bounds) {
                    child.insert(item, item_bounds, max_depth, listener);
                    return;
                }
            }
        }
        self.items.push(item);
    }

    /// Walk the path insert would take, removing the first equality match
    /// among directly stored items along it.
    pub(crate) fn remove(&mut self, item: &T, item_bounds: &Aabb) -> bool
    where
        T: PartialEq,
    {
        if let Some(idx) = self.items.iter().position(|stored| stored == item) {
            self.items.remove(idx);
            self.subtree_len -= 1;
            return true;
        }
        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                if child.bounds.contains_aabb(item_bounds) {
                    if child.remove(item, item_bounds) {
                        self.subtree_len -= 1;
                        return true;
                    }
                    // only the first fully containing child lies on the
                    // insert path
                    break;
                }
            }
        }
        false
    }

    /// Append the whole subtree's items without any box testing
    pub(crate) fn collect_all<'a>(&'a self, out: &mut Vec<&'a T>) {
        out.extend(self.items.iter());
        if let Some(children) = self.children.as_deref() {
            for child in children.iter() {
                if child.subtree_len > 0 {
                    child.collect_all(out);
                }
            }
        }
    }

    /// Append every item in this subtree whose box intersects `query`.
    ///
    /// Children are classified in octant order: a child whose box fully
    /// contains the query terminates the sibling scan (nothing outside it
    /// can match); a child fully inside the query contributes its subtree
    /// without further testing; a merely intersecting child recurses.
    pub(crate) fn query_box<'a>(&'a self, query: &Aabb, out: &mut Vec<&'a T>) {
        for item in &self.items {
            if item.bounds().intersects(query) {
                out.push(item);
            }
        }
        let Some(children) = self.children.as_deref() else {
            return;
        };
        for child in children.iter() {
            if child.subtree_len == 0 {
                continue;
            }
            if child.bounds.contains_aabb(query) {
                child.query_box(query, out);
                return;
            } else if query.contains_aabb(&child.bounds) {
                child.collect_all(out);
            } else if child.bounds.intersects(query) {
                child.query_box(query, out);
            }
        }
    }

    /// Append every item in this subtree visible to `frustum`: fully
    /// inside children contribute their subtree untested, intersecting
    /// children recurse, outside children are pruned.
    pub(crate) fn query_frustum<'a>(&'a self, frustum: &Frustum, out: &mut Vec<&'a T>) {
        for item in &self.items {
            if frustum.classify_aabb(&item.bounds()) != FrustumClass::Outside {
                out.push(item);
            }
        }
        let Some(children) = self.children.as_deref() else {
            return;
        };
        for child in children.iter() {
            if child.subtree_len == 0 {
                continue;
            }
            match frustum.classify_aabb(&child.bounds) {
                FrustumClass::Inside => child.collect_all(out),
                FrustumClass::Intersecting => child.query_frustum(frustum, out),
                FrustumClass::Outside => {}
            }
        }
    }
}
