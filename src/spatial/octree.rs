//! Generic spatial octree over bounded items

use crate::core::types::Vec3;
use crate::math::{Aabb, Frustum, FrustumClass};

use super::item::{Bounded, OctreeListener};
use super::node::OctreeNode;

/// Depth-bounded recursive spatial partition over axis-aligned boxes.
///
/// Stores handles to externally owned items, each describable by a
/// bounding box. Partition nodes are created lazily as items arrive;
/// an optional listener observes that growth. Mutation is single-writer:
/// `insert`/`remove`/`clear` take `&mut self`, queries take `&self` and
/// may run concurrently with each other.
pub struct SpatialOctree<T> {
    root: OctreeNode<T>,
    max_depth: u8,
    dirty: bool,
    listener: Option<Box<dyn OctreeListener>>,
}

impl<T: Bounded> SpatialOctree<T> {
    /// Create an empty tree rooted at `bounds`, subdividing at most
    /// `max_depth` levels below the root.
    pub fn new(bounds: Aabb, max_depth: u8) -> Self {
        Self {
            root: OctreeNode::new(bounds, 0),
            max_depth,
            dirty: false,
            listener: None,
        }
    }

    /// Install or remove the topology-growth observer
    pub fn set_listener(&mut self, listener: Option<Box<dyn OctreeListener>>) {
        self.listener = listener;
    }

    /// The root box
    pub fn bounds(&self) -> Aabb {
        self.root.bounds()
    }

    /// Maximum subdivision depth below the root
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Total items stored across the whole tree (not node count)
    pub fn count(&self) -> usize {
        self.root.subtree_len()
    }

    /// True when no items are stored
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Number of partition nodes, including the root
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// True when the tree changed since the last `mark_clean`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledge the current state (consumer cache sync point)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Insert an item.
    ///
    /// Returns false, without mutating the tree, when the item's box is
    /// not fully contained by the root box. On success the item lands in
    /// the deepest node whose box fully contains it (children are tried in
    /// fixed octant order) and the tree is marked dirty.
    pub fn insert(&mut self, item: T) -> bool {
        let item_bounds = item.bounds();
        if !self.root.bounds().contains_aabb(&item_bounds) {
            return false;
        }
        self.root
            .insert(item, &item_bounds, self.max_depth, &mut self.listener);
        self.dirty = true;
        true
    }

    /// Remove the first stored item equal to `item`, following the path
    /// insert would take. Returns false when no reachable node holds a
    /// match; marks the tree dirty on success.
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        let item_bounds = item.bounds();
        if !self.root.bounds().contains_aabb(&item_bounds) {
            return false;
        }
        let removed = self.root.remove(item, &item_bounds);
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Append every stored item whose box intersects `query` to `results`
    /// (content-scan order, then recursive child order; not sorted)
    pub fn query_box<'a>(&'a self, query: &Aabb, results: &mut Vec<&'a T>) {
        self.root.query_box(query, results);
    }

    /// Append every stored item classified visible by `frustum` to
    /// `results`
    pub fn query_frustum<'a>(&'a self, frustum: &Frustum, results: &mut Vec<&'a T>) {
        self.root.query_frustum(frustum, results);
    }

    /// Enumerate the potential grid cells of edge `cell_size` covering the
    /// frustum's bounding box, aligned to the root box's minimum corner,
    /// whether or not tree nodes exist there yet. The visitor runs for
    /// each cell not classified outside; returning false aborts the
    /// enumeration.
    pub fn visit_visible_cells<F>(&self, frustum: &Frustum, cell_size: f32, mut visitor: F)
    where
        F: FnMut(&Aabb) -> bool,
    {
        if cell_size <= 0.0 {
            log::warn!("visit_visible_cells called with non-positive cell size {cell_size}");
            return;
        }
        let frustum_bounds = frustum.aabb();
        let origin = self.root.bounds().min;
        let lo = ((frustum_bounds.min - origin) / cell_size).floor();
        let hi = ((frustum_bounds.max - origin) / cell_size).floor();
        for z in lo.z as i32..=hi.z as i32 {
            for y in lo.y as i32..=hi.y as i32 {
                for x in lo.x as i32..=hi.x as i32 {
                    let min = origin + Vec3::new(x as f32, y as f32, z as f32) * cell_size;
                    let cell = Aabb::new(min, min + Vec3::splat(cell_size));
                    if frustum.classify_aabb(&cell) != FrustumClass::Outside && !visitor(&cell) {
                        return;
                    }
                }
            }
        }
    }

    /// Discard all children and stored items, leaving an empty tree rooted
    /// at the original box; marks the tree dirty.
    pub fn clear(&mut self) {
        self.root = OctreeNode::new(self.root.bounds(), 0);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Mat4;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct TestItem {
        id: u32,
        bounds: Aabb,
    }

    impl TestItem {
        fn new(id: u32, min: Vec3, max: Vec3) -> Self {
            Self {
                id,
                bounds: Aabb::new(min, max),
            }
        }

        fn unit(id: u32, min: Vec3) -> Self {
            Self::new(id, min, min + Vec3::ONE)
        }
    }

    impl Bounded for TestItem {
        fn bounds(&self) -> Aabb {
            self.bounds
        }
    }

    struct CountingListener {
        created: Rc<RefCell<Vec<(Aabb, Aabb)>>>,
    }

    impl OctreeListener for CountingListener {
        fn node_created(&mut self, parent: &Aabb, child: &Aabb) {
            self.created.borrow_mut().push((*parent, *child));
        }
    }

    fn root_box() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::splat(8.0))
    }

    /// Ground-truth query: every stored item intersecting the box
    fn brute_force<'a>(tree: &'a SpatialOctree<TestItem>, query: &Aabb) -> Vec<&'a TestItem> {
        let mut all = Vec::new();
        tree.query_box(&tree.bounds(), &mut all);
        all.retain(|item| item.bounds().intersects(query));
        all
    }

    fn sorted_ids(items: &[&TestItem]) -> Vec<u32> {
        let mut ids: Vec<u32> = items.iter().map(|i| i.id).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_insert_outside_root_rejected() {
        let mut tree = SpatialOctree::new(root_box(), 3);
        let escaping = TestItem::unit(0, Vec3::splat(7.5));

        assert!(!tree.insert(escaping));
        assert_eq!(tree.count(), 0);
        assert!(!tree.is_dirty());
    }

    #[test]
    fn test_insert_and_count() {
        let mut tree = SpatialOctree::new(root_box(), 3);
        assert!(tree.insert(TestItem::unit(0, Vec3::ZERO)));
        assert!(tree.insert(TestItem::unit(1, Vec3::splat(5.0))));
        assert_eq!(tree.count(), 2);
        assert!(tree.is_dirty());
    }

    #[test]
    fn test_subdivision_listener_and_lazy_children() {
        let created = Rc::new(RefCell::new(Vec::new()));
        let mut tree = SpatialOctree::new(root_box(), 3);
        tree.set_listener(Some(Box::new(CountingListener {
            created: created.clone(),
        })));
        assert_eq!(tree.node_count(), 1);

        // A unit item near the origin forces subdivision down to depth 3:
        // 8 children per split, three splits.
        tree.insert(TestItem::unit(0, Vec3::ZERO));
        assert_eq!(tree.node_count(), 1 + 8 + 8 + 8);
        assert_eq!(created.borrow().len(), 24);

        // Every reported child box is an octant of its reported parent
        for (parent, child) in created.borrow().iter() {
            assert!(parent.contains_aabb(child));
            assert_eq!(child.size() * 2.0, parent.size());
        }

        // A second insert on the same path creates no new nodes
        tree.insert(TestItem::unit(1, Vec3::ZERO));
        assert_eq!(tree.node_count(), 25);
        assert_eq!(created.borrow().len(), 24);
    }

    #[test]
    fn test_max_depth_zero_never_subdivides() {
        let mut tree = SpatialOctree::new(root_box(), 0);
        tree.insert(TestItem::unit(0, Vec3::ZERO));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.count(), 1);
    }

    #[test]
    fn test_unit_box_never_subdivides() {
        let unit_root = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let mut tree = SpatialOctree::new(unit_root, 8);
        tree.insert(TestItem::new(0, Vec3::splat(0.25), Vec3::splat(0.75)));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_straddling_item_stays_at_node() {
        let mut tree = SpatialOctree::new(root_box(), 3);
        // Straddles the center on every axis: no child contains it
        tree.insert(TestItem::new(0, Vec3::splat(3.5), Vec3::splat(4.5)));
        assert_eq!(tree.count(), 1);

        let mut results = Vec::new();
        tree.query_box(&Aabb::new(Vec3::splat(3.0), Vec3::splat(5.0)), &mut results);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut tree = SpatialOctree::new(root_box(), 3);
        let a = TestItem::unit(0, Vec3::ZERO);
        let b = TestItem::unit(1, Vec3::splat(6.0));
        tree.insert(a);
        tree.insert(b);
        tree.mark_clean();

        assert!(tree.remove(&a));
        assert_eq!(tree.count(), 1);
        assert!(tree.is_dirty());

        // Already removed
        assert!(!tree.remove(&a));
        // Box escapes the root entirely
        assert!(!tree.remove(&TestItem::unit(2, Vec3::splat(9.0))));

        assert!(tree.remove(&b));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_query_box_inside_leaf() {
        let mut tree = SpatialOctree::new(root_box(), 3);
        // All in the [0,1]^3 leaf octant
        tree.insert(TestItem::new(0, Vec3::splat(0.1), Vec3::splat(0.4)));
        tree.insert(TestItem::new(1, Vec3::splat(0.6), Vec3::splat(0.9)));
        // Elsewhere
        tree.insert(TestItem::unit(2, Vec3::splat(6.0)));

        let query = Aabb::new(Vec3::ZERO, Vec3::splat(0.5));
        let mut results = Vec::new();
        tree.query_box(&query, &mut results);
        assert_eq!(sorted_ids(&results), vec![0]);
        assert_eq!(sorted_ids(&results), sorted_ids(&brute_force(&tree, &query)));
    }

    #[test]
    fn test_query_box_engulfing_query_takes_subtrees() {
        let mut tree = SpatialOctree::new(root_box(), 3);
        for i in 0..8 {
            let offset = Vec3::new(
                if i & 1 != 0 { 4.5 } else { 0.5 },
                if i & 2 != 0 { 4.5 } else { 0.5 },
                if i & 4 != 0 { 4.5 } else { 0.5 },
            );
            tree.insert(TestItem::unit(i as u32, offset));
        }

        let everything = Aabb::new(Vec3::splat(-1.0), Vec3::splat(9.0));
        let mut results = Vec::new();
        tree.query_box(&everything, &mut results);
        assert_eq!(sorted_ids(&results), (0..8).collect::<Vec<u32>>());
    }

    #[test]
    fn test_query_frustum_matches_brute_force() {
        // Orthographic frustum seeing x,y in [2,6], all relevant z
        let proj = Mat4::orthographic_rh(-2.0, 2.0, -2.0, 2.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(
            Vec3::new(4.0, 4.0, 20.0),
            Vec3::new(4.0, 4.0, 0.0),
            Vec3::Y,
        );
        let frustum = Frustum::from_view_projection(&(proj * view));

        let mut tree = SpatialOctree::new(root_box(), 3);
        let mut items = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                let item = TestItem::unit(
                    (i * 6 + j) as u32,
                    Vec3::new(i as f32 * 1.2, j as f32 * 1.2, 3.0),
                );
                items.push(item);
                assert!(tree.insert(item));
            }
        }

        let mut results = Vec::new();
        tree.query_frustum(&frustum, &mut results);

        let mut expected: Vec<u32> = items
            .iter()
            .filter(|item| frustum.classify_aabb(&item.bounds()) != FrustumClass::Outside)
            .map(|item| item.id)
            .collect();
        expected.sort_unstable();

        assert!(!results.is_empty());
        assert!(results.len() < items.len());
        assert_eq!(sorted_ids(&results), expected);
    }

    #[test]
    fn test_visit_visible_cells() {
        let proj = Mat4::orthographic_rh(-2.0, 2.0, -2.0, 2.0, 0.1, 30.0);
        let view = Mat4::look_at_rh(
            Vec3::new(4.0, 4.0, 20.0),
            Vec3::new(4.0, 4.0, 0.0),
            Vec3::Y,
        );
        let frustum = Frustum::from_view_projection(&(proj * view));
        let tree: SpatialOctree<TestItem> = SpatialOctree::new(root_box(), 3);

        let mut cells = Vec::new();
        tree.visit_visible_cells(&frustum, 4.0, |cell| {
            cells.push(*cell);
            true
        });

        // Cells exist even though the tree has no nodes there yet
        assert!(!cells.is_empty());
        for cell in &cells {
            assert_eq!(cell.size(), Vec3::splat(4.0));
            assert_ne!(frustum.classify_aabb(cell), FrustumClass::Outside);
            // Aligned to the root grid
            let local = (cell.min - tree.bounds().min) / 4.0;
            assert_eq!(local, local.round());
        }

        // Early abort stops after the first visit
        let mut visited = 0;
        tree.visit_visible_cells(&frustum, 4.0, |_| {
            visited += 1;
            false
        });
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_random_churn() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let mut tree = SpatialOctree::new(root_box(), 3);
        let mut items = Vec::new();

        for id in 0..100 {
            let min = Vec3::new(
                rng.f32() * 7.0,
                rng.f32() * 7.0,
                rng.f32() * 7.0,
            );
            let item = TestItem::unit(id, min);
            assert!(tree.insert(item));
            items.push(item);
        }
        assert_eq!(tree.count(), 100);

        for item in items.drain(..50) {
            assert!(tree.remove(&item));
        }
        assert_eq!(tree.count(), 50);

        // Cached subtree counts agree with a full enumeration
        let mut all = Vec::new();
        tree.query_box(&tree.bounds(), &mut all);
        assert_eq!(all.len(), 50);

        // Every reported item intersects the query box
        let query = Aabb::new(Vec3::splat(2.0), Vec3::splat(6.0));
        let mut results = Vec::new();
        tree.query_box(&query, &mut results);
        for item in &results {
            assert!(item.bounds().intersects(&query));
        }
        assert_eq!(sorted_ids(&results), sorted_ids(&brute_force(&tree, &query)));
    }

    #[test]
    fn test_clear() {
        let mut tree = SpatialOctree::new(root_box(), 3);
        tree.insert(TestItem::unit(0, Vec3::ZERO));
        tree.insert(TestItem::unit(1, Vec3::splat(3.0)));
        tree.mark_clean();

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.bounds(), root_box());
        assert!(tree.is_dirty());

        // The cleared tree accepts new items again
        assert!(tree.insert(TestItem::unit(2, Vec3::splat(5.0))));
        assert_eq!(tree.count(), 1);
    }

    #[test]
    fn test_reference_items() {
        // Pointer-to-object form: the tree stores references, the items
        // stay externally owned.
        let owned = [
            TestItem::unit(0, Vec3::ZERO),
            TestItem::unit(1, Vec3::splat(4.0)),
        ];
        let mut tree: SpatialOctree<&TestItem> = SpatialOctree::new(root_box(), 3);
        for item in &owned {
            assert!(tree.insert(item));
        }
        assert_eq!(tree.count(), 2);

        let mut results = Vec::new();
        tree.query_box(&Aabb::new(Vec3::ZERO, Vec3::ONE), &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 0);
    }
}
