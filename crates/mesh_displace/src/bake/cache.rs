//! Call-scoped cache of resolved quad corners.
//!
//! Each interior node is shared by up to four quads. [`NodeCache`] stores the encoded
//! channel pair and base pixel of a node the first time a quad touches it. A cache is
//! created per bake and dropped with it, so no state survives between calls.

/// Encoded channel pair and base pixel of one grid node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CornerNode {
    /// Encoded X offset.
    pub red: u8,
    /// Encoded Y offset.
    pub green: u8,
    /// Pixel column where the node sits at rest, floored.
    pub map_x: u32,
    /// Pixel row where the node sits at rest, floored.
    pub map_y: u32,
}

/// Dense per-node table, indexed by raster index.
#[derive(Debug, Clone)]
pub struct NodeCache {
    nodes: Vec<Option<CornerNode>>,
}

impl NodeCache {
    /// Creates an empty cache for a grid of `node_count` nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            nodes: vec![None; node_count],
        }
    }

    /// Number of nodes resolved so far.
    pub fn resolved(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Cached node at `index`, if it was resolved.
    pub fn get(&self, index: usize) -> Option<CornerNode> {
        self.nodes.get(index).copied().flatten()
    }

    /// Returns the node at `index`, computing and storing it on first access.
    ///
    /// Indices outside the table are computed but not stored.
    pub fn get_or_insert_with(
        &mut self,
        index: usize,
        make: impl FnOnce() -> CornerNode,
    ) -> CornerNode {
        match self.nodes.get_mut(index) {
            Some(Some(node)) => *node,
            Some(slot) => *slot.insert(make()),
            None => make(),
        }
    }

    /// Forgets every resolved node.
    pub fn clear(&mut self) {
        self.nodes.iter_mut().for_each(|n| *n = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(red: u8) -> CornerNode {
        CornerNode {
            red,
            green: 128,
            map_x: 0,
            map_y: 0,
        }
    }

    #[test]
    fn first_resolution_wins() {
        let mut cache = NodeCache::new(4);
        assert_eq!(cache.get_or_insert_with(2, || node(10)).red, 10);
        assert_eq!(cache.get_or_insert_with(2, || node(99)).red, 10);
        assert_eq!(cache.resolved(), 1);
        assert_eq!(cache.get(2), Some(node(10)));
    }

    #[test]
    fn out_of_range_index_is_not_stored() {
        let mut cache = NodeCache::new(1);
        assert_eq!(cache.get_or_insert_with(5, || node(3)).red, 3);
        assert_eq!(cache.resolved(), 0);
        assert_eq!(cache.get(5), None);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut cache = NodeCache::new(3);
        cache.get_or_insert_with(0, || node(1));
        cache.get_or_insert_with(1, || node(2));
        cache.clear();
        assert_eq!(cache.resolved(), 0);
        assert_eq!(cache.get_or_insert_with(0, || node(7)).red, 7);
    }
}
