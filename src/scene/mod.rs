pub mod aabb;
pub mod iter;
pub mod node;

use crate::scene::iter::SectorIter;
use crate::scene::node::SectorMetadata;
use slab::Slab;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Arena holding every node of a sector tree.
#[derive(Clone, Debug, Default)]
pub struct SectorTree {
    storage: Slab<SectorMetadata>,
}

impl SectorTree {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Slab::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, node: SectorMetadata) -> NodeId {
        NodeId(self.storage.insert(node))
    }

    pub fn node(&self, node_id: NodeId) -> Option<&SectorMetadata> {
        self.storage.get(node_id.0)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Index<NodeId> for SectorTree {
    type Output = SectorMetadata;

    fn index(&self, node_id: NodeId) -> &Self::Output {
        &self.storage[node_id.0]
    }
}

impl IndexMut<NodeId> for SectorTree {
    fn index_mut(&mut self, node_id: NodeId) -> &mut Self::Output {
        &mut self.storage[node_id.0]
    }
}

/// A validated sector tree plus an id lookup over the same nodes.
///
/// Only [`build_scene`](crate::hierarchy::build_scene) creates scenes, so the
/// root always exists and every node is reachable from it.
#[derive(Clone, Debug)]
pub struct SectorScene {
    tree: SectorTree,
    root_id: NodeId,
    by_id: HashMap<i64, NodeId>,
}

impl SectorScene {
    pub(crate) fn new(tree: SectorTree, root_id: NodeId, by_id: HashMap<i64, NodeId>) -> Self {
        Self {
            tree,
            root_id,
            by_id,
        }
    }

    pub fn root(&self) -> &SectorMetadata {
        &self.tree[self.root_id]
    }

    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    pub fn tree(&self) -> &SectorTree {
        &self.tree
    }

    /// Looks a sector up by its id.
    pub fn get(&self, sector_id: i64) -> Option<&SectorMetadata> {
        self.by_id.get(&sector_id).map(|node_id| &self.tree[*node_id])
    }

    pub fn node_id(&self, sector_id: i64) -> Option<NodeId> {
        self.by_id.get(&sector_id).copied()
    }

    pub fn node(&self, node_id: NodeId) -> Option<&SectorMetadata> {
        self.tree.node(node_id)
    }

    pub fn parent(&self, node: &SectorMetadata) -> Option<&SectorMetadata> {
        node.parent.map(|parent| &self.tree[parent])
    }

    pub fn children<'a>(
        &'a self,
        node: &'a SectorMetadata,
    ) -> impl Iterator<Item = &'a SectorMetadata> + 'a {
        node.children.iter().map(move |child| &self.tree[*child])
    }

    /// Number of sectors, equal to the length of the list the scene was built from.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn sector_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.by_id.keys().copied()
    }

    /// Walks the tree depth-first from the root.
    pub fn iter(&self) -> SectorIter<'_> {
        SectorIter::new(&self.tree, self.root_id)
    }

    /// Walks the subtree below (and including) `node_id`.
    pub fn iter_from(&self, node_id: NodeId) -> SectorIter<'_> {
        SectorIter::new(&self.tree, node_id)
    }
}
