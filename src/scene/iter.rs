use crate::scene::node::SectorMetadata;
use crate::scene::{NodeId, SectorTree};

/// Pre-order depth-first walk, visiting children in their stored order.
pub struct SectorIter<'a> {
    tree: &'a SectorTree,
    stack: Vec<NodeId>,
}

impl<'a> SectorIter<'a> {
    pub(crate) fn new(tree: &'a SectorTree, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for SectorIter<'a> {
    type Item = &'a SectorMetadata;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.node(self.stack.pop()?)?;
        for child in node.children.iter().rev() {
            self.stack.push(*child);
        }
        Some(node)
    }
}
