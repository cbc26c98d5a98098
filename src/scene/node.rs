use crate::metadata::{Sector, SimpleSummary};
use crate::scene::aabb::Aabb;
use crate::scene::NodeId;

/// A sector as a node of the spatial tree.
///
/// `parent` and `children` index into the [`SectorTree`](crate::scene::SectorTree)
/// that owns the node. Children keep the order the sectors were listed in.
#[derive(Clone, Debug)]
pub struct SectorMetadata {
    pub id: i64,
    pub path: String,
    pub bounds: Aabb,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub simple_summary: Option<SimpleSummary>,
}

impl SectorMetadata {
    pub fn new(sector: &Sector, simple_summary: Option<SimpleSummary>) -> Self {
        Self {
            id: sector.id,
            path: sector.path.clone(),
            bounds: sector.bounding_box.into(),
            parent: None,
            children: Vec::new(),
            simple_summary,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of `/`-terminated segments below the root, the root being 0.
    pub fn depth(&self) -> usize {
        self.path.matches('/').count().saturating_sub(1)
    }
}
