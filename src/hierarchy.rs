use crate::metadata::{Sector, SimpleSummary};
use crate::scene::node::SectorMetadata;
use crate::scene::{NodeId, SectorScene, SectorTree};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, span, Level};

pub const ROOT_PATH: &str = "0/";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildSceneError {
    #[error("Sector list is empty")]
    EmptySectorList,

    #[error("No simple summary for sector {0}")]
    MissingSimpleSummary(i64),

    #[error("Invalid path {path:?} for sector {sector_id}")]
    InvalidPath { sector_id: i64, path: String },

    #[error("Duplicate sector id {0}")]
    DuplicateSectorId(i64),

    #[error("Duplicate path {path:?} for sector {sector_id}")]
    DuplicatePath { sector_id: i64, path: String },

    #[error("Sector {sector_id} has path {path:?} but no sector has parent path {parent_path:?}")]
    MissingParent {
        sector_id: i64,
        path: String,
        parent_path: String,
    },

    #[error("Sector {sector_id} has top-level path {path:?}, only \"0/\" may be a root")]
    UnexpectedRoot { sector_id: i64, path: String },

    #[error("No root sector with path \"0/\"")]
    MissingRoot,
}

/// Strips the last `"<index>/"` segment off `path`.
///
/// Returns `None` for top-level paths such as `"0/"`.
pub fn parent_path(path: &str) -> Option<&str> {
    if path.len() <= 2 {
        return None;
    }
    let trimmed = path.strip_suffix('/')?;
    trimmed.rfind('/').map(|index| &path[..=index])
}

fn is_valid_path(path: &str) -> bool {
    match path.strip_suffix('/') {
        Some(segments) => segments
            .split('/')
            .all(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

/// Builds the sector tree from a flat list.
///
/// Nodes are linked purely through their paths. Children keep the order of
/// `sectors`, and every sector needs an entry in `simple_summaries`.
/// Nothing is returned unless the whole list forms a single tree rooted at
/// [`ROOT_PATH`].
pub fn build_scene(
    sectors: &[Sector],
    simple_summaries: &HashMap<i64, SimpleSummary>,
) -> Result<SectorScene, BuildSceneError> {
    let span = span!(Level::DEBUG, "build_scene", sectors = sectors.len());
    let _enter = span.enter();

    if sectors.is_empty() {
        return Err(BuildSceneError::EmptySectorList);
    }

    let mut tree = SectorTree::with_capacity(sectors.len());
    let mut by_path: HashMap<&str, NodeId> = HashMap::with_capacity(sectors.len());
    let mut by_id = HashMap::with_capacity(sectors.len());
    let mut node_ids = Vec::with_capacity(sectors.len());

    for sector in sectors {
        let summary = simple_summaries
            .get(&sector.id)
            .ok_or(BuildSceneError::MissingSimpleSummary(sector.id))?;

        if !is_valid_path(&sector.path) {
            return Err(BuildSceneError::InvalidPath {
                sector_id: sector.id,
                path: sector.path.clone(),
            });
        }

        let node_id = tree.insert(SectorMetadata::new(sector, Some(summary.clone())));

        if by_path.insert(sector.path.as_str(), node_id).is_some() {
            return Err(BuildSceneError::DuplicatePath {
                sector_id: sector.id,
                path: sector.path.clone(),
            });
        }
        if by_id.insert(sector.id, node_id).is_some() {
            return Err(BuildSceneError::DuplicateSectorId(sector.id));
        }

        node_ids.push(node_id);
    }

    for (sector, &node_id) in sectors.iter().zip(&node_ids) {
        let Some(parent_path) = parent_path(&sector.path) else {
            if sector.path != ROOT_PATH {
                return Err(BuildSceneError::UnexpectedRoot {
                    sector_id: sector.id,
                    path: sector.path.clone(),
                });
            }
            continue;
        };

        let parent_id = *by_path.get(parent_path).ok_or_else(|| BuildSceneError::MissingParent {
            sector_id: sector.id,
            path: sector.path.clone(),
            parent_path: parent_path.to_string(),
        })?;

        tree[parent_id].children.push(node_id);
        tree[node_id].parent = Some(parent_id);
    }

    let root_id = *by_path.get(ROOT_PATH).ok_or(BuildSceneError::MissingRoot)?;

    debug!(
        nodes = tree.len(),
        root_children = tree[root_id].children.len(),
        "sector tree built"
    );

    Ok(SectorScene::new(tree, root_id, by_id))
}
