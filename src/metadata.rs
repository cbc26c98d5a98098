use crate::scene::aabb::Aabb;
use serde::Deserialize;

/// Axis-aligned bounds as they appear on the wire.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

/// One encoding of a sector's geometry.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct VersionedFile {
    pub file_id: i64,
    pub version: i32,
}

impl VersionedFile {
    pub fn new(file_id: i64, version: i32) -> Self {
        Self { file_id, version }
    }
}

/// A sector record from the listing API or the `uploaded_sectors.txt` manifest.
///
/// `path` is the only source of truth for the position in the tree,
/// `parent_id` and `depth` are carried along but never used for linking.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub path: String,
    #[serde(default)]
    pub depth: Option<u32>,
    pub bounding_box: BoundingBox,
    #[serde(default, alias = "threedFiles")]
    pub candidate_files: Vec<VersionedFile>,
}

/// Coarse descriptor of a sector used by the simplified geometry path.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimpleSummary {
    pub id: i64,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub quad_count: Option<u64>,
}

impl SimpleSummary {
    /// Summary derived from the sector record alone, for backends that
    /// publish no coarse listing.
    pub fn from_sector(sector: &Sector) -> Self {
        Self {
            id: sector.id,
            bounding_box: Some(sector.bounding_box),
            quad_count: None,
        }
    }
}

/// One page of the cursor-paginated sector listing.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SectorPage {
    pub items: Vec<Sector>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RevisionMetadata {
    pub id: i64,
    #[serde(default)]
    pub rotation: Option<[f64; 3]>,
}

impl From<BoundingBox> for Aabb {
    fn from(value: BoundingBox) -> Self {
        Aabb::new(value.min.into(), value.max.into())
    }
}
