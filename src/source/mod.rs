pub mod api;
pub mod local;

use crate::hierarchy::{build_scene, BuildSceneError};
use crate::metadata::{Sector, SimpleSummary, VersionedFile};
use crate::resource::ResourceError;
use crate::scene::SectorScene;
use crate::transform::{compose_transform, SectorModelTransformation, TransformError};
use crate::version::resolve_best_file;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub use self::local::ManifestError;

#[derive(Error, Debug)]
pub enum SectorSourceError {
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Invalid sector list: {0}")]
    Scene(#[from] BuildSceneError),

    #[error("Invalid model transformation: {0}")]
    Transform(#[from] TransformError),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] ManifestError),

    #[error("{0} is not a valid sector ID")]
    InvalidSectorId(i64),

    #[error("No filename mapping for file {0}")]
    MissingFileName(i64),

    #[error("No simplified geometry name can be derived from {0:?}")]
    UnsupportedQuadsName(String),

    #[error("Simplified geometry is not implemented for this backend (sector {0})")]
    QuadsNotImplemented(i64),
}

/// Scene and transformation of one model revision.
#[derive(Clone, Debug)]
pub struct ModelMetadata {
    pub scene: SectorScene,
    pub transformation: SectorModelTransformation,
}

/// Access to the sectors of one model revision, independent of where the
/// bytes live.
///
/// Metadata and the sector to file mapping are loaded once per source and
/// shared by all later calls. Byte buffers are returned as-is, no format
/// interpretation happens here.
#[async_trait]
pub trait SectorDataSource: Send + Sync {
    async fn fetch_sector_metadata(&self) -> Result<Arc<ModelMetadata>, SectorSourceError>;

    /// Bytes of the best supported detailed geometry file of a sector.
    async fn fetch_sector_geometry(&self, sector_id: i64) -> Result<Bytes, SectorSourceError>;

    /// Bytes of the simplified proxy geometry of a sector.
    async fn fetch_sector_quads(&self, sector_id: i64) -> Result<Bytes, SectorSourceError>;

    async fn fetch_compressed_mesh_file(&self, file_id: i64) -> Result<Bytes, SectorSourceError>;
}

#[async_trait]
impl<S: SectorDataSource> SectorDataSource for Arc<S> {
    async fn fetch_sector_metadata(&self) -> Result<Arc<ModelMetadata>, SectorSourceError> {
        (**self).fetch_sector_metadata().await
    }

    async fn fetch_sector_geometry(&self, sector_id: i64) -> Result<Bytes, SectorSourceError> {
        (**self).fetch_sector_geometry(sector_id).await
    }

    async fn fetch_sector_quads(&self, sector_id: i64) -> Result<Bytes, SectorSourceError> {
        (**self).fetch_sector_quads(sector_id).await
    }

    async fn fetch_compressed_mesh_file(&self, file_id: i64) -> Result<Bytes, SectorSourceError> {
        (**self).fetch_compressed_mesh_file(file_id).await
    }
}

/// Everything a backend fetches before the tree can be built.
/// Must be complete: a partially drained listing is not a valid input.
#[derive(Clone, Debug)]
pub struct RawSectorList {
    pub sectors: Vec<Sector>,
    pub simple_summaries: HashMap<i64, SimpleSummary>,
    pub rotation: Option<[f64; 3]>,
}

/// Derived, read-only state of a loaded model revision.
#[derive(Debug)]
pub struct SectorIndex {
    metadata: Arc<ModelMetadata>,
    sector_files: HashMap<i64, VersionedFile>,
}

impl SectorIndex {
    pub fn build(raw: &RawSectorList) -> Result<Self, SectorSourceError> {
        let scene = build_scene(&raw.sectors, &raw.simple_summaries)?;
        let transformation = compose_transform(raw.rotation)?;
        let sector_files = sector_file_map(&raw.sectors);

        debug!(
            sectors = scene.len(),
            with_geometry = sector_files.len(),
            "sector index built"
        );

        Ok(Self {
            metadata: Arc::new(ModelMetadata {
                scene,
                transformation,
            }),
            sector_files,
        })
    }

    pub fn metadata(&self) -> &Arc<ModelMetadata> {
        &self.metadata
    }

    pub fn file_for_sector(&self, sector_id: i64) -> Result<VersionedFile, SectorSourceError> {
        self.sector_files
            .get(&sector_id)
            .copied()
            .ok_or(SectorSourceError::InvalidSectorId(sector_id))
    }
}

/// Maps each sector to its best supported file. Sectors without one are
/// left out so that looking them up fails.
pub fn sector_file_map(sectors: &[Sector]) -> HashMap<i64, VersionedFile> {
    let mut files = HashMap::with_capacity(sectors.len());
    for sector in sectors {
        let best = resolve_best_file(&sector.candidate_files);
        if best.is_none() {
            warn!(
                sector_id = sector.id,
                candidates = sector.candidate_files.len(),
                "sector has no supported geometry file"
            );
            continue;
        }
        files.insert(sector.id, best);
    }
    files
}
