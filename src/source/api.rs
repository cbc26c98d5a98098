use crate::metadata::{RevisionMetadata, Sector, SectorPage, SimpleSummary};
use crate::resource::{ResourceClient, ResourceError};
use crate::source::{
    ModelMetadata, RawSectorList, SectorDataSource, SectorIndex, SectorSourceError,
};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

fn default_page_size() -> u32 {
    1000
}

/// Location of one model revision on the 3D API.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiSourceConfig {
    pub base_url: String,
    pub project: String,
    pub model_id: i64,
    pub revision_id: i64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Sent with every request, e.g. `api-key` or `Authorization`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ApiSourceConfig {
    pub fn new(base_url: &str, project: &str, model_id: i64, revision_id: i64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
            model_id,
            revision_id,
            page_size: default_page_size(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    fn project_url(&self) -> String {
        format!(
            "{}/api/v1/projects/{}",
            self.base_url.trim_end_matches('/'),
            self.project
        )
    }

    fn revision_url(&self) -> String {
        format!(
            "{}/3d/models/{}/revisions/{}",
            self.project_url(),
            self.model_id,
            self.revision_id
        )
    }

    fn sectors_url(&self, cursor: Option<&str>) -> String {
        let mut url = format!("{}/sectors?limit={}", self.revision_url(), self.page_size);
        if let Some(cursor) = cursor {
            url.push_str("&cursor=");
            url.push_str(&urlencoding::encode(cursor));
        }
        url
    }

    fn file_url(&self, file_id: i64) -> String {
        format!("{}/3d/files/{}", self.project_url(), file_id)
    }

    fn request_headers(&self) -> Option<BTreeMap<String, String>> {
        (!self.headers.is_empty()).then(|| self.headers.clone())
    }
}

/// Sector data source reading from the remote 3D API.
pub struct ApiSectorSource<C: ResourceClient> {
    config: ApiSourceConfig,
    client: C,
    index: OnceCell<SectorIndex>,
}

impl<C: ResourceClient> ApiSectorSource<C> {
    pub fn new(config: ApiSourceConfig, client: C) -> Self {
        Self {
            config,
            client,
            index: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &ApiSourceConfig {
        &self.config
    }

    async fn index(&self) -> Result<&SectorIndex, SectorSourceError> {
        self.index.get_or_try_init(|| self.load_index()).await
    }

    async fn load_index(&self) -> Result<SectorIndex, SectorSourceError> {
        let (sectors, revision) = futures::try_join!(self.list_sectors(), self.revision())?;

        // the API publishes no coarse listing, summaries come from the sectors
        let simple_summaries = sectors
            .iter()
            .map(|sector| (sector.id, SimpleSummary::from_sector(sector)))
            .collect();

        SectorIndex::build(&RawSectorList {
            sectors,
            simple_summaries,
            rotation: revision.rotation,
        })
    }

    /// Drains the paginated sector listing. A cursor seen twice aborts the listing.
    async fn list_sectors(&self) -> Result<Vec<Sector>, ResourceError> {
        let mut sectors = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let url = self.config.sectors_url(cursor.as_deref());
            let page: SectorPage = self
                .client
                .get_json(&url, self.config.request_headers())
                .await?;

            debug!(
                model_id = self.config.model_id,
                revision_id = self.config.revision_id,
                items = page.items.len(),
                more = page.next_cursor.is_some(),
                "fetched sector page"
            );

            sectors.extend(page.items);
            match page.next_cursor {
                Some(next) if !seen.insert(next.clone()) => {
                    return Err(ResourceError::RepeatedCursor(next))
                }
                Some(next) => cursor = Some(next),
                None => return Ok(sectors),
            }
        }
    }

    async fn revision(&self) -> Result<RevisionMetadata, ResourceError> {
        self.client
            .get_json(&self.config.revision_url(), self.config.request_headers())
            .await
    }
}

#[async_trait]
impl<C: ResourceClient> SectorDataSource for ApiSectorSource<C> {
    async fn fetch_sector_metadata(&self) -> Result<Arc<ModelMetadata>, SectorSourceError> {
        Ok(self.index().await?.metadata().clone())
    }

    async fn fetch_sector_geometry(&self, sector_id: i64) -> Result<Bytes, SectorSourceError> {
        let file = self.index().await?.file_for_sector(sector_id)?;
        self.fetch_compressed_mesh_file(file.file_id).await
    }

    async fn fetch_sector_quads(&self, sector_id: i64) -> Result<Bytes, SectorSourceError> {
        Err(SectorSourceError::QuadsNotImplemented(sector_id))
    }

    async fn fetch_compressed_mesh_file(&self, file_id: i64) -> Result<Bytes, SectorSourceError> {
        let bytes = self
            .client
            .get(&self.config.file_url(file_id), self.config.request_headers())
            .await?;
        debug!(file_id, bytes = bytes.len(), "fetched mesh file");
        Ok(bytes)
    }
}
