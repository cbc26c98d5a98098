use crate::metadata::{Sector, SimpleSummary};
use crate::resource::ResourceClient;
use crate::source::{
    ModelMetadata, RawSectorList, SectorDataSource, SectorIndex, SectorSourceError,
};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

pub const SECTORS_MANIFEST: &str = "uploaded_sectors.txt";
pub const SIMPLE_SECTORS_MANIFEST: &str = "uploaded_sectors_simple.txt";
pub const FILES_MANIFEST: &str = "uploaded_files.txt";

pub const DETAILED_SUFFIX: &str = ".i3d";
pub const QUADS_SUFFIX: &str = ".f3d";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("{file} is not valid UTF-8")]
    Utf8 {
        file: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("{file}:{line}: {source}")]
    Json {
        file: &'static str,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{file}:{line}: expected `<fileId> <fileName>`")]
    MalformedFileEntry { file: &'static str, line: usize },

    #[error("{file}: duplicate entry for id {id}")]
    DuplicateEntry { file: &'static str, id: i64 },
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LocalSourceConfig {
    /// Directory or url prefix holding the manifests and the geometry files.
    pub base_url: String,
}

/// Name of the simplified geometry file paired with a detailed one.
pub fn quads_file_name(detailed: &str) -> Option<String> {
    detailed
        .strip_suffix(DETAILED_SUFFIX)
        .map(|stem| format!("{stem}{QUADS_SUFFIX}"))
}

/// Parses newline-delimited JSON, skipping blank lines.
fn parse_json_lines<T: DeserializeOwned>(
    file: &'static str,
    text: &str,
) -> Result<Vec<T>, ManifestError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ManifestError::Json {
                file,
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// Parses `<fileId> <fileName>` lines.
fn parse_file_names(text: &str) -> Result<HashMap<i64, String>, ManifestError> {
    let mut names = HashMap::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = || ManifestError::MalformedFileEntry {
            file: FILES_MANIFEST,
            line: index + 1,
        };

        let (id, name) = line.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let id: i64 = id.parse().map_err(|_| malformed())?;
        let name = name.trim();
        if name.is_empty() {
            return Err(malformed());
        }
        if names.insert(id, name.to_string()).is_some() {
            return Err(ManifestError::DuplicateEntry {
                file: FILES_MANIFEST,
                id,
            });
        }
    }
    Ok(names)
}

/// Sector data source reading an exported model from static files.
pub struct LocalSectorSource<C: ResourceClient> {
    base_url: String,
    client: C,
    index: OnceCell<SectorIndex>,
    file_names: OnceCell<HashMap<i64, String>>,
}

impl<C: ResourceClient> LocalSectorSource<C> {
    pub fn new(base_url: &str, client: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            index: OnceCell::new(),
            file_names: OnceCell::new(),
        }
    }

    pub fn from_config(config: &LocalSourceConfig, client: C) -> Self {
        Self::new(&config.base_url, client)
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn read_manifest(&self, file: &'static str) -> Result<String, SectorSourceError> {
        let bytes = self.client.get(&self.url(file), None).await?;
        let text =
            std::str::from_utf8(&bytes).map_err(|source| ManifestError::Utf8 { file, source })?;
        Ok(text.to_string())
    }

    async fn index(&self) -> Result<&SectorIndex, SectorSourceError> {
        self.index.get_or_try_init(|| self.load_index()).await
    }

    async fn load_index(&self) -> Result<SectorIndex, SectorSourceError> {
        let (sectors, simple) = futures::try_join!(
            self.read_manifest(SECTORS_MANIFEST),
            self.read_manifest(SIMPLE_SECTORS_MANIFEST)
        )?;

        let sectors: Vec<Sector> = parse_json_lines(SECTORS_MANIFEST, &sectors)?;
        let mut simple_summaries = HashMap::new();
        for summary in parse_json_lines::<SimpleSummary>(SIMPLE_SECTORS_MANIFEST, &simple)? {
            let id = summary.id;
            if simple_summaries.insert(id, summary).is_some() {
                return Err(ManifestError::DuplicateEntry {
                    file: SIMPLE_SECTORS_MANIFEST,
                    id,
                }
                .into());
            }
        }

        debug!(
            base_url = %self.base_url,
            sectors = sectors.len(),
            summaries = simple_summaries.len(),
            "loaded sector manifests"
        );

        // exported models carry no rotation
        SectorIndex::build(&RawSectorList {
            sectors,
            simple_summaries,
            rotation: None,
        })
    }

    async fn file_names(&self) -> Result<&HashMap<i64, String>, SectorSourceError> {
        self.file_names
            .get_or_try_init(|| self.load_file_names())
            .await
    }

    async fn load_file_names(&self) -> Result<HashMap<i64, String>, SectorSourceError> {
        let text = self.read_manifest(FILES_MANIFEST).await?;
        let names = parse_file_names(&text)?;
        debug!(base_url = %self.base_url, files = names.len(), "loaded file manifest");
        Ok(names)
    }

    async fn file_name(&self, file_id: i64) -> Result<&str, SectorSourceError> {
        self.file_names()
            .await?
            .get(&file_id)
            .map(String::as_str)
            .ok_or(SectorSourceError::MissingFileName(file_id))
    }

    async fn fetch_named(&self, name: &str) -> Result<Bytes, SectorSourceError> {
        let bytes = self.client.get(&self.url(name), None).await?;
        debug!(name, bytes = bytes.len(), "fetched sector file");
        Ok(bytes)
    }
}

#[async_trait]
impl<C: ResourceClient> SectorDataSource for LocalSectorSource<C> {
    async fn fetch_sector_metadata(&self) -> Result<Arc<ModelMetadata>, SectorSourceError> {
        Ok(self.index().await?.metadata().clone())
    }

    async fn fetch_sector_geometry(&self, sector_id: i64) -> Result<Bytes, SectorSourceError> {
        let file = self.index().await?.file_for_sector(sector_id)?;
        self.fetch_compressed_mesh_file(file.file_id).await
    }

    async fn fetch_sector_quads(&self, sector_id: i64) -> Result<Bytes, SectorSourceError> {
        let file = self.index().await?.file_for_sector(sector_id)?;
        let detailed = self.file_name(file.file_id).await?;
        let quads = quads_file_name(detailed)
            .ok_or_else(|| SectorSourceError::UnsupportedQuadsName(detailed.to_string()))?;
        self.fetch_named(&quads).await
    }

    async fn fetch_compressed_mesh_file(&self, file_id: i64) -> Result<Bytes, SectorSourceError> {
        let name = self.file_name(file_id).await?;
        self.fetch_named(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::mock::MockClient;

    const BASE: &str = "mem://model";

    const SECTORS: &str = r#"{"id":0,"path":"0/","boundingBox":{"min":[0,0,0],"max":[4,4,4]},"candidateFiles":[{"fileId":1,"version":3},{"fileId":2,"version":8}]}
{"id":1,"parentId":0,"path":"0/0/","boundingBox":{"min":[0,0,0],"max":[2,2,2]},"candidateFiles":[{"fileId":3,"version":7}]}

{"id":2,"parentId":0,"path":"0/1/","boundingBox":{"min":[2,2,2],"max":[4,4,4]},"candidateFiles":[{"fileId":4,"version":1}]}
"#;

    const SIMPLE: &str = r#"{"id":0,"quadCount":12}
{"id":1}
{"id":2}
"#;

    const FILES: &str = "1 sector_0.i3d\n3 sector_1.i3d\n4 sector_2.bin\n";

    fn client() -> MockClient {
        MockClient::default()
            .with(&format!("{BASE}/{SECTORS_MANIFEST}"), SECTORS)
            .with(&format!("{BASE}/{SIMPLE_SECTORS_MANIFEST}"), SIMPLE)
            .with(&format!("{BASE}/{FILES_MANIFEST}"), FILES)
            .with(&format!("{BASE}/sector_0.i3d"), vec![0u8, 0])
            .with(&format!("{BASE}/sector_1.i3d"), vec![1u8, 1])
            .with(&format!("{BASE}/sector_1.f3d"), vec![1u8, 0xf])
    }

    fn source(client: MockClient) -> LocalSectorSource<MockClient> {
        LocalSectorSource::new(&format!("{BASE}/"), client)
    }

    #[test]
    fn test_quads_file_name() {
        assert_eq!(quads_file_name("sector_12.i3d").as_deref(), Some("sector_12.f3d"));
        assert_eq!(quads_file_name("sector_12.ctm"), None);
    }

    #[test]
    fn test_parse_file_names() {
        let names = parse_file_names("1 a.i3d\n\n  2\tb c.i3d \n").unwrap();
        assert_eq!(names.get(&1).map(String::as_str), Some("a.i3d"));
        assert_eq!(names.get(&2).map(String::as_str), Some("b c.i3d"));

        assert!(matches!(
            parse_file_names("1 a.i3d\nx b.i3d\n"),
            Err(ManifestError::MalformedFileEntry { line: 2, .. })
        ));
        assert!(matches!(
            parse_file_names("7\n"),
            Err(ManifestError::MalformedFileEntry { line: 1, .. })
        ));
        assert!(matches!(
            parse_file_names("1 a.i3d\n1 b.i3d\n"),
            Err(ManifestError::DuplicateEntry { id: 1, .. })
        ));
    }

    #[test]
    fn test_json_line_errors_name_the_line() {
        let result = parse_json_lines::<SimpleSummary>(SIMPLE_SECTORS_MANIFEST, "{\"id\":1}\n{oops}\n");
        assert!(matches!(result, Err(ManifestError::Json { line: 2, .. })));
    }

    #[tokio::test]
    async fn test_metadata_from_manifests() {
        let metadata = source(client()).fetch_sector_metadata().await.unwrap();

        let scene = &metadata.scene;
        assert_eq!(scene.len(), 3);
        let children: Vec<i64> = scene.children(scene.root()).map(|c| c.id).collect();
        assert_eq!(children, vec![1, 2]);
        assert_eq!(
            scene.root().simple_summary.as_ref().and_then(|s| s.quad_count),
            Some(12)
        );
        assert_eq!(
            metadata.transformation,
            crate::transform::SectorModelTransformation::default()
        );
    }

    #[tokio::test]
    async fn test_geometry_and_quads() {
        let source = source(client());

        assert_eq!(source.fetch_sector_geometry(0).await.unwrap(), Bytes::from_static(&[0, 0]));
        assert_eq!(source.fetch_sector_geometry(1).await.unwrap(), Bytes::from_static(&[1, 1]));
        assert_eq!(source.fetch_sector_quads(1).await.unwrap(), Bytes::from_static(&[1, 0xf]));
    }

    #[tokio::test]
    async fn test_quads_need_detailed_suffix() {
        let source = source(client());
        assert!(matches!(
            source.fetch_sector_quads(2).await,
            Err(SectorSourceError::UnsupportedQuadsName(name)) if name == "sector_2.bin"
        ));
    }

    #[tokio::test]
    async fn test_missing_mappings_fail() {
        let source = source(client());

        assert!(matches!(
            source.fetch_sector_geometry(17).await,
            Err(SectorSourceError::InvalidSectorId(17))
        ));
        assert!(matches!(
            source.fetch_compressed_mesh_file(2).await,
            Err(SectorSourceError::MissingFileName(2))
        ));
    }

    #[tokio::test]
    async fn test_missing_simple_summary_fails() {
        let client = client().with(&format!("{BASE}/{SIMPLE_SECTORS_MANIFEST}"), "{\"id\":0}\n{\"id\":1}\n");

        assert!(matches!(
            source(client).fetch_sector_metadata().await,
            Err(SectorSourceError::Scene(
                crate::hierarchy::BuildSceneError::MissingSimpleSummary(2)
            ))
        ));
    }

    #[tokio::test]
    async fn test_manifests_are_read_once() {
        let client = Arc::new(client());
        let source = LocalSectorSource::new(BASE, client.clone());

        let (a, b, c, metadata) = tokio::join!(
            source.fetch_sector_geometry(0),
            source.fetch_sector_geometry(1),
            source.fetch_sector_quads(1),
            source.fetch_sector_metadata()
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();
        metadata.unwrap();

        for manifest in [SECTORS_MANIFEST, SIMPLE_SECTORS_MANIFEST, FILES_MANIFEST] {
            assert_eq!(
                client.request_count(&format!("{BASE}/{manifest}")),
                1,
                "{manifest} read more than once"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_manifest_fails() {
        let client = client().with(&format!("{BASE}/{FILES_MANIFEST}"), vec![b'1', b' ', 0xff]);

        assert!(matches!(
            source(client).fetch_compressed_mesh_file(1).await,
            Err(SectorSourceError::Manifest(ManifestError::Utf8 { file: FILES_MANIFEST, .. }))
        ));
    }

    #[tokio::test]
    async fn test_failed_load_can_be_retried() {
        let source = source(MockClient::default());
        assert!(matches!(
            source.fetch_sector_metadata().await,
            Err(SectorSourceError::Resource(_))
        ));
        assert!(source.fetch_sector_metadata().await.is_err());
    }
}
