use super::{ResourceClient, ResourceError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::debug;

/// Reads `file://` urls from the local filesystem. Headers are ignored.
#[derive(Clone, Debug, Default)]
pub struct FileClient;

#[async_trait]
impl ResourceClient for FileClient {
    async fn get(
        &self,
        url: &str,
        _headers: Option<BTreeMap<String, String>>,
    ) -> Result<Bytes, ResourceError> {
        if let Some(path) = url.strip_prefix("file://") {
            let bytes = tokio::fs::read(path).await?;
            debug!(path, bytes = bytes.len(), "read file");
            Ok(Bytes::from(bytes))
        } else {
            Err(ResourceError::Unsupported(
                "This client supports only file:// urls.".to_string(),
            ))
        }
    }
}
