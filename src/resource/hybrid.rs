use super::{ResourceClient, ResourceError};
use crate::resource::file::FileClient;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;

/// Serves `file://` urls from disk and hands everything else to `inner`.
pub struct HybridClient<T: ResourceClient> {
    file_client: FileClient,
    inner: T,
}

impl<T: ResourceClient> HybridClient<T> {
    pub fn new(inner: T) -> Self {
        Self {
            file_client: FileClient,
            inner,
        }
    }
}

#[async_trait]
impl<T: ResourceClient> ResourceClient for HybridClient<T> {
    async fn get(
        &self,
        url: &str,
        headers: Option<BTreeMap<String, String>>,
    ) -> Result<Bytes, ResourceError> {
        if url.starts_with("file://") {
            self.file_client.get(url, headers).await
        } else {
            self.inner.get(url, headers).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::mock::MockClient;

    #[tokio::test]
    async fn test_routes_by_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uploaded_files.txt");
        std::fs::write(&path, "1 a.i3d\n").unwrap();

        let client = HybridClient::new(MockClient::default().with("https://host/a", vec![1u8]));

        let local = client
            .get(&format!("file://{}", path.display()), None)
            .await
            .unwrap();
        assert_eq!(local, Bytes::from_static(b"1 a.i3d\n"));
        assert_eq!(
            client.get("https://host/a", None).await.unwrap(),
            Bytes::from_static(&[1])
        );
    }
}
