#[cfg(feature = "ehttp")]
pub mod ehttp;

#[cfg(feature = "fs")]
pub mod file;

#[cfg(feature = "reqwest")]
pub mod reqwest;

#[cfg(feature = "fs")]
pub mod hybrid;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Byte transport used by the sector data sources.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: Option<BTreeMap<String, String>>,
    ) -> Result<Bytes, ResourceError>;

    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        url: &str,
        headers: Option<BTreeMap<String, String>>,
    ) -> Result<T, ResourceError> {
        let bytes = self.get(url, headers).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl<C: ResourceClient> ResourceClient for Arc<C> {
    async fn get(
        &self,
        url: &str,
        headers: Option<BTreeMap<String, String>>,
    ) -> Result<Bytes, ResourceError> {
        (**self).get(url, headers).await
    }

    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        url: &str,
        headers: Option<BTreeMap<String, String>>,
    ) -> Result<T, ResourceError> {
        (**self).get_json(url, headers).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected status code {status}: {message}")]
    Status { status: u16, message: String },

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("Unsupported scheme: {0}")]
    Unsupported(String),

    #[error("Pagination cursor {0:?} was returned twice")]
    RepeatedCursor(String),
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory client answering from a fixed url table and recording requests.
    /// Every request is pending for one poll, so concurrent callers overlap.
    #[derive(Default)]
    pub(crate) struct MockClient {
        responses: HashMap<String, Result<Bytes, (u16, String)>>,
        requests: Mutex<Vec<(String, Option<BTreeMap<String, String>>)>>,
    }

    impl MockClient {
        pub(crate) fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.responses
                .insert(url.to_string(), Ok(Bytes::from(body.into())));
            self
        }

        pub(crate) fn with_json(self, url: &str, value: serde_json::Value) -> Self {
            self.with(url, value.to_string())
        }

        pub(crate) fn with_status(mut self, url: &str, status: u16, message: &str) -> Self {
            self.responses
                .insert(url.to_string(), Err((status, message.to_string())));
            self
        }

        pub(crate) fn request_count(&self, url: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|(requested, _)| requested == url)
                .count()
        }

        pub(crate) fn requests(&self) -> Vec<(String, Option<BTreeMap<String, String>>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResourceClient for MockClient {
        async fn get(
            &self,
            url: &str,
            headers: Option<BTreeMap<String, String>>,
        ) -> Result<Bytes, ResourceError> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), headers));
            tokio::task::yield_now().await;

            match self.responses.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err((status, message))) => Err(ResourceError::Status {
                    status: *status,
                    message: message.clone(),
                }),
                None => Err(ResourceError::Status {
                    status: 404,
                    message: format!("no mock response for {url}"),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_get_json_decodes_body() {
        let client = MockClient::default().with_json("mem://a", serde_json::json!({"id": 4}));

        let value: serde_json::Value = client.get_json("mem://a", None).await.unwrap();
        assert_eq!(value["id"], 4);
    }

    #[tokio::test]
    async fn test_arc_client_delegates() {
        let client = Arc::new(MockClient::default().with("mem://a", vec![1u8, 2, 3]));

        assert_eq!(
            client.get("mem://a", None).await.unwrap(),
            Bytes::from_static(&[1, 2, 3])
        );
        assert_eq!(client.request_count("mem://a"), 1);
    }

    #[tokio::test]
    async fn test_status_carries_message() {
        let client = MockClient::default().with_status("mem://a", 403, "forbidden");

        match client.get("mem://a", None).await {
            Err(ResourceError::Status { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "forbidden");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
