use super::{ResourceClient, ResourceError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Wraps a preconfigured client, e.g. one with timeouts or a proxy.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceClient for ReqwestClient {
    async fn get(
        &self,
        url: &str,
        headers: Option<BTreeMap<String, String>>,
    ) -> Result<Bytes, ResourceError> {
        let mut req = self.client.get(url);
        if let Some(hdrs) = headers {
            for (k, v) in hdrs {
                req = req.header(k, v);
            }
        }
        let resp = req
            .send()
            .await
            .map_err(|e| ResourceError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .text()
                .await
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or_default().to_string());
            return Err(ResourceError::Status {
                status: status.as_u16(),
                message,
            });
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ResourceError::Network(e.to_string()))?;
        debug!(url, bytes = bytes.len(), "fetched");
        Ok(bytes)
    }
}
