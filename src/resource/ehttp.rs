use super::{ResourceClient, ResourceError};
use async_trait::async_trait;
use bytes::Bytes;
#[cfg(target_arch = "wasm32")]
use ehttp::Mode;
use std::collections::BTreeMap;

/// Client backed by `ehttp`, which also runs in the browser.
pub struct EhttpClient;

#[async_trait]
impl ResourceClient for EhttpClient {
    async fn get(
        &self,
        url: &str,
        headers: Option<BTreeMap<String, String>>, // `ehttp` has limited headers support
    ) -> Result<Bytes, ResourceError> {
        let (tx, rx) = futures::channel::oneshot::channel();

        let mut request_headers = ehttp::Headers::default();
        for (k, v) in headers.unwrap_or_default() {
            request_headers.insert(k, v);
        }
        let request = ehttp::Request {
            method: "GET".to_owned(),
            url: url.to_string(),
            body: vec![],
            headers: request_headers,
            #[cfg(target_arch = "wasm32")]
            mode: Mode::default(),
        };

        ehttp::fetch(request, move |res| {
            let _ = tx.send(res);
        });

        let response = rx
            .await
            .map_err(|_| ResourceError::Network("channel closed".to_string()))?;
        let response = response.map_err(ResourceError::Network)?;

        if !response.ok {
            return Err(ResourceError::Status {
                status: response.status,
                message: response.status_text,
            });
        }

        Ok(Bytes::from(response.bytes))
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let result = EhttpClient.get("nosuch://host/mesh.i3d", None).await;
        assert!(matches!(result, Err(ResourceError::Network(_))));
    }
}
