//! Async transport over the hyper legacy client.

use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::error::{ImdsError, Result};
use crate::transport::{AsyncTransport, BoxFuture};

/// [`AsyncTransport`] backed by a pooled hyper client.
///
/// The metadata service is plain HTTP on a link-local address, so a bare
/// `HttpConnector` is all the connector stack needed.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
    timeout: Duration,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    /// Per-request deadline covering connect, send, and body collection.
    pub fn with_timeout(timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self { client, timeout }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncTransport for HyperTransport {
    fn send(&self, request: Request<Bytes>) -> BoxFuture<'_, Result<Response<Bytes>>> {
        let client = self.client.clone();
        let timeout = self.timeout;
        Box::pin(async move {
            let request = request.map(Full::new);
            let exchange = async {
                let response: Response<hyper::body::Incoming> = client
                    .request(request)
                    .await
                    .map_err(|e| ImdsError::Transport(e.to_string()))?;

                let (parts, body) = response.into_parts();
                let bytes = body
                    .collect()
                    .await
                    .map_err(|e| ImdsError::Transport(e.to_string()))?
                    .to_bytes();
                Ok(Response::from_parts(parts, bytes))
            };

            match tokio::time::timeout(timeout, exchange).await {
                Ok(result) => result,
                Err(_) => Err(ImdsError::Transport(format!(
                    "request timed out after {}ms",
                    timeout.as_millis()
                ))),
            }
        })
    }
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("timeout_ms", &self.timeout.as_millis())
            .finish()
    }
}
