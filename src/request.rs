//! Wire-request construction for the metadata service.
//!
//! # Responsibilities
//! - Build the token handshake request (`PUT /latest/api/token`)
//! - Build data requests (`GET {path}`), with or without a session token
//! - Keep header layout in one place; no I/O happens here

use bytes::Bytes;
use http::header::{ACCEPT, CONNECTION, USER_AGENT};
use http::{Method, Request, Uri};
use std::time::Duration;

use crate::error::{ImdsError, Result};

/// Header carrying the requested (and, on responses, granted) token TTL.
pub const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";

/// Header carrying the IMDSv2 session token on data requests.
pub const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";

/// Path of the token handshake resource.
pub const TOKEN_RESOURCE_PATH: &str = "/latest/api/token";

const USER_AGENT_VALUE: &str = concat!("imds-client/", env!("CARGO_PKG_VERSION"));

/// Builds the two request shapes the metadata protocol uses.
///
/// Pure and synchronous; the only failure mode is a base endpoint or path
/// that does not form a valid URI, which is fatal and never retried.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint: String,
    token_ttl: Duration,
}

impl RequestBuilder {
    pub fn new(endpoint: impl Into<String>, token_ttl: Duration) -> Self {
        let mut endpoint = endpoint.into();
        while endpoint.ends_with('/') {
            endpoint.pop();
        }
        Self { endpoint, token_ttl }
    }

    /// The TTL requested on token handshakes, in whole seconds.
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// `PUT {endpoint}/latest/api/token` requesting a session token.
    pub fn token_request(&self) -> Result<Request<Bytes>> {
        let uri = self.resource_uri(TOKEN_RESOURCE_PATH)?;
        self.base_request(Method::PUT, uri)
            .body(Bytes::new())
            .map_err(|e| ImdsError::InvalidEndpoint(e.to_string()))
    }

    /// `GET {endpoint}{path}`, authenticated when `token` is present.
    ///
    /// An absent token produces the IMDSv1 tokenless form: the token header
    /// is omitted entirely rather than sent empty.
    pub fn data_request(&self, path: &str, token: Option<&str>) -> Result<Request<Bytes>> {
        let uri = self.resource_uri(path)?;
        let mut builder = self.base_request(Method::GET, uri);
        if let Some(token) = token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        builder
            .body(Bytes::new())
            .map_err(|e| ImdsError::InvalidEndpoint(e.to_string()))
    }

    fn base_request(&self, method: Method, uri: Uri) -> http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(TOKEN_TTL_HEADER, self.token_ttl.as_secs().to_string())
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "*/*")
            .header(CONNECTION, "keep-alive")
    }

    fn resource_uri(&self, path: &str) -> Result<Uri> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.endpoint, path)
        } else {
            format!("{}/{}", self.endpoint, path)
        };
        joined
            .parse::<Uri>()
            .map_err(|e| ImdsError::InvalidEndpoint(format!("{joined}: {e}")))
    }
}
