//! HTTP transport seam.
//!
//! # Responsibilities
//! - Define the "send one request, get one response" capability the clients
//!   consume, in blocking and async form
//! - Ship one async adapter over the hyper legacy client
//!
//! # Design Decisions
//! - Bodies are fully collected `Bytes`; metadata payloads are tiny
//! - Transports are caller-supplied handles, not process-wide singletons;
//!   whoever constructs one owns its lifecycle
//! - Transport failures map to the retryable `ImdsError::Transport`

pub mod hyper;

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http::{Request, Response};

use crate::error::Result;

pub use self::hyper::HyperTransport;

/// Boxed future returned by [`AsyncTransport::send`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One blocking HTTP exchange.
pub trait BlockingTransport: Send + Sync {
    fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>>;
}

/// One async HTTP exchange. Dropping the returned future must abort the
/// underlying call; the clients rely on this for cancellation.
pub trait AsyncTransport: Send + Sync {
    fn send(&self, request: Request<Bytes>) -> BoxFuture<'_, Result<Response<Bytes>>>;
}
