//! Metadata client subsystem.
//!
//! # Data Flow
//! ```text
//! caller.get(path)
//!     → cache (hit, or token PUT via RequestBuilder + transport)
//!     → data GET via RequestBuilder + transport
//!     → classification: 2xx success / 5xx+transport retryable / rest fatal
//!     → success, or backoff + retry, or immediate failure
//! ```
//!
//! # Design Decisions
//! - One retry-and-classify algorithm, parameterized by the token source
//!   (blocking or async cache) and the token-failure policy (fail-fast vs
//!   IMDSv1 fallback), instead of parallel client classes
//! - Attempts within one `get` are strictly sequential
//! - Blocking retries sleep on an interruptible condvar; async retries are
//!   a `tokio::time::sleep` away and cancel with the future

pub mod cancel;
pub mod fallback;
pub mod nonblocking;
pub mod sync;

pub use cancel::CancelHandle;
pub use nonblocking::AsyncMetadataClient;
pub use sync::MetadataClient;

use std::time::Duration;

use bytes::Bytes;
use http::{Response, StatusCode};

use crate::error::{ImdsError, Result};
use crate::request::TOKEN_TTL_HEADER;
use crate::token::Token;

/// Outcome classification of one HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    Success,
    Retryable,
    Fatal,
}

pub(crate) fn classify(status: StatusCode) -> Disposition {
    if status.is_success() {
        Disposition::Success
    } else if status.is_server_error() {
        Disposition::Retryable
    } else {
        Disposition::Fatal
    }
}

/// Turn a non-2xx response into the matching error variant.
pub(crate) fn response_error(response: &Response<Bytes>) -> ImdsError {
    let status = response.status().as_u16();
    let body = body_text(response);
    if response.status().is_server_error() {
        ImdsError::Server { status, body }
    } else {
        ImdsError::Client { status, body }
    }
}

/// Extract a [`Token`] from a successful token-handshake response.
///
/// The service echoes the granted TTL in the same header the request carried;
/// a missing or unparseable header, or an empty body, is a fatal format error.
pub(crate) fn parse_token_response(response: &Response<Bytes>) -> Result<Token> {
    let ttl_secs = response
        .headers()
        .get(TOKEN_TTL_HEADER)
        .ok_or_else(|| ImdsError::TokenFormat(format!("missing {TOKEN_TTL_HEADER} header")))?
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| ImdsError::TokenFormat(format!("unparseable {TOKEN_TTL_HEADER} header")))?;

    let value = body_text(response);
    let value = value.trim();
    if value.is_empty() {
        return Err(ImdsError::TokenFormat("empty token body".into()));
    }

    Ok(Token::new(value, Duration::from_secs(ttl_secs)))
}

pub(crate) fn body_text(response: &Response<Bytes>) -> String {
    String::from_utf8_lossy(response.body()).into_owned()
}
