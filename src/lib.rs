//! Client for the EC2 Instance Metadata Service (IMDS).
//!
//! # Architecture Overview
//!
//! ```text
//!  caller ──▶ MetadataClient / AsyncMetadataClient
//!                 │
//!                 ├─▶ cache (single-flight token refresh)
//!                 │        └─▶ request (token PUT) ──▶ transport
//!                 │
//!                 ├─▶ request (data GET, token header) ──▶ transport
//!                 │
//!                 └─▶ classification: 2xx success
//!                                     5xx / transport error → retry (backoff)
//!                                     other → fatal
//! ```
//!
//! IMDSv2 session tokens are acquired with a `PUT /latest/api/token`
//! handshake and cached until their TTL lapses. Clients constructed with
//! `with_fallback` degrade to tokenless IMDSv1 requests when the handshake
//! fails for any reason other than a definitive HTTP 400 rejection, unless
//! fallback is disabled via configuration or the
//! `AWS_EC2_METADATA_V1_DISABLED` environment variable.

// Core subsystems
pub mod client;
pub mod request;
pub mod token;
pub mod transport;

// Caching and retries
pub mod cache;
pub mod retry;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

pub use client::{AsyncMetadataClient, CancelHandle, MetadataClient};
pub use config::ImdsConfig;
pub use error::{ImdsError, Result};
pub use retry::{ExponentialBackoff, RetryPolicy};
pub use token::Token;
pub use transport::{AsyncTransport, BlockingTransport, HyperTransport};
