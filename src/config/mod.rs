//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ImdsConfig (validated, immutable)
//!
//! At client construction:
//!     FallbackDisposition::resolve consults the explicit setting first,
//!     then the AWS_EC2_METADATA_V1_DISABLED environment variable
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; all fields have defaults
//! - Validation separates syntactic (serde) from semantic checks
//! - The fallback disposition is resolved exactly once per client and
//!   remembers which surface disabled it, for error messages

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::FallbackDisposition;
pub use schema::ImdsConfig;
pub use schema::RetryConfig;
