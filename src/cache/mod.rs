//! Credential caching subsystem.
//!
//! # Data Flow
//! ```text
//! client.get(path)
//!     → cache fast path (read lock, non-expired value returned as-is)
//!     → cache slow path (refresh lock, double-check, single fetch)
//!     → fresh credential stored, returned to every waiter
//! ```
//!
//! # Design Decisions
//! - The slot holds at most one current credential, replaced atomically on
//!   refresh, never mutated in place
//! - Blocking cache: waiters queue on the refresh mutex; one fetch runs and
//!   its outcome (value or error) reaches every queued caller
//! - Async cache: `try_lock` instead of waiting; contended callers get the
//!   cached value as-is, trading freshness for availability
//! - Fetch errors are never cached; the next caller re-fetches from scratch

pub mod blocking;
pub mod nonblocking;

pub use blocking::TokenCache;
pub use nonblocking::AsyncTokenCache;

use crate::token::Token;

/// Staleness check for cacheable credentials.
///
/// Implemented by [`Token`] and by the fallback client's session
/// disposition, which caches a "no token" outcome with its own expiry.
pub trait Expires {
    fn is_expired(&self) -> bool;
}

impl Expires for Token {
    fn is_expired(&self) -> bool {
        Token::is_expired(self)
    }
}
