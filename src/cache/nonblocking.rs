//! Async credential cache with try-lock refresh.

use std::future::Future;

use tokio::sync::{Mutex, RwLock};

use crate::cache::Expires;
use crate::error::Result;

/// Async counterpart of [`super::TokenCache`].
///
/// The refresh mutex is taken with `try_lock`: a caller that finds another
/// refresh in flight does not wait. It returns the currently cached value
/// as-is, even if stale, trusting the in-flight refresh to update the slot
/// for subsequent calls. A burst of calls during a refresh therefore reads
/// one stale credential each instead of queueing.
///
/// Fetch errors reach only the caller that won the lock; contended callers
/// complete with whatever is cached, which may be `None` if nothing was ever
/// fetched. Callers must treat `None` as a fetch failure.
pub struct AsyncTokenCache<C> {
    current: RwLock<Option<C>>,
    refresh: Mutex<()>,
}

impl<C> Default for AsyncTokenCache<C> {
    fn default() -> Self {
        Self {
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }
}

impl<C: Expires + Clone> AsyncTokenCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached credential, refreshing through `fetch` if stale and
    /// no other refresh is already running.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Option<C>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C>>,
    {
        if let Some(current) = self.read_fresh().await {
            return Ok(Some(current));
        }

        match self.refresh.try_lock() {
            Ok(_refresh) => {
                // Double-check: a refresh may have completed between the
                // fast-path read and acquiring the lock.
                if let Some(current) = self.read_fresh().await {
                    return Ok(Some(current));
                }

                let fresh = fetch().await?;
                *self.current.write().await = Some(fresh.clone());
                Ok(Some(fresh))
            }
            Err(_) => {
                // Refresh in flight; availability over freshness.
                Ok(self.current.read().await.clone())
            }
        }
    }

    async fn read_fresh(&self) -> Option<C> {
        let guard = self.current.read().await;
        match guard.as_ref() {
            Some(current) if !current.is_expired() => Some(current.clone()),
            _ => None,
        }
    }
}
