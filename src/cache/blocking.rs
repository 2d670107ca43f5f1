//! Blocking single-flight credential cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::cache::Expires;
use crate::error::{ImdsError, Result};

/// A cache holding one credential, refreshed lazily under a mutex.
///
/// The fast path takes only a read lock. A stale caller acquires the refresh
/// mutex, re-checks (another caller may have refreshed while it waited), and
/// only then fetches: under N concurrent stale callers at most one fetch
/// executes before all N observe the result.
///
/// A failed fetch is handed to every caller that was queued on the mutex for
/// that attempt, detected via a generation counter bumped per completed
/// refresh. The slot keeps its previous state, so the next caller to arrive
/// re-fetches from scratch.
pub struct TokenCache<C> {
    current: RwLock<Option<C>>,
    refresh: Mutex<Option<ImdsError>>,
    generation: AtomicU64,
}

impl<C> Default for TokenCache<C> {
    fn default() -> Self {
        Self {
            current: RwLock::new(None),
            refresh: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }
}

impl<C: Expires + Clone> TokenCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached credential, refreshing through `fetch` if stale.
    pub fn get_or_refresh<F>(&self, fetch: F) -> Result<C>
    where
        F: FnOnce() -> Result<C>,
    {
        if let Some(current) = self.read_fresh() {
            return Ok(current);
        }

        let observed = self.generation.load(Ordering::Acquire);
        let mut last_error = self
            .refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Double-check: another caller may have refreshed while we waited.
        if let Some(current) = self.read_fresh() {
            return Ok(current);
        }

        if self.generation.load(Ordering::Acquire) != observed {
            // A refresh completed while we were queued and the slot is still
            // stale, so that attempt failed; we were part of it.
            if let Some(err) = last_error.as_ref() {
                return Err(err.clone());
            }
        }

        match fetch() {
            Ok(fresh) => {
                *self
                    .current
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Some(fresh.clone());
                *last_error = None;
                self.generation.fetch_add(1, Ordering::Release);
                Ok(fresh)
            }
            Err(err) => {
                *last_error = Some(err.clone());
                self.generation.fetch_add(1, Ordering::Release);
                Err(err)
            }
        }
    }

    fn read_fresh(&self) -> Option<C> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(current) if !current.is_expired() => Some(current.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;
    use std::sync::atomic::AtomicU32;
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    #[test]
    fn test_fresh_token_skips_fetch() {
        let cache = TokenCache::new();
        let fetches = AtomicU32::new(0);
        for _ in 0..5 {
            let token = cache
                .get_or_refresh(|| {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(Token::new("tok", Duration::from_secs(3600)))
                })
                .unwrap();
            assert_eq!(token.value(), "tok");
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_single_flight_refresh() {
        let cache = Arc::new(TokenCache::new());
        let fetches = Arc::new(AtomicU32::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let fetches = fetches.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_refresh(|| {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        // Hold the refresh long enough for everyone to queue
                        std::thread::sleep(Duration::from_millis(30));
                        Ok(Token::new("shared", Duration::from_secs(3600)))
                    })
                })
            })
            .collect();

        for handle in handles {
            let token = handle.join().unwrap().unwrap();
            assert_eq!(token.value(), "shared");
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fetch_failure_reaches_queued_callers() {
        let cache = Arc::new(TokenCache::<Token>::new());
        let fetches = Arc::new(AtomicU32::new(0));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let fetches = fetches.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_refresh(|| {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(30));
                        Err(ImdsError::Server {
                            status: 500,
                            body: "boom".into(),
                        })
                    })
                })
            })
            .collect();

        for handle in handles {
            let err = handle.join().unwrap().unwrap_err();
            assert!(matches!(err, ImdsError::Server { status: 500, .. }));
        }
        // Exactly one fetch ran for the whole queued cohort
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        // A later caller starts a fresh attempt
        let token = cache
            .get_or_refresh(|| {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(Token::new("recovered", Duration::from_secs(3600)))
            })
            .unwrap();
        assert_eq!(token.value(), "recovered");
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_expired_token_triggers_refresh() {
        let cache = TokenCache::new();
        let fetches = AtomicU32::new(0);
        cache
            .get_or_refresh(|| {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(Token::new("first", Duration::ZERO))
            })
            .unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let token = cache
            .get_or_refresh(|| {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(Token::new("second", Duration::from_secs(3600)))
            })
            .unwrap();
        assert_eq!(token.value(), "second");
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }
}
