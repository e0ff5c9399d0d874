//! TTL cache for data source reads
//!
//! Rates and database metadata change rarely, so a read is reused until its
//! time-to-live elapses or a write invalidates it. A failed fetch is never
//! cached; the next caller retries.

use std::time::{Duration, Instant};

/// Single cached value with time-to-live expiration
#[derive(Debug, Clone)]
pub struct TtlCache<T: Clone> {
    data: Option<T>,
    fetched_at: Option<Instant>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: None,
            fetched_at: None,
            ttl,
        }
    }

    /// Cached value if it is younger than the TTL at `now`
    pub fn get_at(&self, now: Instant) -> Option<T> {
        let fetched_at = self.fetched_at?;
        if now.saturating_duration_since(fetched_at) < self.ttl {
            self.data.clone()
        } else {
            None
        }
    }

    pub fn get(&self) -> Option<T> {
        self.get_at(Instant::now())
    }

    pub fn set(&mut self, data: T) {
        self.data = Some(data);
        self.fetched_at = Some(Instant::now());
    }

    /// Return the cached value, or fetch and cache a fresh one
    pub fn get_or_fetch<E, F>(&mut self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(data) = self.get() {
            tracing::trace!("Cache hit");
            return Ok(data);
        }

        tracing::debug!("Cache miss, fetching");
        let data = fetch()?;
        self.set(data.clone());
        Ok(data)
    }

    /// Drop the cached value so the next read fetches
    pub fn invalidate(&mut self) {
        self.data = None;
        self.fetched_at = None;
    }
}
