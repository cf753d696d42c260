//! Single-slot TTL cache owned by one loader
//!
//! Expiry is checked lazily on read. An expired entry stays in place until the
//! next successful load overwrites it or [`CacheCell::clear`] empties it.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct CacheCell<T> {
    payload: Option<Arc<T>>,
    fetched_at: Option<Instant>,
    ttl: Duration,
    /// Lifetime of the current payload; never longer than `ttl`
    entry_ttl: Duration,
}

impl<T> CacheCell<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            payload: None,
            fetched_at: None,
            ttl,
            entry_ttl: ttl,
        }
    }

    /// True iff a payload is present and younger than its TTL.
    pub fn is_valid(&self) -> bool {
        match (&self.payload, self.fetched_at) {
            (Some(_), Some(fetched_at)) => fetched_at.elapsed() < self.entry_ttl,
            _ => false,
        }
    }

    /// The payload, if still fresh.
    pub fn get(&self) -> Option<Arc<T>> {
        if self.is_valid() {
            self.payload.clone()
        } else {
            None
        }
    }

    /// Store a payload stamped with the current time.
    pub fn store(&mut self, payload: Arc<T>) {
        self.store_for(payload, self.ttl);
    }

    /// Store a payload that expires after `ttl`, capped at the cell's TTL.
    pub fn store_for(&mut self, payload: Arc<T>, ttl: Duration) {
        self.payload = Some(payload);
        self.fetched_at = Some(Instant::now());
        self.entry_ttl = ttl.min(self.ttl);
    }

    pub fn clear(&mut self) {
        self.payload = None;
        self.fetched_at = None;
    }

    /// Time since the payload was stored, fresh or not.
    pub fn age(&self) -> Option<Duration> {
        self.fetched_at.map(|t| t.elapsed())
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
