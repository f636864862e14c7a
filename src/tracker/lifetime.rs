//! Exact lifetime unique counting
//!
//! Keeps every identity ever recorded for the life of the process. Memory
//! grows with the number of distinct clients; that is the accepted cost of
//! exact lifetime counts in a single-process deployment.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashSet;

use crate::identity::Identity;
use crate::tracker::{Tracker, TrackerResult};

pub struct LifetimeTracker {
    unique: DashSet<Identity>,
    total_hits: AtomicU64,
}

impl LifetimeTracker {
    pub fn new() -> Self {
        Self {
            unique: DashSet::new(),
            total_hits: AtomicU64::new(0),
        }
    }
}

impl Default for LifetimeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tracker for LifetimeTracker {
    async fn increment_total(&self) -> TrackerResult<()> {
        // Pure counter, no ordering relationship with the unique set
        self.total_hits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn record(&self, id: Identity) -> TrackerResult<()> {
        self.unique.insert(id);
        Ok(())
    }

    async fn unique_count(&self) -> TrackerResult<u64> {
        Ok(self.unique.len() as u64)
    }

    async fn total_count(&self) -> TrackerResult<u64> {
        Ok(self.total_hits.load(Ordering::Relaxed))
    }
}
