//! Persistent hit tracking stub
//!
//! Placeholder for a future store-backed tracker. Every operation reports
//! [`TrackerError::NotImplemented`]; nothing is recorded and nothing
//! panics, so a process configured with this backend answers every request
//! with a structured 501 instead of crashing.

use async_trait::async_trait;

use crate::identity::Identity;
use crate::tracker::{Tracker, TrackerError, TrackerResult};

pub struct PersistentTracker;

impl PersistentTracker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PersistentTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tracker for PersistentTracker {
    async fn increment_total(&self) -> TrackerResult<()> {
        Err(TrackerError::NotImplemented)
    }

    async fn record(&self, _id: Identity) -> TrackerResult<()> {
        Err(TrackerError::NotImplemented)
    }

    async fn unique_count(&self) -> TrackerResult<u64> {
        Err(TrackerError::NotImplemented)
    }

    async fn total_count(&self) -> TrackerResult<u64> {
        Err(TrackerError::NotImplemented)
    }
}
