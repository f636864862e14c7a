use crate::identity::Identity;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Invalid construction parameters. Fatal at startup: the tracker never
    /// becomes active.
    #[error("invalid tracker configuration: {0}")]
    Configuration(String),
    /// The persistent backend exists only as a stub.
    #[error("persistent hit tracking is not implemented")]
    NotImplemented,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// A hit-counting strategy.
///
/// Implementations own all mutable counting state along with their own
/// memory and expiry policy. A tracker is constructed once at startup,
/// held behind `Arc<dyn Tracker>`, and invoked concurrently from any
/// number of request tasks for the life of the process.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Count one received request. Called exactly once per request,
    /// whether or not the client is new.
    async fn increment_total(&self) -> TrackerResult<()>;

    /// Record a newly identified client in the unique structure.
    /// Recording an identity that is already present is a no-op.
    async fn record(&self, id: Identity) -> TrackerResult<()>;

    /// Number of unique clients currently visible to this strategy.
    async fn unique_count(&self) -> TrackerResult<u64>;

    /// Total hits received over the tracker's lifetime. Never decreases.
    async fn total_count(&self) -> TrackerResult<u64>;
}
