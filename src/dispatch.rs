//! Per-request orchestration
//!
//! The dispatcher runs the one logical operation behind every inbound
//! request: bump the running total, and resolve + record an identity only
//! when the client did not present a valid token. All mutable state lives
//! in the tracker; the dispatcher itself is stateless per call.

use std::sync::Arc;

use tracing::debug;

use crate::identity::{self, Identity};
use crate::models::RequestMeta;
use crate::tracker::{Tracker, TrackerResult};

/// Outcome of one dispatched request.
#[derive(Debug, Clone)]
pub struct HitOutcome {
    pub total_hits: u64,
    pub unique_hits: u64,
    /// Token to hand back to the client, present only when this request
    /// minted a new identity.
    pub new_token: Option<String>,
}

pub struct Dispatcher {
    tracker: Arc<dyn Tracker>,
}

impl Dispatcher {
    pub fn new(tracker: Arc<dyn Tracker>) -> Self {
        Self { tracker }
    }

    /// Process one request.
    ///
    /// A presented token is authoritative: it suppresses identity
    /// resolution and recording entirely. A value that does not decode as a
    /// token counts as absent, so such a client is treated as new and gets
    /// a fresh one.
    pub async fn handle(
        &self,
        meta: &RequestMeta,
        existing_token: Option<&str>,
    ) -> TrackerResult<HitOutcome> {
        self.tracker.increment_total().await?;

        let presented = existing_token.and_then(Identity::from_token);
        let new_token = if presented.is_none() {
            let id = identity::resolve(
                meta.user_agent.as_deref(),
                meta.forwarded_for.as_deref(),
                &meta.remote_addr,
            );
            self.tracker.record(id).await?;
            Some(id.to_token())
        } else {
            None
        };

        let outcome = HitOutcome {
            total_hits: self.tracker.total_count().await?,
            unique_hits: self.tracker.unique_count().await?,
            new_token,
        };

        debug!(
            total_hits = outcome.total_hits,
            unique_hits = outcome.unique_hits,
            new_client = outcome.new_token.is_some(),
            "dispatched hit"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::resolve;
    use crate::tracker::{LifetimeTracker, PersistentTracker, TrackerError};

    fn meta(user_agent: &str, remote_addr: &str) -> RequestMeta {
        RequestMeta {
            user_agent: Some(user_agent.to_string()),
            forwarded_for: None,
            remote_addr: remote_addr.to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_visit_mints_a_token() {
        let dispatcher = Dispatcher::new(Arc::new(LifetimeTracker::new()));

        let outcome = dispatcher.handle(&meta("UA1", "1.2.3.4"), None).await.unwrap();

        assert_eq!(outcome.total_hits, 1);
        assert_eq!(outcome.unique_hits, 1);
        let expected = resolve(Some("UA1"), None, "1.2.3.4").to_token();
        assert_eq!(outcome.new_token.as_deref(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_presented_token_suppresses_recording() {
        let dispatcher = Dispatcher::new(Arc::new(LifetimeTracker::new()));
        let meta = meta("UA1", "1.2.3.4");

        let first = dispatcher.handle(&meta, None).await.unwrap();
        let token = first.new_token.unwrap();

        let second = dispatcher.handle(&meta, Some(&token)).await.unwrap();
        assert_eq!(second.total_hits, 2);
        assert_eq!(second.unique_hits, 1);
        assert!(second.new_token.is_none(), "a valid token must not be reissued");
    }

    #[tokio::test]
    async fn test_garbage_token_is_treated_as_absent() {
        let dispatcher = Dispatcher::new(Arc::new(LifetimeTracker::new()));
        let meta = meta("UA1", "1.2.3.4");

        let first = dispatcher.handle(&meta, None).await.unwrap();
        let issued = first.new_token.unwrap();

        let second = dispatcher
            .handle(&meta, Some("!!not-a-token!!"))
            .await
            .unwrap();

        // Same client metadata resolves to the same identity, so unique
        // stays put while the token is issued again
        assert_eq!(second.total_hits, 2);
        assert_eq!(second.unique_hits, 1);
        assert_eq!(second.new_token.as_deref(), Some(issued.as_str()));
    }

    #[tokio::test]
    async fn test_distinct_clients_are_counted_separately() {
        let dispatcher = Dispatcher::new(Arc::new(LifetimeTracker::new()));

        dispatcher.handle(&meta("UA1", "1.2.3.4"), None).await.unwrap();
        let outcome = dispatcher.handle(&meta("UA2", "5.6.7.8"), None).await.unwrap();

        assert_eq!(outcome.total_hits, 2);
        assert_eq!(outcome.unique_hits, 2);
    }

    #[tokio::test]
    async fn test_persistent_backend_surfaces_not_implemented() {
        let dispatcher = Dispatcher::new(Arc::new(PersistentTracker::new()));

        let err = dispatcher
            .handle(&meta("UA1", "1.2.3.4"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::NotImplemented));
    }
}
