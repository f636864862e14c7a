use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;
use crate::tracker::Tracker;

use super::handlers::{count_hit, health_check, HitState};

pub fn create_hits_router(tracker: Arc<dyn Tracker>) -> Router {
    let state = Arc::new(HitState {
        dispatcher: Dispatcher::new(tracker),
    });

    Router::new()
        .route("/", get(count_hit))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
