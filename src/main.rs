use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use tally::config::{Config, TrackerBackend};
use tally::hits;
use tally::tracker::{LifetimeTracker, PersistentTracker, Tracker, WindowedTracker};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Select the tracker strategy
    let tracker: Arc<dyn Tracker> = match config.tracker.backend {
        TrackerBackend::Lifetime => {
            info!("Using lifetime tracker (exact counts, unbounded memory)");
            Arc::new(LifetimeTracker::new())
        }
        TrackerBackend::Windowed => {
            info!(
                "Using windowed tracker (period {}s, expected concurrency {})",
                config.tracker.window.period_secs, config.tracker.window.expected_concurrency
            );
            Arc::new(WindowedTracker::new(&config.tracker.window)?)
        }
        TrackerBackend::Persistent => {
            warn!("Persistent tracker selected - it is a stub and every request will answer 501");
            Arc::new(PersistentTracker::new())
        }
    };

    let app = hits::create_hits_router(tracker);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Hit counter listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
