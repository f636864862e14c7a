use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerBackend {
    Lifetime,
    Windowed,
    Persistent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub backend: TrackerBackend,
    pub window: WindowConfig,
}

/// Parameters for the windowed tracker. The window's entry capacity is
/// their product; both must be positive, which `WindowedTracker::new`
/// enforces at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub period_secs: u64,
    pub expected_concurrency: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let backend_str =
            std::env::var("TRACKER_BACKEND").unwrap_or_else(|_| "lifetime".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "lifetime" => TrackerBackend::Lifetime,
            "windowed" => TrackerBackend::Windowed,
            "persistent" => TrackerBackend::Persistent,
            other => {
                tracing::warn!(
                    "Unknown TRACKER_BACKEND '{other}', falling back to 'lifetime'. Supported values: lifetime, windowed, persistent"
                );
                TrackerBackend::Lifetime
            }
        };

        let period_secs = std::env::var("TRACKER_WINDOW_PERIOD_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()?;

        let expected_concurrency = std::env::var("TRACKER_WINDOW_EXPECTED_CONCURRENCY")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()?;

        Ok(Config {
            server: ServerConfig { host, port },
            tracker: TrackerConfig {
                backend,
                window: WindowConfig {
                    period_secs,
                    expected_concurrency,
                },
            },
        })
    }
}
