use serde::{Deserialize, Serialize};

/// Request metadata the front-end hands to the engine, one per request.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// `User-Agent` header, if the client sent one.
    pub user_agent: Option<String>,
    /// Raw `X-Forwarded-For` header value, if present.
    pub forwarded_for: Option<String>,
    /// Remote socket address (IP only), always available as the fallback
    /// source.
    pub remote_addr: String,
}

/// JSON body returned by the counter endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitSummary {
    pub total_hits: u64,
    pub unique_hits: u64,
}
