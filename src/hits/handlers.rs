use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::models::{HitSummary, RequestMeta};
use crate::tracker::TrackerError;

/// Name of the cookie carrying the client's identity token.
pub const TOKEN_COOKIE: &str = "t";

pub struct HitState {
    pub dispatcher: Dispatcher,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Count one hit and report the running totals
pub async fn count_hit(
    State(state): State<Arc<HitState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let meta = RequestMeta {
        user_agent: header_value(&headers, "user-agent"),
        forwarded_for: header_value(&headers, "x-forwarded-for"),
        remote_addr: addr.ip().to_string(),
    };
    let token = token_cookie(&headers);

    match state.dispatcher.handle(&meta, token.as_deref()).await {
        Ok(outcome) => {
            let mut response_headers = HeaderMap::new();
            if let Some(token) = &outcome.new_token {
                // Session cookie: the token lives exactly as long as the
                // client keeps it
                let cookie = format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly");
                response_headers.insert("set-cookie", cookie.parse().unwrap());
            }

            let body = HitSummary {
                total_hits: outcome.total_hits,
                unique_hits: outcome.unique_hits,
            };

            (response_headers, Json(body)).into_response()
        }
        Err(TrackerError::NotImplemented) => (
            StatusCode::NOT_IMPLEMENTED,
            Json(ErrorResponse {
                error: "persistent hit tracking is not implemented".to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "hit dispatch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal server error".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// Extract the token cookie's value from the `Cookie` header, if present.
fn token_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("cookie")?.to_str().ok()?;

    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == TOKEN_COOKIE).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_token_cookie_extracts_single_cookie() {
        let headers = headers_with_cookie("t=abc123");
        assert_eq!(token_cookie(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_token_cookie_found_among_other_cookies() {
        let headers = headers_with_cookie("session=xyz; t=abc123;  theme=dark");
        assert_eq!(token_cookie(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_token_cookie_ignores_unrelated_cookies() {
        let headers = headers_with_cookie("session=xyz; theme=dark");
        assert_eq!(token_cookie(&headers), None);
    }

    #[test]
    fn test_token_cookie_absent_without_header() {
        assert_eq!(token_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_token_cookie_keeps_empty_value() {
        // An empty value is extracted here and rejected downstream by the
        // token decoder
        let headers = headers_with_cookie("t=");
        assert_eq!(token_cookie(&headers), Some(String::new()));
    }
}
